//! Pieces module - the piece catalogue
//!
//! Every piece type is a list of 4x4 rotation masks. A mask cell holds the
//! piece's color index (type index + 1) or 0. Rotation walks the list in
//! order and wraps; there is no kick search, a blocked rotation is simply
//! not applied.

use crate::types::{Cell, PIECE_TYPES};

/// One rotation state, indexed `[row][column]`
pub type Mask = [[Cell; 4]; 4];

const O: [Mask; 1] = [[[0, 0, 0, 0], [0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0]]];

const I: [Mask; 2] = [
    [[0, 0, 0, 0], [2, 2, 2, 2], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 2, 0], [0, 0, 2, 0], [0, 0, 2, 0], [0, 0, 2, 0]],
];

const S: [Mask; 2] = [
    [[0, 0, 0, 0], [0, 0, 3, 3], [0, 3, 3, 0], [0, 0, 0, 0]],
    [[0, 0, 3, 0], [0, 0, 3, 3], [0, 0, 0, 3], [0, 0, 0, 0]],
];

const Z: [Mask; 2] = [
    [[0, 0, 0, 0], [0, 4, 4, 0], [0, 0, 4, 4], [0, 0, 0, 0]],
    [[0, 0, 0, 4], [0, 0, 4, 4], [0, 0, 4, 0], [0, 0, 0, 0]],
];

const L: [Mask; 4] = [
    [[0, 0, 0, 0], [0, 5, 5, 5], [0, 5, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 5, 0], [0, 0, 5, 0], [0, 0, 5, 5], [0, 0, 0, 0]],
    [[0, 0, 0, 5], [0, 5, 5, 5], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 5, 5, 0], [0, 0, 5, 0], [0, 0, 5, 0], [0, 0, 0, 0]],
];

const J: [Mask; 4] = [
    [[0, 0, 0, 0], [0, 6, 6, 6], [0, 0, 0, 6], [0, 0, 0, 0]],
    [[0, 0, 6, 6], [0, 0, 6, 0], [0, 0, 6, 0], [0, 0, 0, 0]],
    [[0, 6, 0, 0], [0, 6, 6, 6], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 6, 0], [0, 0, 6, 0], [0, 6, 6, 0], [0, 0, 0, 0]],
];

const T: [Mask; 4] = [
    [[0, 0, 0, 0], [0, 7, 7, 7], [0, 0, 7, 0], [0, 0, 0, 0]],
    [[0, 0, 7, 0], [0, 0, 7, 7], [0, 0, 7, 0], [0, 0, 0, 0]],
    [[0, 0, 7, 0], [0, 7, 7, 7], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 7, 0], [0, 7, 7, 0], [0, 0, 7, 0], [0, 0, 0, 0]],
];

static CATALOGUE: [&[Mask]; PIECE_TYPES] = [&O, &I, &S, &Z, &L, &J, &T];

/// All rotation masks of a piece type.
///
/// Panics if `kind >= PIECE_TYPES`.
pub fn rotations(kind: usize) -> &'static [Mask] {
    CATALOGUE[kind]
}

/// Number of rotation states of a piece type
pub fn rotation_count(kind: usize) -> usize {
    rotations(kind).len()
}

/// The rotation state after `rotation`, wrapping to 0
pub fn next_rotation(kind: usize, rotation: usize) -> usize {
    (rotation + 1) % rotation_count(kind)
}

/// Get the mask for a piece kind and rotation
pub fn get_mask(kind: usize, rotation: usize) -> &'static Mask {
    &rotations(kind)[rotation]
}

/// Occupied cells of a mask as `(dx, dy, value)` relative to its top-left corner
pub fn mask_cells(mask: &Mask) -> impl Iterator<Item = (i8, i8, Cell)> + '_ {
    mask.iter().enumerate().flat_map(|(dy, row)| {
        row.iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0)
            .map(move |(dx, &v)| (dx as i8, dy as i8, v))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mask_has_four_cells_of_its_own_color() {
        for kind in 0..PIECE_TYPES {
            for mask in rotations(kind) {
                let cells: Vec<_> = mask_cells(mask).collect();
                assert_eq!(cells.len(), 4, "kind {kind}");
                assert!(cells.iter().all(|&(_, _, v)| v as usize == kind + 1));
            }
        }
    }

    #[test]
    fn rotation_counts() {
        let counts: Vec<usize> = (0..PIECE_TYPES).map(rotation_count).collect();
        assert_eq!(counts, vec![1, 2, 2, 2, 4, 4, 4]);
    }

    #[test]
    fn next_rotation_wraps() {
        assert_eq!(next_rotation(0, 0), 0);
        assert_eq!(next_rotation(1, 1), 0);
        assert_eq!(next_rotation(6, 2), 3);
        assert_eq!(next_rotation(6, 3), 0);
    }

    #[test]
    fn spawn_rotations_leave_top_row_empty() {
        for kind in 0..PIECE_TYPES {
            assert!(mask_cells(get_mask(kind, 0)).all(|(_, dy, _)| dy > 0));
        }
    }
}
