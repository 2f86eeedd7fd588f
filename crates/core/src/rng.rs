//! RNG module - piece type selection
//!
//! Pieces are drawn uniformly from the catalogue. The generator is a small LCG
//! so that a given seed replays the same sequence in tests and benches.

use crate::types::PIECE_TYPES;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Seed from the wall clock
    pub fn from_clock() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ (d.as_secs() as u32))
            .unwrap_or(1);
        Self::new(nanos)
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // low bits of an LCG have short periods
        (self.next_u32() >> 16) % max.max(1)
    }

    /// Draw a piece type index
    pub fn next_piece(&mut self) -> usize {
        self.next_range(PIECE_TYPES as u32) as usize
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_different_seeds() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(54321);
        assert_ne!(rng1.next_u32(), rng2.next_u32());
    }

    #[test]
    fn test_next_piece_covers_catalogue() {
        let mut rng = SimpleRng::new(7);
        let mut seen = [false; PIECE_TYPES];
        for _ in 0..500 {
            let kind = rng.next_piece();
            assert!(kind < PIECE_TYPES);
            seen[kind] = true;
        }
        assert!(seen.iter().all(|&s| s), "{seen:?}");
    }
}
