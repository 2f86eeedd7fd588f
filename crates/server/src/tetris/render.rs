//! Falling-block screens: the play field and the scoreboard.
//!
//! Board cells are two terminal columns wide. The play field is redrawn in
//! full every frame; runs of empty cells are skipped with a cursor jump and
//! the background color is only re-sent when it changes.

use crate::core::{level_for_lines, GameState};
use crate::scoreboard::ScoreEntry;
use crate::term::Vt100;
use crate::types::{Cell, ClearMode, Direction, BOARD_HEIGHT, BOARD_WIDTH, SCOREBOARD_ROWS};

use super::palette::Palette;

/// Screen column of board column 0
pub const BOARD_X: u16 = 5;
/// Screen row of board row 0
pub const BOARD_Y: u16 = 2;
const STATS_X: u16 = 33;
const CELL: &str = "  ";

/// Screen column where the player types a name
pub const NAME_X: u16 = 15;
/// Screen row where the player types a name
pub const NAME_Y: u16 = 20;

/// Final numbers of a run, shown under the scoreboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub level: u32,
    pub lines: u32,
    pub score: u32,
}

impl RunSummary {
    pub fn of(game: &GameState) -> Self {
        Self {
            level: game.level(),
            lines: game.lines(),
            score: game.score(),
        }
    }
}

/// Clear the screen and draw bands, board and counters.
pub fn draw_frame(vt: &mut Vt100, palette: &Palette, game: &GameState) {
    vt.set_background(palette.background);
    vt.clear_screen(ClearMode::Entire);
    draw_bands(vt, palette);
    draw_board(vt, palette, game);

    vt.set_background(palette.background);
    vt.set_foreground(palette.text);
    vt.set_cursor(STATS_X, BOARD_Y);
    vt.write_text(&format!("Score: {}", game.score()));
    vt.set_cursor(STATS_X, BOARD_Y + 1);
    vt.write_text(&format!("Level: {}", game.level()));
    vt.set_cursor(STATS_X, BOARD_Y + 2);
    vt.write_text(&format!("Lines: {}", game.lines()));
}

fn draw_bands(vt: &mut Vt100, palette: &Palette) {
    let width = BOARD_WIDTH as u16 * 2 + 2;
    let height = BOARD_HEIGHT as u16 + 2;
    let right = BOARD_X + BOARD_WIDTH as u16 * 2;

    vt.set_background(palette.band);
    vt.draw_line(BOARD_X - 1, BOARD_Y - 1, Direction::Horizontal, width);
    vt.draw_line(BOARD_X - 1, BOARD_Y + BOARD_HEIGHT as u16, Direction::Horizontal, width);
    vt.draw_line(BOARD_X - 2, BOARD_Y - 1, Direction::Vertical, height);
    vt.draw_line(BOARD_X - 1, BOARD_Y - 1, Direction::Vertical, height);
    vt.draw_line(right, BOARD_Y - 1, Direction::Vertical, height);
    vt.draw_line(right + 1, BOARD_Y - 1, Direction::Vertical, height);
}

fn draw_board(vt: &mut Vt100, palette: &Palette, game: &GameState) {
    // last background sent; None until the first cell is painted
    let mut brush: Option<Cell> = None;

    for y in 0..BOARD_HEIGHT {
        let row = BOARD_Y + y as u16;
        vt.set_cursor(BOARD_X, row);
        let mut gap = 0u16;

        for x in 0..BOARD_WIDTH {
            let cell = game.visible_cell(x as i8, y as i8);
            if cell == 0 {
                gap += 1;
                continue;
            }

            match gap {
                0 => {}
                1 => {
                    paint(vt, palette, &mut brush, 0);
                    vt.write_text(CELL);
                }
                _ => vt.set_cursor(BOARD_X + x as u16 * 2, row),
            }
            gap = 0;

            paint(vt, palette, &mut brush, cell);
            vt.write_text(CELL);
        }
    }
}

fn paint(vt: &mut Vt100, palette: &Palette, brush: &mut Option<Cell>, cell: Cell) {
    if *brush == Some(cell) {
        return;
    }
    *brush = Some(cell);
    let shade = if cell == 0 {
        palette.background
    } else {
        palette.piece(cell)
    };
    vt.set_background(shade);
}

/// Draw the ranked table and the current run.
///
/// With `prompt` the name prompt is shown and the cursor is left visible at
/// the name field; otherwise the viewer only watches.
pub fn draw_scoreboard(
    vt: &mut Vt100,
    palette: &Palette,
    table: &[ScoreEntry],
    run: &RunSummary,
    prompt: bool,
) {
    vt.set_background(palette.background);
    vt.set_foreground(palette.text);
    vt.clear_screen(ClearMode::Entire);
    vt.set_cursor(30, 4);
    vt.write_text("TETRIS HIGHSCORES");
    vt.set_cursor(NAME_X, 6);
    vt.write_text("NICKNAME            LEVEL     LINES     SCORE");

    for (row, entry) in (7u16..).zip(table.iter().take(SCOREBOARD_ROWS)) {
        write_row(vt, row, &entry.name, level_for_lines(entry.lines), entry.lines, entry.score);
    }

    vt.set_cursor(NAME_X, NAME_Y - 1);
    if prompt {
        vt.write_text("Enter nickname (leave empty for ANONYM):");
    } else {
        vt.write_text("Waiting for the player to sign the board...");
    }
    write_row(vt, NAME_Y, "", run.level, run.lines, run.score);

    if prompt {
        vt.set_cursor(NAME_X, NAME_Y);
        vt.set_cursor_visible(true);
    }
}

fn write_row(vt: &mut Vt100, row: u16, name: &str, level: u32, lines: u32, score: u32) {
    if !name.is_empty() {
        vt.set_cursor(NAME_X, row);
        vt.write_text(name);
    }
    vt.set_cursor(35, row);
    vt.write_text(&level.to_string());
    vt.set_cursor(45, row);
    vt.write_text(&lines.to_string());
    vt.set_cursor(55, row);
    vt.write_text(&score.to_string());
}
