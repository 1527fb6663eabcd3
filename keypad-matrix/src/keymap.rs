//! Fixed lookup table from matrix position to key code.
//!
//! The keypad has 4 column lines but 5 logical columns: logical column 0 is
//! read with no column line driven low, which is how the two side keys are
//! wired. Logical column `j > 0` is read with column line `j - 1` low.

use crate::KeyCode;

/// Number of logical columns, including the undriven column 0.
pub const COLS: usize = 5;
/// Number of physical column output lines.
pub const COLUMN_LINES: usize = COLS - 1;
/// Number of row input lines.
pub const ROWS: usize = 4;

/// Unused matrix position.
const ___: KeyCode = KeyCode::Invalid;

/// Key codes indexed by `[column][row]`.
pub static KEYMAP: [[KeyCode; ROWS]; COLS] = [
    // Column 0: nothing pulled low
    [KeyCode::Side1, KeyCode::Side2, ___, ___],
    // Column 1
    [KeyCode::Menu, KeyCode::Key1, KeyCode::Key4, KeyCode::Key7],
    // Column 2
    [KeyCode::Up, KeyCode::Key2, KeyCode::Key5, KeyCode::Key8],
    // Column 3
    [KeyCode::Down, KeyCode::Key3, KeyCode::Key6, KeyCode::Key9],
    // Column 4
    [KeyCode::Exit, KeyCode::Star, KeyCode::Key0, KeyCode::F],
];

/// Look up the key at a logical matrix position.
///
/// Positions outside the table read as `Invalid`.
pub fn lookup(col: usize, row: usize) -> KeyCode {
    KEYMAP
        .get(col)
        .and_then(|c| c.get(row))
        .copied()
        .unwrap_or(KeyCode::Invalid)
}

/// Find the matrix position of a key, if it is on the keypad.
pub fn position(key: KeyCode) -> Option<(usize, usize)> {
    if key.is_invalid() {
        return None;
    }
    for (col, rows) in KEYMAP.iter().enumerate() {
        if let Some(row) = rows.iter().position(|&k| k == key) {
            return Some((col, row));
        }
    }
    None
}
