//! Keypad matrix scanning with per-column debounce.
//!
//! The keypad is a 4-row matrix with 4 column lines plus the side keys,
//! which read with no column line driven. A poll walks the 5 logical
//! columns, waits for the row lines to settle, and returns one key code.
//!
//! This crate is `no_std` so it can be used by both the AVR firmware and
//! the native CLI tool. The `sim` feature adds a scripted port and a
//! simulated timer for running scans off-target.

#![cfg_attr(not(test), no_std)]

pub mod delay;
pub mod keycode;
pub mod keymap;
pub mod pins;
pub mod scan;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use delay::{Countdown, Delay};
pub use keycode::KeyCode;
pub use keymap::{lookup, COLS, COLUMN_LINES, ROWS};
pub use pins::PinPort;
pub use scan::{ColumnOutcome, KeypadPort, RowSample, Scanner};
