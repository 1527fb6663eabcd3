//! Column-by-column matrix scan with per-column debounce.
//!
//! Each poll selects the logical columns in order, samples the row lines
//! until they read the same value three times in a row (or the attempt
//! budget runs out), and reports the first pressed row it finds. Nothing is
//! carried over between polls.

use core::iter;

use embedded_hal::blocking::delay::DelayUs;

use crate::keymap::{self, COLS, ROWS};
use crate::KeyCode;

/// Row reads per column before the column is given up as noisy.
pub const SAMPLE_ATTEMPTS: usize = 8;
/// Consecutive repeats of a sample needed to call it stable.
pub const STABLE_MATCHES: u8 = 2;
/// Settling time before each row read.
pub const SAMPLE_INTERVAL_US: u32 = 10;

/// Bits of a [`RowSample`] that carry row lines.
const ROW_MASK: u8 = (1 << ROWS) - 1;

/// Snapshot of the row inputs. Bit `i` is row `i`, 0 means pressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RowSample(u8);

impl RowSample {
    /// No row pulled low.
    pub const RELEASED: RowSample = RowSample(ROW_MASK);

    pub const fn new(bits: u8) -> Self {
        RowSample(bits & ROW_MASK)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_pressed(self, row: usize) -> bool {
        row < ROWS && self.0 & (1 << row) == 0
    }

    /// Lowest pressed row, if any.
    pub fn first_pressed(self) -> Option<usize> {
        (0..ROWS).find(|&row| self.is_pressed(row))
    }
}

/// Consecutive-match counter for one column.
#[derive(Default)]
pub struct Debounce {
    last: Option<RowSample>,
    matches: u8,
}

impl Debounce {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one sample. Returns the sample once it has been seen
    /// `STABLE_MATCHES + 1` times in a row.
    pub fn feed(&mut self, sample: RowSample) -> Option<RowSample> {
        if self.last == Some(sample) {
            self.matches = self.matches.saturating_add(1);
        } else {
            self.last = Some(sample);
            self.matches = 0;
        }

        if self.matches >= STABLE_MATCHES {
            self.last
        } else {
            None
        }
    }
}

/// Run the debounce rule over at most `SAMPLE_ATTEMPTS` samples.
pub fn settle<I: IntoIterator<Item = RowSample>>(samples: I) -> Option<RowSample> {
    let mut debounce = Debounce::new();
    samples
        .into_iter()
        .take(SAMPLE_ATTEMPTS)
        .find_map(|sample| debounce.feed(sample))
}

/// Hardware lines of the keypad.
pub trait KeypadPort {
    /// Drive every column line high.
    fn release_columns(&mut self);

    /// Drive column line `line` low. `line` is below `COLUMN_LINES`.
    fn drive_column_low(&mut self, line: usize);

    /// Read the row inputs.
    fn read_rows(&mut self) -> RowSample;
}

/// What happened on one column during a poll.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum ColumnOutcome {
    /// Not reached, an earlier column produced a key.
    #[default]
    Skipped,
    /// Rows never settled within the attempt budget.
    Noisy,
    /// Rows settled on this value.
    Stable(RowSample),
}

/// Keypad scanner bound to its port and delay.
pub struct Scanner<P, D> {
    port: P,
    delay: D,
}

impl<P: KeypadPort, D: DelayUs<u32>> Scanner<P, D> {
    pub fn new(port: P, delay: D) -> Self {
        Scanner { port, delay }
    }

    /// Scan the whole matrix once and return the pressed key, or
    /// `KeyCode::Invalid` if no key is stably pressed.
    pub fn poll(&mut self) -> KeyCode {
        let mut outcomes = [ColumnOutcome::Skipped; COLS];
        self.poll_traced(&mut outcomes)
    }

    /// Same as [`poll`](Self::poll), recording each column's outcome.
    pub fn poll_traced(&mut self, outcomes: &mut [ColumnOutcome; COLS]) -> KeyCode {
        let mut key = KeyCode::Invalid;
        outcomes.fill(ColumnOutcome::Skipped);

        for (col, outcome) in outcomes.iter_mut().enumerate() {
            self.port.release_columns();
            // Column line j-1 selects logical column j; column 0 is read
            // with every line high.
            if col > 0 {
                self.port.drive_column_low(col - 1);
            }

            let Some(rows) = self.sample_column() else {
                *outcome = ColumnOutcome::Noisy;
                continue;
            };
            *outcome = ColumnOutcome::Stable(rows);

            if let Some(row) = rows.first_pressed() {
                key = keymap::lookup(col, row);
            }
            if !key.is_invalid() {
                break;
            }
        }

        self.port.release_columns();
        key
    }

    fn sample_column(&mut self) -> Option<RowSample> {
        settle(iter::from_fn(|| {
            self.delay.delay_us(SAMPLE_INTERVAL_US);
            Some(self.port.read_rows())
        }))
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Release the port and the delay.
    pub fn free(self) -> (P, D) {
        (self.port, self.delay)
    }
}
