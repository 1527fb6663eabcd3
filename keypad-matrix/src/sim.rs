//! Simulated keypad lines and timer for running the scanner off-target.

use crate::delay::Countdown;
use crate::keymap::{COLS, COLUMN_LINES};
use crate::scan::{KeypadPort, RowSample};

/// Keypad port that plays back a row-sample script per logical column.
///
/// The column being read is worked out from the column lines, so a scan
/// that selects the wrong line reads the wrong script. Past the end of a
/// script its last sample repeats; an empty script reads all rows released.
pub struct ScriptedPort<'a> {
    scripts: [&'a [u8]; COLS],
    cursor: [usize; COLS],
    lines_high: [bool; COLUMN_LINES],
    reads: [usize; COLS],
}

impl<'a> ScriptedPort<'a> {
    pub fn new() -> Self {
        Self::with_scripts([&[][..]; COLS])
    }

    pub fn with_scripts(scripts: [&'a [u8]; COLS]) -> Self {
        ScriptedPort {
            scripts,
            cursor: [0; COLS],
            lines_high: [true; COLUMN_LINES],
            reads: [0; COLS],
        }
    }

    /// Builder form of [`set_script`](Self::set_script).
    pub fn script(mut self, col: usize, samples: &'a [u8]) -> Self {
        self.set_script(col, samples);
        self
    }

    /// Replace one column's script and rewind it.
    pub fn set_script(&mut self, col: usize, samples: &'a [u8]) {
        self.scripts[col] = samples;
        self.cursor[col] = 0;
    }

    /// Logical column currently selected by the column lines, `None` if
    /// more than one line is low.
    pub fn selected_column(&self) -> Option<usize> {
        let mut low = self.lines_high.iter().enumerate().filter(|(_, high)| !**high);
        match (low.next(), low.next()) {
            (None, _) => Some(0),
            (Some((line, _)), None) => Some(line + 1),
            _ => None,
        }
    }

    /// True when every column line is high.
    pub fn columns_released(&self) -> bool {
        self.lines_high.iter().all(|&high| high)
    }

    /// Row reads taken on each logical column so far.
    pub fn reads(&self) -> [usize; COLS] {
        self.reads
    }
}

impl Default for ScriptedPort<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl KeypadPort for ScriptedPort<'_> {
    fn release_columns(&mut self) {
        self.lines_high = [true; COLUMN_LINES];
    }

    fn drive_column_low(&mut self, line: usize) {
        self.lines_high[line] = false;
    }

    fn read_rows(&mut self) -> RowSample {
        let Some(col) = self.selected_column() else {
            return RowSample::RELEASED;
        };
        self.reads[col] += 1;

        let script = self.scripts[col];
        let bits = script
            .get(self.cursor[col])
            .or_else(|| script.last())
            .copied()
            .unwrap_or(RowSample::RELEASED.bits());
        self.cursor[col] += 1;
        RowSample::new(bits)
    }
}

/// Countdown that moves `step` ticks every time it is read.
pub struct FreeRunningCountdown {
    value: u32,
    reload: u32,
    step: u32,
    ticks: u64,
    reloads: u32,
}

impl FreeRunningCountdown {
    /// Start at `reload`. `step` is clamped to at least one tick.
    pub fn new(reload: u32, step: u32) -> Self {
        Self::starting_at(reload, reload, step)
    }

    pub fn starting_at(value: u32, reload: u32, step: u32) -> Self {
        FreeRunningCountdown {
            value: value.min(reload),
            reload,
            step: step.max(1),
            ticks: 0,
            reloads: 0,
        }
    }

    /// Ticks advanced since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Times the counter passed zero and reloaded.
    pub fn reloads(&self) -> u32 {
        self.reloads
    }

    fn advance(&mut self) {
        // One period is reload + 1 ticks: reload down to 0, then the reload.
        let period = self.reload as u64 + 1;
        let mut left = self.step as u64;
        self.ticks += left;

        let to_reload = self.value as u64 + 1;
        if left < to_reload {
            self.value -= left as u32;
            return;
        }
        left -= to_reload;
        self.reloads += 1 + (left / period) as u32;
        self.value = self.reload - (left % period) as u32;
    }
}

impl Countdown for FreeRunningCountdown {
    fn current(&mut self) -> u32 {
        self.advance();
        self.value
    }

    fn reload(&mut self) -> u32 {
        self.reload
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delay::Delay;

    #[test]
    fn test_port_selects_column_from_lines() {
        let mut port = ScriptedPort::new();
        assert_eq!(port.selected_column(), Some(0));
        port.drive_column_low(2);
        assert_eq!(port.selected_column(), Some(3));
        assert!(!port.columns_released());
        port.drive_column_low(0);
        assert_eq!(port.selected_column(), None);
        assert_eq!(port.read_rows(), RowSample::RELEASED);
        port.release_columns();
        assert!(port.columns_released());
    }

    #[test]
    fn test_port_repeats_last_sample() {
        let mut port = ScriptedPort::new().script(1, &[0b1111, 0b0111]);
        port.drive_column_low(0);
        assert_eq!(port.read_rows().bits(), 0b1111);
        assert_eq!(port.read_rows().bits(), 0b0111);
        assert_eq!(port.read_rows().bits(), 0b0111);
        assert_eq!(port.reads(), [0, 3, 0, 0, 0]);

        port.set_script(1, &[0b1110]);
        assert_eq!(port.read_rows().bits(), 0b1110);
        assert_eq!(port.reads(), [0, 4, 0, 0, 0]);
    }

    #[test]
    fn test_countdown_steps_and_wraps() {
        let mut counter = FreeRunningCountdown::starting_at(5, 9, 3);
        assert_eq!(counter.current(), 2);
        // 2 -> 1 -> 0 -> 9
        assert_eq!(counter.current(), 9);
        assert_eq!(counter.reloads(), 1);
        assert_eq!(counter.ticks(), 6);
    }

    #[test]
    fn test_countdown_step_longer_than_period() {
        // Period is 10 ticks; 25 ticks from 5: 6 to reload, 19 left,
        // one more full period, 9 past the reload.
        let mut counter = FreeRunningCountdown::starting_at(5, 9, 25);
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.reloads(), 2);
    }

    #[test]
    fn test_delay_over_simulated_countdown() {
        // 48 MHz, 10 us = 480 ticks with a 100 tick period and 7 ticks per read.
        let mut delay = Delay::new(FreeRunningCountdown::new(99, 7), 48_000_000);
        delay.delay_us(10);
        let counter = delay.free();
        assert!(counter.ticks() >= 480);
        assert!(counter.ticks() < 480 + 7 * 8);
        assert!(counter.reloads() >= 4);
    }
}
