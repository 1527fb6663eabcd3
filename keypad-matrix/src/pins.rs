//! [`KeypadPort`] over individual `embedded-hal` pins.

use embedded_hal::digital::v2::{InputPin, OutputPin};

use crate::keymap::{COLUMN_LINES, ROWS};
use crate::scan::{KeypadPort, RowSample};

/// Keypad wired to one input pin per row and one output pin per column line.
///
/// Rows need pull-ups so an idle line reads high. Pin errors are not
/// reported: a row that fails to read counts as released, a failed column
/// write is dropped.
pub struct PinPort<I, O> {
    rows: [I; ROWS],
    cols: [O; COLUMN_LINES],
}

impl<I: InputPin, O: OutputPin> PinPort<I, O> {
    pub fn new(rows: [I; ROWS], cols: [O; COLUMN_LINES]) -> Self {
        PinPort { rows, cols }
    }

    /// Release the pins.
    pub fn free(self) -> ([I; ROWS], [O; COLUMN_LINES]) {
        (self.rows, self.cols)
    }
}

impl<I: InputPin, O: OutputPin> KeypadPort for PinPort<I, O> {
    fn release_columns(&mut self) {
        for col in self.cols.iter_mut() {
            col.set_high().ok();
        }
    }

    fn drive_column_low(&mut self, line: usize) {
        if let Some(col) = self.cols.get_mut(line) {
            col.set_low().ok();
        }
    }

    fn read_rows(&mut self) -> RowSample {
        let bits = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, pin)| !pin.is_low().unwrap_or(false))
            .fold(0u8, |bits, (row, _)| bits | 1 << row);
        RowSample::new(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Shared wiring: which column line is low and which (column, row)
    /// switches are closed.
    #[derive(Default)]
    struct Wiring {
        lines_low: Cell<u8>,
        closed: Cell<u32>,
        writes: Cell<usize>,
    }

    impl Wiring {
        fn press(&self, line: usize, row: usize) {
            self.closed.set(self.closed.get() | 1 << (line * ROWS + row));
        }
    }

    struct Row {
        row: usize,
        wiring: Rc<Wiring>,
    }

    impl InputPin for Row {
        type Error = Infallible;

        fn is_high(&self) -> Result<bool, Infallible> {
            self.is_low().map(|low| !low)
        }

        fn is_low(&self) -> Result<bool, Infallible> {
            let low = self.wiring.lines_low.get();
            let closed = self.wiring.closed.get();
            Ok((0..COLUMN_LINES)
                .any(|line| low & (1 << line) != 0 && closed & (1 << (line * ROWS + self.row)) != 0))
        }
    }

    struct Col {
        line: usize,
        wiring: Rc<Wiring>,
    }

    impl OutputPin for Col {
        type Error = Infallible;

        fn set_low(&mut self) -> Result<(), Infallible> {
            let w = &self.wiring;
            w.lines_low.set(w.lines_low.get() | 1 << self.line);
            w.writes.set(w.writes.get() + 1);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            let w = &self.wiring;
            w.lines_low.set(w.lines_low.get() & !(1 << self.line));
            w.writes.set(w.writes.get() + 1);
            Ok(())
        }
    }

    /// Row pin that always fails to read.
    struct Broken;

    impl InputPin for Broken {
        type Error = ();

        fn is_high(&self) -> Result<bool, ()> {
            Err(())
        }

        fn is_low(&self) -> Result<bool, ()> {
            Err(())
        }
    }

    fn port(wiring: &Rc<Wiring>) -> PinPort<Row, Col> {
        let rows = [0, 1, 2, 3].map(|row| Row { row, wiring: wiring.clone() });
        let cols = [0, 1, 2, 3].map(|line| Col { line, wiring: wiring.clone() });
        PinPort::new(rows, cols)
    }

    #[test]
    fn test_idle_rows_read_released() {
        let wiring = Rc::new(Wiring::default());
        let mut port = port(&wiring);
        port.release_columns();
        assert_eq!(port.read_rows(), RowSample::RELEASED);
    }

    #[test]
    fn test_driven_line_pulls_pressed_row_low() {
        let wiring = Rc::new(Wiring::default());
        wiring.press(1, 2);
        let mut port = port(&wiring);

        port.release_columns();
        port.drive_column_low(0);
        assert_eq!(port.read_rows(), RowSample::RELEASED);

        port.release_columns();
        port.drive_column_low(1);
        assert_eq!(port.read_rows().bits(), 0b1011);
        assert_eq!(wiring.lines_low.get(), 0b0010);

        port.release_columns();
        assert_eq!(wiring.lines_low.get(), 0);
    }

    #[test]
    fn test_out_of_range_line_is_ignored() {
        let wiring = Rc::new(Wiring::default());
        let mut port = port(&wiring);
        port.drive_column_low(COLUMN_LINES);
        assert_eq!(wiring.writes.get(), 0);
    }

    #[test]
    fn test_read_errors_count_as_released() {
        let wiring = Rc::new(Wiring::default());
        let cols = [0, 1, 2, 3].map(|line| Col { line, wiring: wiring.clone() });
        let mut port = PinPort::new([Broken, Broken, Broken, Broken], cols);
        port.drive_column_low(0);
        assert_eq!(port.read_rows(), RowSample::RELEASED);
    }

    #[test]
    fn test_scanner_over_pins() {
        use crate::scan::Scanner;
        use crate::KeyCode;
        use embedded_hal::blocking::delay::DelayUs;

        struct NoDelay;
        impl DelayUs<u32> for NoDelay {
            fn delay_us(&mut self, _us: u32) {}
        }

        let wiring = Rc::new(Wiring::default());
        // Line 2 selects logical column 3; row 1 there is the 3 key.
        wiring.press(2, 1);
        let mut scanner = Scanner::new(port(&wiring), NoDelay);
        assert_eq!(scanner.poll(), KeyCode::Key3);
        assert_eq!(wiring.lines_low.get(), 0);
    }
}
