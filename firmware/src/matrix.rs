//! Keypad lines on the ATmega32U4.
//!
//! Pin mapping:
//!   Column lines (outputs, idle high): PB0, PB1, PB2, PB3
//!   Row lines (inputs w/ pull-up):     PF4, PF5, PF6, PF7
//!
//! PF4 is row 0, so the row sample is just the high nibble of PINF.

use avr_device::atmega32u4::{Peripherals, PORTB, PORTF};
use keypad_matrix::{KeypadPort, RowSample, COLUMN_LINES};

/// Column lines on PORTB.
const COL_MASK: u8 = 0x0F;
/// Row lines on PORTF.
const ROW_MASK: u8 = 0xF0;
/// Bit position of row 0 in PINF.
const ROW_SHIFT: u8 = 4;

/// Configure the column outputs (released) and the row inputs.
pub fn init_gpio(dp: &Peripherals) {
    let portb = &dp.PORTB;
    let portf = &dp.PORTF;

    // Drive high before switching to output so no column glitches low
    portb.portb.modify(|r, w| unsafe { w.bits(r.bits() | COL_MASK) });
    portb.ddrb.modify(|r, w| unsafe { w.bits(r.bits() | COL_MASK) });

    // PF4-PF7: input with pull-up
    portf.ddrf.modify(|r, w| unsafe { w.bits(r.bits() & !ROW_MASK) });
    portf.portf.modify(|r, w| unsafe { w.bits(r.bits() | ROW_MASK) });
}

/// The keypad as seen through PORTB and PORTF.
pub struct Keypad<'a> {
    portb: &'a PORTB,
    portf: &'a PORTF,
}

impl<'a> Keypad<'a> {
    pub fn new(dp: &'a Peripherals) -> Self {
        Self {
            portb: &dp.PORTB,
            portf: &dp.PORTF,
        }
    }
}

impl KeypadPort for Keypad<'_> {
    fn release_columns(&mut self) {
        self.portb
            .portb
            .modify(|r, w| unsafe { w.bits(r.bits() | COL_MASK) });
    }

    fn drive_column_low(&mut self, line: usize) {
        if line < COLUMN_LINES {
            let bit = 1u8 << line;
            self.portb
                .portb
                .modify(|r, w| unsafe { w.bits(r.bits() & !bit) });
        }
    }

    fn read_rows(&mut self) -> RowSample {
        let pinf = self.portf.pinf.read().bits();
        RowSample::new((pinf & ROW_MASK) >> ROW_SHIFT)
    }
}
