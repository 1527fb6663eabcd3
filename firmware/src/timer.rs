//! Timer1 as a free-running countdown for busy-wait delays.
//!
//! Timer1 runs in CTC mode at the full CPU clock and clears at OCR1A, so
//! `OCR1A - TCNT1` falls from OCR1A to 0 and jumps back to OCR1A once per
//! period, the same shape as a SysTick counter.

use avr_device::atmega32u4::{Peripherals, TC1};
use keypad_matrix::Countdown;

/// CPU clock, also the Timer1 tick rate (prescaler 1).
pub const CPU_HZ: u32 = 16_000_000;

/// Compare value for a 1 ms period.
const TOP: u16 = (CPU_HZ / 1_000 - 1) as u16;

/// TCCR1B waveform bit: CTC mode with TOP in OCR1A.
const WGM12: u8 = 1 << 3;
/// TCCR1B clock select: CPU clock, no prescaler.
const CS10: u8 = 1 << 0;
const _: () = assert!(WGM12 | CS10 == 0x09);

/// Start Timer1 in CTC mode at the CPU clock, cleared at TOP.
pub fn init(dp: &Peripherals) {
    let tc1 = &dp.TC1;
    tc1.tccr1a.write(|w| unsafe { w.bits(0) });
    tc1.ocr1a.write(|w| unsafe { w.bits(TOP) });
    tc1.tcnt1.write(|w| unsafe { w.bits(0) });
    tc1.tccr1b.write(|w| unsafe { w.bits(WGM12 | CS10) });
}

/// Read-only view of Timer1 as a down-counter.
pub struct Timer1Countdown<'a> {
    tc1: &'a TC1,
}

impl<'a> Timer1Countdown<'a> {
    pub fn new(tc1: &'a TC1) -> Self {
        Self { tc1 }
    }
}

impl Countdown for Timer1Countdown<'_> {
    fn current(&mut self) -> u32 {
        let top = self.tc1.ocr1a.read().bits();
        let count = self.tc1.tcnt1.read().bits();
        top.saturating_sub(count) as u32
    }

    fn reload(&mut self) -> u32 {
        self.tc1.ocr1a.read().bits() as u32
    }
}
