//! Keypad firmware for ATmega32U4 (Teensy 2.0).
//!
//! Polls the 5x4 keypad matrix every ~10 ms and lights the on-board LED
//! while a key is reported. Everything above raw key codes (edge detection,
//! repeat, actions) belongs to the application and is not done here.

#![no_std]
#![no_main]

mod matrix;
mod timer;

use avr_device::atmega32u4::Peripherals;
use keypad_matrix::{Delay, Scanner};

use matrix::Keypad;
use timer::Timer1Countdown;

/// Pause between polls.
const POLL_INTERVAL_MS: u32 = 10;

/// On-board LED, PD6.
const LED: u8 = 0x40;

/// Panic handler, on AVR we just loop forever.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}

/// Main entry point.
#[no_mangle]
pub extern "C" fn main() -> ! {
    let dp = unsafe { Peripherals::steal() };

    // Disable clock prescaler so Timer1 ticks at 16MHz
    dp.CPU.clkpr.write(|w| w.clkpce().set_bit());
    dp.CPU.clkpr.write(|w| unsafe { w.bits(0) });

    // PD6 output, LED off
    dp.PORTD.ddrd.modify(|r, w| unsafe { w.bits(r.bits() | LED) });
    dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() & !LED) });

    matrix::init_gpio(&dp);
    timer::init(&dp);

    // Both delays only read Timer1, so they can share it.
    let delay = Delay::new(Timer1Countdown::new(&dp.TC1), timer::CPU_HZ);
    let mut pause = Delay::new(Timer1Countdown::new(&dp.TC1), timer::CPU_HZ);
    let mut scanner = Scanner::new(Keypad::new(&dp), delay);

    loop {
        let key = scanner.poll();

        if key.is_invalid() {
            dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() & !LED) });
        } else {
            dp.PORTD.portd.modify(|r, w| unsafe { w.bits(r.bits() | LED) });
        }

        pause.delay_ms(POLL_INTERVAL_MS);
    }
}
