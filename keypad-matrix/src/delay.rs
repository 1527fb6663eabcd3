//! Busy-wait delays measured against a free-running countdown timer.
//!
//! The timer counts down to zero and reloads itself with a fixed value
//! (a Cortex-M SysTick, or an AVR timer in CTC mode viewed from the top).
//! The delay only ever reads the counter, so it can share the timer with a
//! periodic tick interrupt.

use embedded_hal::blocking::delay::{DelayMs, DelayUs};

/// A free-running, auto-reloading down-counter.
pub trait Countdown {
    /// Current counter value.
    fn current(&mut self) -> u32;

    /// Value the counter is loaded with after it passes zero.
    fn reload(&mut self) -> u32;
}

/// Ticks elapsed between two counter samples.
///
/// A strict increase means the counter wrapped through zero and reloaded.
pub fn elapsed_ticks(previous: u32, current: u32, reload: u32) -> u32 {
    if current < previous {
        previous - current
    } else if current > previous {
        previous.wrapping_add(reload.wrapping_sub(current))
    } else {
        0
    }
}

/// Microsecond delay provider on top of a [`Countdown`].
pub struct Delay<C> {
    counter: C,
    ticks_per_us: u32,
}

impl<C: Countdown> Delay<C> {
    /// Configures a countdown as a delay provider.
    /// `core_clock_hz` is the frequency the counter ticks at.
    pub fn new(counter: C, core_clock_hz: u32) -> Self {
        Delay {
            counter,
            ticks_per_us: core_clock_hz / 1_000_000,
        }
    }

    pub fn ticks_per_us(&self) -> u32 {
        self.ticks_per_us
    }

    /// Spin until at least `us` microseconds worth of ticks have elapsed.
    ///
    /// The tick count saturates, so a request too large for the counter
    /// arithmetic waits for `u32::MAX` ticks rather than wrapping short.
    pub fn delay_us(&mut self, us: u32) {
        let ticks = us.saturating_mul(self.ticks_per_us);
        if ticks == 0 {
            return;
        }

        let reload = self.counter.reload();
        let mut previous = self.counter.current();
        let mut elapsed: u32 = 0;

        while elapsed < ticks {
            let current = self.counter.current();
            elapsed = elapsed.saturating_add(elapsed_ticks(previous, current, reload));
            previous = current;
        }
    }

    pub fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1_000);
        }
    }

    /// Release the underlying counter.
    pub fn free(self) -> C {
        self.counter
    }
}

impl<C: Countdown> DelayUs<u32> for Delay<C> {
    fn delay_us(&mut self, us: u32) {
        Delay::delay_us(self, us);
    }
}

impl<C: Countdown> DelayUs<u16> for Delay<C> {
    fn delay_us(&mut self, us: u16) {
        Delay::delay_us(self, us as u32);
    }
}

impl<C: Countdown> DelayUs<u8> for Delay<C> {
    fn delay_us(&mut self, us: u8) {
        Delay::delay_us(self, us as u32);
    }
}

impl<C: Countdown> DelayMs<u32> for Delay<C> {
    fn delay_ms(&mut self, ms: u32) {
        Delay::delay_ms(self, ms);
    }
}

impl<C: Countdown> DelayMs<u16> for Delay<C> {
    fn delay_ms(&mut self, ms: u16) {
        Delay::delay_ms(self, ms as u32);
    }
}

impl<C: Countdown> DelayMs<u8> for Delay<C> {
    fn delay_ms(&mut self, ms: u8) {
        Delay::delay_ms(self, ms as u32);
    }
}
