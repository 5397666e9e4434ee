//! The feedback LED.
//!
//! Feedback is a blocking blink sequence awaited inside the receiver task.
//! That is intentional: radio edges arriving during feedback are not examined,
//! which throttles how fast repeated learn presses can be processed and gives
//! the user unambiguous timing-based feedback.

use embassy_rp::gpio::{Level, Output};
use embassy_time::Timer;

use crate::shared_constants::{BLINK_OFF_DELAY, BLINK_ON_DELAY};

/// The visual indicator, blinking at 2.5 Hz.
pub struct Indicator {
    led: Output<'static>,
}

impl Indicator {
    #[must_use]
    pub const fn new(led: Output<'static>) -> Self {
        Self { led }
    }

    /// Blink `count` times, 200 ms on / 200 ms off each.
    pub async fn blink(&mut self, count: u8) {
        for _ in 0..count {
            self.led.set_level(Level::High);
            Timer::after(BLINK_ON_DELAY).await;
            self.led.set_level(Level::Low);
            Timer::after(BLINK_OFF_DELAY).await;
        }
    }

    /// Hold the indicator on or off, e.g. as the erase "armed" signal.
    pub fn set(&mut self, on: bool) {
        self.led
            .set_level(if on { Level::High } else { Level::Low });
    }
}
