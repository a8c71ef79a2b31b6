// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Monotonic microsecond clock on TIM5.
//!
//! TIM5 is a 32-bit timer. It is prescaled to 1 MHz and left free-running over its full range,
//! so it wraps after about 71 minutes; [`crate::time::elapsed`] handles the wrap.

use stm32f7xx_hal::pac;

use crate::time::Instant;

pub struct MonoTimer {
    tim: pac::TIM5,
}

impl MonoTimer {
    /// Start TIM5 at 1 MHz. `timer_hz` is the APB1 timer input clock.
    pub fn tim5(tim5: pac::TIM5, timer_hz: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.tim5en().set_bit());

        let tim = tim5;

        // Disable counter while configuring
        tim.cr1.modify(|_, w| w.cen().clear_bit());

        // 1 tick per microsecond
        let prescaler = timer_hz / 1_000_000 - 1;
        tim.psc.write(|w| w.psc().bits(prescaler as u16));

        // Auto-reload: max 32-bit
        tim.arr.write(|w| w.bits(0xFFFF_FFFF));

        // Load the prescaler now, not at the first overflow
        tim.egr.write(|w| w.ug().set_bit());

        // Reset the counter
        tim.cnt.write(|w| w.bits(0));

        // Enable the counter
        tim.cr1.modify(|_, w| w.cen().set_bit());

        Self { tim }
    }

    #[inline]
    pub fn now(&self) -> Instant {
        Instant::from_ticks(self.tim.cnt.read().bits())
    }

    #[inline]
    pub fn free(self) -> pac::TIM5 {
        self.tim
    }
}

/// Current time, for interrupt handlers that do not own the timer.
///
/// Only meaningful once [`MonoTimer::tim5`] has run.
#[inline]
pub fn now() -> Instant {
    let tim = unsafe { &*pac::TIM5::ptr() };
    Instant::from_ticks(tim.cnt.read().bits())
}
