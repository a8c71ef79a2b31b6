// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Four-channel PWM on TIM4 using direct PAC register access.
//!
//! Each channel implements `embedded_hal::PwmPin`, so the motor drivers do not need to know which
//! timer they run on. All channels share the period; duty goes from 0 to [`PWM_RESOLUTION`].

use embedded_hal::PwmPin;
use stm32f7xx_hal::pac;

/// Counts per PWM period.
pub const PWM_RESOLUTION: u16 = 1_000;

/// PWM mode 1 with preload for both channels of a CCMR register.
const CCMR_PWM1_PRELOAD: u32 = (0b110 << 4) | (1 << 3) | (0b110 << 12) | (1 << 11);

/// One TIM4 output compare channel, `C` in `1..=4`.
pub struct PwmChannel<const C: u8> {
    _private: (),
}

/// Configure TIM4 for `pwm_hz` and hand out its four channels, all disabled with zero duty.
///
/// `timer_hz` is the APB1 timer input clock.
pub fn tim4(
    _tim4: pac::TIM4,
    timer_hz: u32,
    pwm_hz: u32,
) -> (PwmChannel<1>, PwmChannel<2>, PwmChannel<3>, PwmChannel<4>) {
    let rcc = unsafe { &*pac::RCC::ptr() };
    rcc.apb1enr.modify(|_, w| w.tim4en().set_bit());

    let tim = unsafe { &*pac::TIM4::ptr() };

    // Disable counter while configuring
    tim.cr1.modify(|_, w| w.cen().clear_bit());

    let prescaler = timer_hz / (pwm_hz * PWM_RESOLUTION as u32) - 1;
    tim.psc.write(|w| w.psc().bits(prescaler as u16));
    tim.arr.write(|w| unsafe { w.bits(PWM_RESOLUTION as u32 - 1) });

    tim.ccmr1_output().write(|w| unsafe { w.bits(CCMR_PWM1_PRELOAD) });
    tim.ccmr2_output().write(|w| unsafe { w.bits(CCMR_PWM1_PRELOAD) });

    // All outputs off, active high
    tim.ccer.write(|w| unsafe { w.bits(0) });
    tim.ccr1.write(|w| unsafe { w.bits(0) });
    tim.ccr2.write(|w| unsafe { w.bits(0) });
    tim.ccr3.write(|w| unsafe { w.bits(0) });
    tim.ccr4.write(|w| unsafe { w.bits(0) });

    // Auto-reload preload, load everything, go
    tim.cr1.modify(|_, w| w.arpe().set_bit());
    tim.egr.write(|w| w.ug().set_bit());
    tim.cr1.modify(|_, w| w.cen().set_bit());

    (
        PwmChannel { _private: () },
        PwmChannel { _private: () },
        PwmChannel { _private: () },
        PwmChannel { _private: () },
    )
}

impl<const C: u8> PwmChannel<C> {
    #[inline]
    fn regs() -> &'static pac::tim3::RegisterBlock {
        unsafe { &*pac::TIM4::ptr() }
    }

    #[inline]
    fn enable_mask() -> u32 {
        1 << (4 * (C as u32 - 1))
    }
}

impl<const C: u8> PwmPin for PwmChannel<C> {
    type Duty = u16;

    fn disable(&mut self) {
        Self::regs()
            .ccer
            .modify(|r, w| unsafe { w.bits(r.bits() & !Self::enable_mask()) });
    }

    fn enable(&mut self) {
        Self::regs()
            .ccer
            .modify(|r, w| unsafe { w.bits(r.bits() | Self::enable_mask()) });
    }

    fn get_duty(&self) -> u16 {
        let tim = Self::regs();
        let bits = match C {
            1 => tim.ccr1.read().bits(),
            2 => tim.ccr2.read().bits(),
            3 => tim.ccr3.read().bits(),
            _ => tim.ccr4.read().bits(),
        };
        bits as u16
    }

    fn get_max_duty(&self) -> u16 {
        PWM_RESOLUTION
    }

    fn set_duty(&mut self, duty: u16) {
        let tim = Self::regs();
        let duty = duty.min(PWM_RESOLUTION) as u32;
        match C {
            1 => tim.ccr1.write(|w| unsafe { w.bits(duty) }),
            2 => tim.ccr2.write(|w| unsafe { w.bits(duty) }),
            3 => tim.ccr3.write(|w| unsafe { w.bits(duty) }),
            _ => tim.ccr4.write(|w| unsafe { w.bits(duty) }),
        }
    }
}
