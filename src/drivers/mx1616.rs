// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! MX1616 dual H-bridge, one channel per wheel.
//!
//! Each channel has two inputs. PWM on the forward input with the backward input low drives
//! forward, and the other way round drives backward. Both low lets the motor coast.
//!
//! The duty is a signed 8-bit value. Both `127` and `-128` map to the full 8-bit PWM level, which
//! is then scaled onto the timer's resolution.

use embedded_hal::PwmPin;

use crate::motors::Actuator;

/// One MX1616 channel driven by two PWM outputs.
pub struct Mx1616<FW, BW> {
    forward: FW,
    backward: BW,
    duty: i8,
}

impl<FW, BW> Mx1616<FW, BW>
where
    FW: PwmPin<Duty = u16>,
    BW: PwmPin<Duty = u16>,
{
    /// Take both PWM outputs and start coasting.
    pub fn new(mut forward: FW, mut backward: BW) -> Self {
        forward.set_duty(0);
        backward.set_duty(0);
        forward.enable();
        backward.enable();

        Self {
            forward,
            backward,
            duty: 0,
        }
    }

    /// Release the PWM outputs.
    pub fn free(self) -> (FW, BW) {
        (self.forward, self.backward)
    }

    /// 8-bit PWM level for a signed duty. Full scale is 255 in both directions.
    #[inline]
    pub fn pwm_level(duty: i8) -> u8 {
        if duty >= 0 {
            (duty as u8) * 2 + 1
        } else {
            (-(duty as i16 + 1)) as u8 * 2 + 1
        }
    }

    fn scaled(&self, level: u8) -> u16 {
        let max = self.forward.get_max_duty() as u32;
        (level as u32 * max / u8::MAX as u32) as u16
    }

    /// Last commanded duty.
    #[inline]
    pub fn duty(&self) -> i8 {
        self.duty
    }
}

impl<FW, BW> Actuator for Mx1616<FW, BW>
where
    FW: PwmPin<Duty = u16>,
    BW: PwmPin<Duty = u16>,
{
    fn set_duty(&mut self, duty: i8) {
        self.duty = duty;

        if duty == 0 {
            self.forward.set_duty(0);
            self.backward.set_duty(0);
            return;
        }

        let pwm = self.scaled(Self::pwm_level(duty));
        if duty > 0 {
            self.backward.set_duty(0);
            self.forward.set_duty(pwm);
        } else {
            self.forward.set_duty(0);
            self.backward.set_duty(pwm);
        }
    }

    fn stop(&mut self) {
        self.set_duty(0);
    }
}
