// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Two-wheel drive commanded with a single duty.
//!
//! Balancing only needs forward/backward torque, so both wheels always receive the same command.

use crate::motors::Actuator;

/// Left and right wheel motors.
pub struct Drive<L, R> {
    left: L,
    right: R,
    duty: i8,
}

impl<L: Actuator, R: Actuator> Drive<L, R> {
    /// Take both motors, stopped.
    pub fn new(mut left: L, mut right: R) -> Self {
        left.stop();
        right.stop();
        Self {
            left,
            right,
            duty: 0,
        }
    }

    /// Drive both wheels with `duty`.
    pub fn set_duty(&mut self, duty: i8) {
        self.left.set_duty(duty);
        self.right.set_duty(duty);
        self.duty = duty;
    }

    /// Stop both wheels.
    pub fn stop(&mut self) {
        self.left.stop();
        self.right.stop();
        self.duty = 0;
    }

    /// Last duty applied to both wheels.
    #[inline]
    pub fn duty(&self) -> i8 {
        self.duty
    }

    #[inline]
    pub fn left(&self) -> &L {
        &self.left
    }

    #[inline]
    pub fn right(&self) -> &R {
        &self.right
    }

    /// Release both motors.
    pub fn free(self) -> (L, R) {
        (self.left, self.right)
    }
}
