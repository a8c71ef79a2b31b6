// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Actuator Abstractions
//!
//! This module contains motor-level wrappers that sit above device-level drivers in `drivers`.
//!
//! The control core produces a floating-point duty; [`duty_from_output`] converts it into the
//! signed 8-bit command every [`Actuator`] accepts. Positive duty drives forward.
//!
//! ## Modules
//!
//! - [`drive`] - Both wheels driven from a single duty.

pub mod drive;

pub use drive::Drive;

use micromath::F32Ext;

/// A motor accepting a signed duty.
pub trait Actuator {
    /// Drive with `duty`; magnitude is power, sign is direction.
    fn set_duty(&mut self, duty: i8);

    /// Stop driving the motor.
    fn stop(&mut self);
}

/// Map a controller output onto the actuator range, rounding to the nearest step.
///
/// Out-of-range values saturate; NaN maps to zero.
#[inline]
pub fn duty_from_output(output: f32) -> i8 {
    if output.is_nan() {
        return 0;
    }
    output.round().clamp(i8::MIN as f32, i8::MAX as f32) as i8
}
