// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Vehicle lean angle from an inclinometer and a tunable zero offset.
//!
//! The offset compensates for how the sensor board is mounted: with the vehicle balanced at its
//! center of mass, `angle()` should read zero.

use core::f32::consts::PI;

use crate::sensors::Inclinometer;

/// Rejected zero offset, outside `[-π, π]`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ZeroOutOfRange(pub f32);

/// Wrap an angle into `(-π, π]`.
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    if angle <= -PI {
        angle + 2.0 * PI
    } else if angle > PI {
        angle - 2.0 * PI
    } else {
        angle
    }
}

/// Lean angle source with zero offset.
pub struct Tilt<S> {
    sensor: S,
    zero_angle: f32,
}

impl<S: Inclinometer> Tilt<S> {
    /// Wrap `sensor`, starting with no offset.
    pub fn new(sensor: S) -> Self {
        Self {
            sensor,
            zero_angle: 0.0,
        }
    }

    /// Bring up the sensor.
    #[inline]
    pub fn begin(&mut self) -> Result<(), S::Error> {
        self.sensor.begin()
    }

    /// Service the sensor. Call every cycle.
    #[inline]
    pub fn poll(&mut self) -> Result<(), S::Error> {
        self.sensor.poll()
    }

    /// [rad] Lean angle in `(-π, π]`, positive leaning forward.
    pub fn angle(&self) -> f32 {
        wrap_angle(self.sensor.inclination() + self.zero_angle)
    }

    /// [rad] Current zero offset.
    #[inline]
    pub fn zero_angle(&self) -> f32 {
        self.zero_angle
    }

    /// Set the zero offset, which must lie in `[-π, π]`.
    pub fn set_zero_angle(&mut self, zero_angle: f32) -> Result<(), ZeroOutOfRange> {
        if !(-PI..=PI).contains(&zero_angle) {
            return Err(ZeroOutOfRange(zero_angle));
        }
        self.zero_angle = zero_angle;
        Ok(())
    }

    /// Access the underlying sensor.
    #[inline]
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Mutable access to the underlying sensor.
    #[inline]
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn free(self) -> S {
        self.sensor
    }
}
