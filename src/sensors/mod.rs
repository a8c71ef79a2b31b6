// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Measurement Layer
//!
//! This module turns raw driver readings into the quantities the control core works with.
//!
//! ## Modules
//!
//! - [`tilt`] - Lean angle with a tunable zero offset.
//! - [`velocity`] - Wheel velocity estimation from encoder pulses.

pub mod tilt;
pub mod velocity;

pub use tilt::Tilt;
pub use velocity::{CountingEstimator, TimingEstimator, WheelEncoder};

/// Inertial sensor reporting a single inclination angle.
///
/// The orientation math lives in the sensor (or its driver); the control core takes the
/// reading as ground truth.
pub trait Inclinometer {
    type Error;

    /// Bring up the sensor. Failure is fatal at startup.
    fn begin(&mut self) -> Result<(), Self::Error>;

    /// Service the sensor's internal buffer. Call every cycle.
    fn poll(&mut self) -> Result<(), Self::Error>;

    /// [rad] Latest inclination in `(-π, π]`.
    fn inclination(&self) -> f32;
}
