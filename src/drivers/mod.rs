// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit between the MCU peripherals and the
//! measurement/actuation layers. They are written against `embedded-hal` traits, so the same code
//! runs on the board and against fakes in host tests.
//!
//! ## Existing drivers
//!
//! - [`quadrature`] – interrupt-side decoding of two-phase wheel encoders
//! - [`mx1616`] – MX1616 dual H-bridge motor driver
//! - [`mpu6050`] – InvenSense MPU6050 accelerometer as an inclinometer

pub mod mpu6050;
pub mod mx1616;
pub mod quadrature;

pub use mpu6050::Mpu6050;
pub use mx1616::Mx1616;
pub use quadrature::{Direction, EdgeQueue, Pulse, PulseCounter};
