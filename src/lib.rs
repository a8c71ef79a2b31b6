// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Balancer Firmware
//!
//! This crate contains the firmware for a two-wheeled self-balancing vehicle, written in Rust,
//! targeting an STM32F777 MCU.
//!
//! The control core turns a tilt angle and two wheel encoder signals into motor duty commands,
//! and refuses to drive the motors until the vehicle has been held upright long enough.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | MCU-level wrappers around USART, timers, backup SRAM, LEDs |
//! | [`drivers`] | Device-level drivers (quadrature decoding, MX1616, MPU6050) |
//! | [`sensors`] | Wheel velocity estimation and tilt measurement |
//! | [`motors`] | Duty mapping and the two-wheel drive |
//! | [`control`] | PID loops and the startup/shutdown supervisor |
//! | [`protocol`] | Line-oriented tuning/telemetry protocol |
//! | [`store`] | Non-volatile tunable parameters |
//! | [`app`] | The control cycle gluing everything together |
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --features board --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![no_std]

pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod hw;
pub mod motors;
pub mod protocol;
pub mod sensors;
pub mod store;
pub mod time;
