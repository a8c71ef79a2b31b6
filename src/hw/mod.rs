// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # MCU-Level Wrappers
//!
//! Everything except [`led`] touches STM32F7 registers and is only built with the `board`
//! feature.

pub mod led;

#[cfg(feature = "board")]
pub mod backup_sram;
#[cfg(feature = "board")]
pub mod clock;
#[cfg(feature = "board")]
pub mod exti;
#[cfg(feature = "board")]
pub mod pins;
#[cfg(feature = "board")]
pub mod pwm;
#[cfg(feature = "board")]
pub mod usart;

pub use led::Led;

#[cfg(feature = "board")]
pub use backup_sram::BackupSram;
#[cfg(feature = "board")]
pub use clock::MonoTimer;
#[cfg(feature = "board")]
pub use pins::BoardPins;
#[cfg(feature = "board")]
pub use usart::Usart;
