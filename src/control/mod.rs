// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! This module provides the closed-loop control of the vehicle.
//!
//! ## Modules
//!
//! - [`pid`] - General-purpose PID controller implementation.
//! - [`supervisor`] - Startup/shutdown state machine and the balance/velocity cascade.

pub mod pid;
pub mod supervisor;

pub use pid::{Action, Controller, Pid};
pub use supervisor::{Actuation, Limits, State, Supervisor};

use crate::config::{self, Gains};

/// Inner loop: lean angle in, motor duty out.
pub fn balance_loop(gains: Gains) -> Pid {
    Pid::new(gains.kp, gains.ki, gains.kd, config::BALANCE_PID_SAMPLE_PERIOD)
        .with_output_limits(config::DUTY_MIN, config::DUTY_MAX)
}

/// Outer loop: average wheel speed in, target lean angle out.
pub fn velocity_loop(gains: Gains) -> Pid {
    Pid::new(gains.kp, gains.ki, gains.kd, config::VELOCITY_PID_SAMPLE_PERIOD)
        .with_output_limits(-config::MAX_WORKING_ANGLE, config::MAX_WORKING_ANGLE)
        .with_action(Action::Reverse)
}
