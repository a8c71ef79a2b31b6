// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Compile-time configuration and runtime-tunable defaults.
//!
//! Angles are given in degrees where a human picks them and exposed in radians, which is the only
//! unit the control core works with.

use core::f32::consts::PI;

use crate::time::{millis, Duration};

// Inclinometer

/// [rad] Default zero offset added to the raw inclination.
pub const GYRO_ZERO_ANGLE: f32 = -0.08;

/// I2C address of the MPU6050 module.
pub const GYRO_ADDRESS: u8 = 0x68;

/// Accelerometer offset register values (X, Y, Z) of the fitted module.
pub const GYRO_OFFSET_ACCEL: [i16; 3] = [-1255, -1113, 1708];
/// Gyroscope offset register values (X, Y, Z) of the fitted module.
pub const GYRO_OFFSET_GYRO: [i16; 3] = [-17, 65, 6];

// PID loops

/// Sample period of the balancing PID loop.
pub const BALANCE_PID_SAMPLE_PERIOD: Duration = millis(10);
/// Default proportional gain of the balancing PID loop.
pub const BALANCE_PID_KP: f32 = 650.0;
/// Default integral gain of the balancing PID loop.
pub const BALANCE_PID_KI: f32 = 3200.0;
/// Default derivative gain of the balancing PID loop.
pub const BALANCE_PID_KD: f32 = 45.0;

/// Sample period of the velocity PID loop.
pub const VELOCITY_PID_SAMPLE_PERIOD: Duration = millis(100);
/// Default proportional gain of the velocity PID loop.
pub const VELOCITY_PID_KP: f32 = 0.0;
/// Default integral gain of the velocity PID loop.
pub const VELOCITY_PID_KI: f32 = 0.0;
/// Default derivative gain of the velocity PID loop.
pub const VELOCITY_PID_KD: f32 = 0.0;

// Motors

/// Lowest duty the motor driver accepts.
pub const DUTY_MIN: f32 = i8::MIN as f32;
/// Highest duty the motor driver accepts.
pub const DUTY_MAX: f32 = i8::MAX as f32;

/// PWM carrier frequency of the motor bridges.
pub const MOTOR_PWM_HZ: u32 = 1_000;

// Encoders

/// Number of encoder pulses for each motor revolution.
pub const PULSES_PER_REVOLUTION: u32 = 8;

/// Sample period of the wheel velocity estimators.
///
/// `VELOCITY_PID_SAMPLE_PERIOD` should be a multiple of this.
pub const ENCODER_SAMPLE_PERIOD: Duration = VELOCITY_PID_SAMPLE_PERIOD;

/// Pulses closer together than this are contact bounce.
pub const MIN_PULSE_DURATION: Duration = Duration::from_ticks(600);

/// Without a pulse for this long the wheel is considered stopped.
pub const PULSE_TIMEOUT: Duration = millis(250);

/// Capacity of each wheel's pulse buffer.
pub const PULSE_BUFFER_LEN: usize = 8;

/// Phase B level on a phase A rising edge while the left wheel turns forward.
pub const ENCODER_L_FW_LEVEL: bool = false;
/// Phase B level on a phase A rising edge while the right wheel turns forward.
pub const ENCODER_R_FW_LEVEL: bool = true;

// Startup

/// [°] Maximum inclination where the loops will try to stabilize.
pub const MAX_LEAN_ANGLE_DEG: f32 = 40.0;
/// [°] Inclination range where the vehicle will switch on and try to stabilize.
pub const STARTUP_ANGLE_DEG: f32 = 10.0;
/// [°] Maximum lean the velocity loop may request.
pub const MAX_WORKING_ANGLE_DEG: f32 = 5.0;

/// [rad] Maximum inclination where the loops will try to stabilize.
pub const MAX_LEAN_ANGLE: f32 = MAX_LEAN_ANGLE_DEG * PI / 180.0;
/// [rad] Inclination range where the vehicle will switch on and try to stabilize.
pub const STARTUP_ANGLE: f32 = STARTUP_ANGLE_DEG * PI / 180.0;
/// [rad] Maximum lean the velocity loop may request.
pub const MAX_WORKING_ANGLE: f32 = MAX_WORKING_ANGLE_DEG * PI / 180.0;

/// Time the vehicle has to stay within `STARTUP_ANGLE` before the loops take over.
pub const STARTUP_TIME: Duration = millis(800);

// Serial link

/// Baud rate of the debug/tuning USART.
pub const SERIAL_BAUD: u32 = 115_200;

// Parameter store

/// Layout version of the parameter store. Bump when `store::Param` changes.
pub const STORE_VERSION: u32 = 12;

/// PID gains of a single loop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Gains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl Gains {
    pub const fn new(kp: f32, ki: f32, kd: f32) -> Self {
        Self { kp, ki, kd }
    }
}

/// Everything an operator can tune at runtime.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Params {
    /// [rad] Inclinometer zero offset.
    pub zero_angle: f32,
    pub balance: Gains,
    pub velocity: Gains,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            zero_angle: GYRO_ZERO_ANGLE,
            balance: Gains::new(BALANCE_PID_KP, BALANCE_PID_KI, BALANCE_PID_KD),
            velocity: Gains::new(VELOCITY_PID_KP, VELOCITY_PID_KI, VELOCITY_PID_KD),
        }
    }
}
