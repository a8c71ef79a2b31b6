// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Generic PID controller for closed-loop control.
//!
//! Works in `no_std` and does not allocate memory.
//!
//! The controller runs at a fixed sample period: [`Controller::compute`] can be called every
//! main-loop cycle and only recomputes once the period has elapsed since the last computation.
//! Gains can be changed at any time and take effect on the next computation.

use crate::config::Gains;
use crate::time::{as_secs_f32, elapsed, Duration, Instant};

/// Whether the output rises or falls when the measurement is below the setpoint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Output grows with `setpoint - measurement`.
    Direct,
    /// Output grows with `measurement - setpoint`.
    Reverse,
}

impl Action {
    #[inline]
    fn sign(self) -> f32 {
        match self {
            Action::Direct => 1.0,
            Action::Reverse => -1.0,
        }
    }
}

/// A controller the supervisor can gate and tune.
pub trait Controller {
    /// Feed a new measurement. Returns `true` if a new output was computed; `false` leaves the
    /// previous output in place.
    fn compute(&mut self, measurement: f32, now: Instant) -> bool;

    /// Start computing, restarting from the current output.
    fn enable(&mut self);

    /// Stop computing and force the output to zero.
    fn disable(&mut self);

    fn is_enabled(&self) -> bool;

    /// Last computed output.
    fn output(&self) -> f32;

    fn set_target(&mut self, target: f32);

    fn target(&self) -> f32;

    fn kp(&self) -> f32;
    fn ki(&self) -> f32;
    fn kd(&self) -> f32;

    fn set_kp(&mut self, kp: f32);
    fn set_ki(&mut self, ki: f32);
    fn set_kd(&mut self, kd: f32);

    fn gains(&self) -> Gains {
        Gains::new(self.kp(), self.ki(), self.kd())
    }

    fn set_gains(&mut self, gains: Gains) {
        self.set_kp(gains.kp);
        self.set_ki(gains.ki);
        self.set_kd(gains.kd);
    }
}

/// PID controller with tunable gains, output clamping and a sample-period gate.
#[derive(Clone, Debug)]
pub struct Pid {
    /// Proportional gain
    kp: f32,
    /// Integral gain
    ki: f32,
    /// Derivative gain
    kd: f32,
    action: Action,

    setpoint: f32,
    output: f32,

    /// Integrator state
    integral: f32,
    /// Last process variable (for derivative term)
    prev_measurement: f32,

    /// Output clamp
    out_min: f32,
    out_max: f32,

    /// Integral clamp, unbounded unless set
    int_min: f32,
    int_max: f32,

    sample_period: Duration,
    last_compute: Option<Instant>,
    enabled: bool,

    first_update: bool,
}

impl Pid {
    /// Create a new, disabled PID controller.
    ///
    /// `kp`, `ki`, `kd` are the gain constants, `sample_period` the time between computations.
    pub fn new(kp: f32, ki: f32, kd: f32, sample_period: Duration) -> Self {
        Self {
            kp,
            ki,
            kd,
            action: Action::Direct,

            setpoint: 0.0,
            output: 0.0,

            integral: 0.0,
            prev_measurement: 0.0,

            out_min: -1.0,
            out_max: 1.0,

            int_min: f32::NEG_INFINITY,
            int_max: f32::INFINITY,

            sample_period,
            last_compute: None,
            enabled: false,

            first_update: true,
        }
    }

    /// Set output limits.
    pub fn with_output_limits(mut self, min: f32, max: f32) -> Self {
        self.out_min = min;
        self.out_max = max;
        self
    }

    /// Set integral limits for anti-windup.
    ///
    /// Without this the integral keeps accumulating while the output is saturated.
    pub fn with_integral_limits(mut self, min: f32, max: f32) -> Self {
        self.int_min = min;
        self.int_max = max;
        self
    }

    /// Set the controller action.
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Reset integrator + derivative history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_measurement = 0.0;
        self.first_update = true;
    }

    #[inline]
    pub fn sample_period(&self) -> Duration {
        self.sample_period
    }

    #[inline]
    pub fn output_limits(&self) -> (f32, f32) {
        (self.out_min, self.out_max)
    }

    /// Update the controller.
    ///
    /// `setpoint`: desired value
    /// `measurement`: current value
    /// `dt`: timestep in seconds (e.g. 0.01 for a 100 Hz control loop)
    ///
    /// Returns a command in [`out_min`, `out_max`]. A term that evaluates to NaN (e.g. an infinite
    /// gain times a zero error) holds the previous output and leaves the integral untouched.
    pub fn update(&mut self, setpoint: f32, measurement: f32, dt: f32) -> f32 {
        let sign = self.action.sign();
        let error = sign * (setpoint - measurement);

        // ----- P term -----
        let p = self.kp * error;

        // ----- I term -----
        let integral = self.integral + error * dt * self.ki;
        if !integral.is_nan() {
            self.integral = integral.clamp(self.int_min, self.int_max);
        }

        let i = self.integral;

        // ----- D term (on measurement to reduce noise sensitivity) -----
        let d = if self.first_update {
            self.first_update = false;
            0.0
        } else {
            let dv = sign * (self.prev_measurement - measurement);
            self.kd * (dv / dt)
        };
        self.prev_measurement = measurement;

        // ----- Output clamp -----
        // NaN passes through `clamp`: hold the previous output instead.
        let out = p + i + d;
        if out.is_nan() {
            return self.output.clamp(self.out_min, self.out_max);
        }
        out.clamp(self.out_min, self.out_max)
    }
}

impl Controller for Pid {
    fn compute(&mut self, measurement: f32, now: Instant) -> bool {
        if !self.enabled {
            return false;
        }

        if let Some(last) = self.last_compute {
            if elapsed(last, now) < self.sample_period {
                return false;
            }
        }
        self.last_compute = Some(now);

        let dt = as_secs_f32(self.sample_period);
        self.output = self.update(self.setpoint, measurement, dt);
        true
    }

    fn enable(&mut self) {
        if self.enabled {
            return;
        }

        self.reset();
        self.integral = self.output.clamp(self.int_min, self.int_max);
        self.last_compute = None;
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.output = 0.0;
        self.enabled = false;
    }

    #[inline]
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    fn output(&self) -> f32 {
        self.output
    }

    #[inline]
    fn set_target(&mut self, target: f32) {
        self.setpoint = target;
    }

    #[inline]
    fn target(&self) -> f32 {
        self.setpoint
    }

    #[inline]
    fn kp(&self) -> f32 {
        self.kp
    }

    #[inline]
    fn ki(&self) -> f32 {
        self.ki
    }

    #[inline]
    fn kd(&self) -> f32 {
        self.kd
    }

    #[inline]
    fn set_kp(&mut self, kp: f32) {
        self.kp = kp;
    }

    #[inline]
    fn set_ki(&mut self, ki: f32) {
        self.ki = ki;
    }

    #[inline]
    fn set_kd(&mut self, kd: f32) {
        self.kd = kd;
    }
}
