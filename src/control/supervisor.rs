// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Startup/shutdown state machine and the cascaded balance computation.
//!
//! The vehicle has to sit within `startup_angle` of upright for `startup_time` before the loops
//! get control of the motors. Once running, the velocity loop turns the average wheel speed into
//! a target lean angle and the balance loop turns the lean angle into a motor duty. Leaning past
//! `max_lean_angle` while running drops back to [`State::Idle`].

use micromath::F32Ext;

use crate::config;
use crate::control::pid::{Controller, Pid};
use crate::time::{elapsed, Duration, Instant};

/// Supervisor state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// Motors off, loops disabled, waiting for the vehicle to be upright.
    Idle,
    /// Motors off, loops disabled, timing the stability window.
    Starting,
    /// Both loops enabled and driving the motors.
    Running,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Idle => "idle",
            State::Starting => "starting",
            State::Running => "running",
        }
    }
}

/// Thresholds of the state machine and the cascade.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Limits {
    /// [rad]
    pub max_lean_angle: f32,
    /// [rad]
    pub startup_angle: f32,
    /// [rad] Largest target lean the velocity loop may request.
    pub max_working_angle: f32,
    pub startup_time: Duration,
    pub duty_min: f32,
    pub duty_max: f32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_lean_angle: config::MAX_LEAN_ANGLE,
            startup_angle: config::STARTUP_ANGLE,
            max_working_angle: config::MAX_WORKING_ANGLE,
            startup_time: config::STARTUP_TIME,
            duty_min: config::DUTY_MIN,
            duty_max: config::DUTY_MAX,
        }
    }
}

/// What the caller should do with the motors after an update.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Actuation {
    /// Leave the motors as they are.
    Hold,
    /// Apply a new duty to both wheels.
    Duty(f32),
    /// The vehicle fell over: stop both wheels.
    Stop,
}

pub struct Supervisor<C: Controller = Pid> {
    balance: C,
    velocity: C,
    limits: Limits,
    state: State,
    start_timestamp: Option<Instant>,
    duty: f32,
}

impl<C: Controller> Supervisor<C> {
    /// Take both loops; they stay disabled until the vehicle has been upright long enough.
    pub fn new(mut balance: C, mut velocity: C, limits: Limits) -> Self {
        balance.disable();
        velocity.disable();

        Self {
            balance,
            velocity,
            limits,
            state: State::Idle,
            start_timestamp: None,
            duty: 0.0,
        }
    }

    /// Run one control cycle.
    ///
    /// `angle` is the lean angle in radians, `speed_left`/`speed_right` the signed wheel
    /// frequencies.
    pub fn update(&mut self, angle: f32, speed_left: f32, speed_right: f32, now: Instant) -> Actuation {
        let tilt = angle.abs();

        match self.state {
            State::Running if tilt > self.limits.max_lean_angle => {
                self.balance.disable();
                self.velocity.disable();
                self.state = State::Idle;
                self.start_timestamp = None;
                self.duty = 0.0;
                return Actuation::Stop;
            }
            State::Running => {}
            State::Idle => {
                if tilt <= self.limits.startup_angle {
                    self.state = State::Starting;
                    self.start_timestamp = Some(now);
                }
                return Actuation::Hold;
            }
            State::Starting => {
                if tilt > self.limits.startup_angle {
                    self.state = State::Idle;
                    self.start_timestamp = None;
                    return Actuation::Hold;
                }

                let since = self.start_timestamp.unwrap_or(now);
                if elapsed(since, now) < self.limits.startup_time {
                    return Actuation::Hold;
                }

                self.balance.enable();
                self.velocity.enable();
                self.state = State::Running;
            }
        }

        self.cascade(angle, speed_left, speed_right, now)
    }

    fn cascade(&mut self, angle: f32, speed_left: f32, speed_right: f32, now: Instant) -> Actuation {
        let speed = (speed_left + speed_right) / 2.0;

        if self.velocity.compute(speed, now) {
            let lean = self.limits.max_working_angle;
            self.balance.set_target(self.velocity.output().clamp(-lean, lean));
        }

        if !self.balance.compute(angle, now) {
            return Actuation::Hold;
        }

        self.duty = self
            .balance
            .output()
            .clamp(self.limits.duty_min, self.limits.duty_max);
        Actuation::Duty(self.duty)
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    /// When the current stability window started, while [`State::Starting`] or later.
    #[inline]
    pub fn start_timestamp(&self) -> Option<Instant> {
        self.start_timestamp
    }

    /// Last published duty.
    #[inline]
    pub fn duty(&self) -> f32 {
        self.duty
    }

    #[inline]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    #[inline]
    pub fn balance(&self) -> &C {
        &self.balance
    }

    #[inline]
    pub fn balance_mut(&mut self) -> &mut C {
        &mut self.balance
    }

    #[inline]
    pub fn velocity(&self) -> &C {
        &self.velocity
    }

    #[inline]
    pub fn velocity_mut(&mut self) -> &mut C {
        &mut self.velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Gains;
    use crate::control::{balance_loop, velocity_loop};

    fn at_ms(ms: u32) -> Instant {
        Instant::from_ticks(ms * 1_000)
    }

    fn supervisor() -> Supervisor {
        Supervisor::new(
            balance_loop(Gains::new(650.0, 3200.0, 45.0)),
            velocity_loop(Gains::new(0.0, 0.0, 0.0)),
            Limits::default(),
        )
    }

    /// Hold the vehicle at `angle` every 10 ms from `from` until `to` inclusive.
    fn hold(sup: &mut Supervisor, angle: f32, from: u32, to: u32) -> Actuation {
        let mut last = Actuation::Hold;
        let mut t = from;
        while t <= to {
            last = sup.update(angle, 0.0, 0.0, at_ms(t));
            t += 10;
        }
        last
    }

    #[test]
    fn starts_idle_with_loops_disabled() {
        let sup = supervisor();
        assert_eq!(sup.state(), State::Idle);
        assert!(!sup.balance().is_enabled());
        assert!(!sup.velocity().is_enabled());
    }

    #[test]
    fn stays_idle_while_too_tilted() {
        let mut sup = supervisor();
        let act = hold(&mut sup, 0.5, 0, 2_000);
        assert_eq!(act, Actuation::Hold);
        assert_eq!(sup.state(), State::Idle);
    }

    #[test]
    fn runs_exactly_when_startup_time_elapses() {
        let mut sup = supervisor();
        assert_eq!(sup.update(0.0, 0.0, 0.0, at_ms(0)), Actuation::Hold);
        assert_eq!(sup.state(), State::Starting);
        assert_eq!(sup.start_timestamp(), Some(at_ms(0)));

        assert_eq!(sup.update(0.01, 0.0, 0.0, at_ms(799)), Actuation::Hold);
        assert_eq!(sup.state(), State::Starting);
        assert!(!sup.balance().is_enabled());

        let act = sup.update(0.01, 0.0, 0.0, at_ms(800));
        assert_eq!(sup.state(), State::Running);
        assert!(sup.balance().is_enabled());
        assert!(sup.velocity().is_enabled());
        assert!(matches!(act, Actuation::Duty(_)));
    }

    #[test]
    fn leaving_window_restarts_timer() {
        let mut sup = supervisor();
        hold(&mut sup, 0.0, 0, 500);
        assert_eq!(sup.state(), State::Starting);

        sup.update(0.3, 0.0, 0.0, at_ms(510));
        assert_eq!(sup.state(), State::Idle);

        // Back within the window: a fresh 800 ms is needed.
        sup.update(0.0, 0.0, 0.0, at_ms(520));
        assert_eq!(sup.start_timestamp(), Some(at_ms(520)));
        sup.update(0.0, 0.0, 0.0, at_ms(1_300));
        assert_eq!(sup.state(), State::Starting);
        sup.update(0.0, 0.0, 0.0, at_ms(1_320));
        assert_eq!(sup.state(), State::Running);
    }

    #[test]
    fn fall_over_stops_and_disables() {
        let mut sup = supervisor();
        hold(&mut sup, 0.0, 0, 1_000);
        assert_eq!(sup.state(), State::Running);

        let act = sup.update(-1.0, 0.0, 0.0, at_ms(1_005));
        assert_eq!(act, Actuation::Stop);
        assert_eq!(sup.state(), State::Idle);
        assert!(!sup.balance().is_enabled());
        assert!(!sup.velocity().is_enabled());
        assert_eq!(sup.duty(), 0.0);
        assert_eq!(sup.balance().output(), 0.0);
    }

    #[test]
    fn tilt_between_startup_and_lean_limit_keeps_running() {
        let mut sup = supervisor();
        hold(&mut sup, 0.0, 0, 1_000);
        let act = sup.update(0.4, 0.0, 0.0, at_ms(1_010));
        assert_eq!(sup.state(), State::Running);
        assert!(matches!(act, Actuation::Duty(_)));
    }

    #[test]
    fn duty_only_when_balance_loop_recomputes() {
        let mut sup = supervisor();
        hold(&mut sup, 0.0, 0, 800);
        assert_eq!(sup.state(), State::Running);

        assert_eq!(sup.update(0.05, 0.0, 0.0, at_ms(805)), Actuation::Hold);
        assert!(matches!(sup.update(0.05, 0.0, 0.0, at_ms(810)), Actuation::Duty(_)));
    }

    #[test]
    fn duty_is_clamped_to_actuator_range() {
        let mut sup = supervisor();
        hold(&mut sup, 0.0, 0, 800);

        match sup.update(0.6, 0.0, 0.0, at_ms(810)) {
            Actuation::Duty(d) => assert_eq!(d, config::DUTY_MIN),
            other => panic!("unexpected {:?}", other),
        }
        match sup.update(-0.6, 0.0, 0.0, at_ms(820)) {
            Actuation::Duty(d) => assert!(d <= config::DUTY_MAX && d >= config::DUTY_MIN),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn velocity_loop_sets_clamped_balance_target() {
        let mut sup = Supervisor::new(
            balance_loop(Gains::new(1.0, 0.0, 0.0)),
            velocity_loop(Gains::new(1.0, 0.0, 0.0)),
            Limits::default(),
        );
        hold(&mut sup, 0.0, 0, 800);
        assert_eq!(sup.state(), State::Running);

        // The velocity loop is reverse acting and saturates either way.
        sup.update(0.0, 50.0, 50.0, at_ms(1_000));
        assert_eq!(sup.balance().target(), config::MAX_WORKING_ANGLE);

        sup.update(0.0, -50.0, -50.0, at_ms(1_100));
        assert_eq!(sup.balance().target(), -config::MAX_WORKING_ANGLE);
    }
}
