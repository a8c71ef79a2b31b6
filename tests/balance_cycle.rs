// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Full control cycle against fake hardware.

use std::cell::Cell;

use balancer::app::{Balancer, Fault, Parts};
use balancer::config;
use balancer::control::{Actuation, Controller, State};
use balancer::drivers::EdgeQueue;
use balancer::motors::Actuator;
use balancer::sensors::{Inclinometer, TimingEstimator};
use balancer::store::{OutOfBounds, Param, RamStorage, STORE_SIZE};
use balancer::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImuError {
    Missing,
    Bus,
}

struct FakeImu<'a> {
    angle: &'a Cell<f32>,
    present: bool,
    failing: &'a Cell<bool>,
}

impl Inclinometer for FakeImu<'_> {
    type Error = ImuError;

    fn begin(&mut self) -> Result<(), ImuError> {
        if self.present {
            Ok(())
        } else {
            Err(ImuError::Missing)
        }
    }

    fn poll(&mut self) -> Result<(), ImuError> {
        if self.failing.get() {
            Err(ImuError::Bus)
        } else {
            Ok(())
        }
    }

    fn inclination(&self) -> f32 {
        self.angle.get()
    }
}

struct FakeMotor<'a> {
    duty: &'a Cell<i8>,
}

impl Actuator for FakeMotor<'_> {
    fn set_duty(&mut self, duty: i8) {
        self.duty.set(duty);
    }

    fn stop(&mut self) {
        self.duty.set(0);
    }
}

struct Rig {
    angle: Cell<f32>,
    failing: Cell<bool>,
    left: Cell<i8>,
    right: Cell<i8>,
    queue_left: EdgeQueue,
    queue_right: EdgeQueue,
}

type TestBalancer<'a> =
    Balancer<FakeImu<'a>, TimingEstimator<'a>, FakeMotor<'a>, FakeMotor<'a>, RamStorage<STORE_SIZE>>;

impl Rig {
    fn new() -> Self {
        Self {
            // Cancels the default zero offset: reads as upright.
            angle: Cell::new(-config::GYRO_ZERO_ANGLE),
            failing: Cell::new(false),
            left: Cell::new(99),
            right: Cell::new(99),
            queue_left: EdgeQueue::new(config::ENCODER_L_FW_LEVEL),
            queue_right: EdgeQueue::new(config::ENCODER_R_FW_LEVEL),
        }
    }

    fn parts(
        &self,
        present: bool,
        storage: RamStorage<STORE_SIZE>,
    ) -> Parts<FakeImu<'_>, TimingEstimator<'_>, FakeMotor<'_>, FakeMotor<'_>, RamStorage<STORE_SIZE>>
    {
        Parts {
            sensor: FakeImu {
                angle: &self.angle,
                present,
                failing: &self.failing,
            },
            encoder_left: encoder(&self.queue_left),
            encoder_right: encoder(&self.queue_right),
            motor_left: FakeMotor { duty: &self.left },
            motor_right: FakeMotor { duty: &self.right },
            storage,
        }
    }

    fn start(&self, log: &mut String) -> TestBalancer<'_> {
        Balancer::start(self.parts(true, RamStorage::new()), log).unwrap()
    }

    /// Set the lean angle as the balancer will see it.
    fn lean(&self, angle: f32) {
        self.angle.set(angle - config::GYRO_ZERO_ANGLE);
    }
}

fn encoder(queue: &EdgeQueue) -> TimingEstimator<'_> {
    TimingEstimator::new(
        queue,
        config::ENCODER_SAMPLE_PERIOD,
        config::PULSES_PER_REVOLUTION,
        config::MIN_PULSE_DURATION,
        config::PULSE_TIMEOUT,
        at_ms(0),
    )
}

fn at_ms(ms: u32) -> Instant {
    Instant::from_ticks(ms * 1_000)
}

/// Run cycles every 10 ms from `from` to `to` inclusive.
fn run(balancer: &mut TestBalancer<'_>, log: &mut String, from: u32, to: u32) -> Actuation {
    let mut last = Actuation::Hold;
    let mut t = from;
    while t <= to {
        last = balancer.cycle(at_ms(t), log).unwrap();
        t += 10;
    }
    last
}

fn request(balancer: &mut TestBalancer<'_>, line: &str) -> String {
    let mut out = String::new();
    for b in line.bytes() {
        balancer.handle_byte(b, &mut out).unwrap();
    }
    out
}

#[test]
fn start_stops_motors_and_seeds_store() {
    let rig = Rig::new();
    let mut log = String::new();
    let balancer = rig.start(&mut log);

    assert_eq!(balancer.state(), State::Idle);
    assert_eq!((rig.left.get(), rig.right.get()), (0, 0));
    assert!(log.contains("# parameter store seeded with defaults"));
    assert_eq!(balancer.tilt().zero_angle(), config::GYRO_ZERO_ANGLE);
    assert!(balancer.angle().abs() < 1e-6);
}

#[test]
fn missing_sensor_is_fatal() {
    let rig = Rig::new();
    let mut log = String::new();
    let result = Balancer::start(rig.parts(false, RamStorage::new()), &mut log);
    assert!(matches!(result, Err(Fault::Sensor(ImuError::Missing))));
}

#[test]
fn balances_after_startup_window_then_falls_over() {
    let rig = Rig::new();
    let mut log = String::new();
    let mut balancer = rig.start(&mut log);

    rig.lean(0.02);
    run(&mut balancer, &mut log, 0, 790);
    assert_eq!(balancer.state(), State::Starting);
    assert_eq!(rig.left.get(), 0);

    let act = balancer.cycle(at_ms(800), &mut log).unwrap();
    assert!(matches!(act, Actuation::Duty(_)));
    assert_eq!(balancer.state(), State::Running);
    assert!(rig.left.get() < 0);
    assert_eq!(rig.left.get(), rig.right.get());
    assert_eq!(balancer.drive().duty(), rig.left.get());
    assert!(log.contains("# state idle -> starting"));
    assert!(log.contains("# state starting -> running"));

    rig.lean(1.0);
    let act = balancer.cycle(at_ms(805), &mut log).unwrap();
    assert_eq!(act, Actuation::Stop);
    assert_eq!(balancer.state(), State::Idle);
    assert_eq!((rig.left.get(), rig.right.get()), (0, 0));
    assert!(!balancer.supervisor().balance().is_enabled());
    assert!(log.contains("# fell over"));
    assert!(log.contains("# state running -> idle"));
}

#[test]
fn sensor_failure_stops_motors() {
    let rig = Rig::new();
    let mut log = String::new();
    let mut balancer = rig.start(&mut log);

    rig.lean(0.02);
    run(&mut balancer, &mut log, 0, 800);
    assert!(rig.left.get() != 0);

    rig.failing.set(true);
    let result = balancer.cycle(at_ms(810), &mut log);
    assert_eq!(result, Err(Fault::Sensor(ImuError::Bus)));
    assert_eq!((rig.left.get(), rig.right.get()), (0, 0));
}

#[test]
fn serial_tuning() {
    let rig = Rig::new();
    let mut log = String::new();
    let mut balancer = rig.start(&mut log);

    assert_eq!(request(&mut balancer, "balance-pid.kp\n"), "650.000000\n");
    assert_eq!(request(&mut balancer, "balance-pid.kp = 700\r\n"), "OK\n");
    assert_eq!(request(&mut balancer, "BALANCE-PID.KP\n"), "700.000000\n");
    assert_eq!(balancer.supervisor().balance().kp(), 700.0);
    assert_eq!(balancer.store_mut().get(Param::BalanceKp), Ok(700.0));

    assert_eq!(request(&mut balancer, "velocity-pid.ki=0.125\n"), "OK\n");
    assert_eq!(request(&mut balancer, "velocity-pid.ki\n"), "0.12500000\n");

    assert_eq!(request(&mut balancer, "s=1.5\n"), "OK\n");
    assert_eq!(balancer.supervisor().velocity().target(), 1.5);
    assert_eq!(request(&mut balancer, "s\n"), "DENIED\n");

    assert_eq!(request(&mut balancer, "x=20=200\n"), "MALFORMED\n");
    assert_eq!(request(&mut balancer, "\n"), "MALFORMED\n");
    assert_eq!(request(&mut balancer, "foo\n"), "UNKNOWN\n");
    assert_eq!(request(&mut balancer, "angle=1\n"), "DENIED\n");
    assert_eq!(request(&mut balancer, "balance-pid.kd=abc\n"), "ERROR\n");
    assert_eq!(balancer.supervisor().balance().kd(), config::BALANCE_PID_KD);

    assert_eq!(request(&mut balancer, "state\n"), "idle\n");
    assert_eq!(request(&mut balancer, "duty\n"), "0\n");
}

#[test]
fn tuned_gains_read_back_exactly() {
    let rig = Rig::new();
    let mut log = String::new();
    let mut balancer = rig.start(&mut log);

    assert_eq!(request(&mut balancer, "balance-pid.kp=1.234\n"), "OK\n");
    let reply = request(&mut balancer, "balance-pid.kp\n");
    let value: f32 = reply.trim_end().parse().unwrap();
    assert!((value - 1.234).abs() < 1e-6);

    assert_eq!(request(&mut balancer, "gyroscope.zero-angle=0.0125\n"), "OK\n");
    assert_eq!(request(&mut balancer, "gyroscope.zero-angle\n"), "0.012500\n");
}

#[test]
fn non_finite_gains_are_rejected() {
    let rig = Rig::new();
    let mut log = String::new();
    let mut balancer = rig.start(&mut log);

    for line in ["balance-pid.kp=1e39\n", "balance-pid.kp=inf\n", "velocity-pid.ki=-infinity\n"] {
        assert_eq!(request(&mut balancer, line), "ERROR\n");
    }
    assert_eq!(balancer.supervisor().balance().kp(), config::BALANCE_PID_KP);
    assert_eq!(balancer.supervisor().velocity().ki(), config::VELOCITY_PID_KI);
    assert_eq!(balancer.store_mut().get(Param::BalanceKp), Ok(config::BALANCE_PID_KP));
    assert_eq!(balancer.store_mut().get(Param::VelocityKi), Ok(config::VELOCITY_PID_KI));
}

#[test]
fn zero_angle_is_validated() {
    let rig = Rig::new();
    let mut log = String::new();
    let mut balancer = rig.start(&mut log);

    assert_eq!(request(&mut balancer, "gyroscope.zero-angle=4\n"), "ERROR\n");
    assert_eq!(request(&mut balancer, "gyroscope.zero-angle\n"), "-0.080000\n");

    assert_eq!(request(&mut balancer, "gyroscope.zero-angle=0.25\n"), "OK\n");
    assert_eq!(balancer.tilt().zero_angle(), 0.25);
    assert_eq!(balancer.store_mut().get(Param::ZeroAngle), Ok(0.25));
}

#[test]
fn tuned_values_survive_restart() {
    let rig = Rig::new();
    let mut log = String::new();
    let mut balancer = rig.start(&mut log);
    assert_eq!(request(&mut balancer, "velocity-pid.kp=0.5\n"), "OK\n");
    let parts = balancer.free();

    let mut log = String::new();
    let balancer = Balancer::start(rig.parts(true, parts.storage), &mut log).unwrap();
    assert!(!log.contains("seeded"));
    assert_eq!(balancer.supervisor().velocity().kp(), 0.5);
    assert_eq!(balancer.supervisor().balance().kp(), config::BALANCE_PID_KP);
}

#[test]
fn store_too_small_is_fatal() {
    let rig = Rig::new();
    let mut log = String::new();
    let parts = rig.parts(true, RamStorage::new());
    let parts = Parts {
        sensor: parts.sensor,
        encoder_left: parts.encoder_left,
        encoder_right: parts.encoder_right,
        motor_left: parts.motor_left,
        motor_right: parts.motor_right,
        storage: RamStorage::<4>::new(),
    };
    let result = Balancer::start(parts, &mut log);
    assert!(matches!(result, Err(Fault::Store(OutOfBounds))));
}
