// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Cycle
//!
//! [`Balancer`] owns every component of the vehicle and runs one control cycle per call to
//! [`Balancer::cycle`]. It is written against traits only, so the firmware binds it to the board
//! peripherals and the integration tests bind it to fakes.
//!
//! Diagnostics go to any `core::fmt::Write` sink, one line each, prefixed with `# ` so they can be
//! told apart from protocol replies on a shared serial link.

pub mod tuning;

use core::fmt::{self, Write};

use crate::control::{balance_loop, velocity_loop, Actuation, Limits, Pid, State, Supervisor};
use crate::motors::{duty_from_output, Actuator, Drive};
use crate::protocol::{dispatch, Parser, Reply};
use crate::sensors::{Inclinometer, Tilt, WheelEncoder};
use crate::store::{ParamStore, Storage, StoreError};
use crate::time::Instant;

use self::tuning::{Tuning, PROPERTIES};

/// Fatal condition of the balancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault<SE, PE> {
    /// The inclinometer failed to start or to deliver a reading.
    Sensor(SE),
    /// The parameter store could not be read or written.
    Store(PE),
}

impl<SE, PE> From<StoreError<PE>> for Fault<SE, PE> {
    fn from(e: StoreError<PE>) -> Self {
        Fault::Store(e.0)
    }
}

impl<SE: fmt::Debug, PE: fmt::Debug> fmt::Display for Fault<SE, PE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Sensor(e) => write!(f, "inclinometer fault: {:?}", e),
            Fault::Store(e) => write!(f, "parameter store fault: {:?}", e),
        }
    }
}

/// Hardware the balancer is assembled from.
pub struct Parts<S, E, L, R, P> {
    pub sensor: S,
    pub encoder_left: E,
    pub encoder_right: E,
    pub motor_left: L,
    pub motor_right: R,
    pub storage: P,
}

pub struct Balancer<S, E, L, R, P> {
    tilt: Tilt<S>,
    encoder_left: E,
    encoder_right: E,
    drive: Drive<L, R>,
    supervisor: Supervisor<Pid>,
    store: ParamStore<P>,
    parser: Parser,
}

impl<S, E, L, R, P> Balancer<S, E, L, R, P>
where
    S: Inclinometer,
    E: WheelEncoder,
    L: Actuator,
    R: Actuator,
    P: Storage,
{
    /// Load the tunables, bring up the inclinometer and stop the motors.
    pub fn start<W: Write>(
        parts: Parts<S, E, L, R, P>,
        log: &mut W,
    ) -> Result<Self, Fault<S::Error, P::Error>> {
        let drive = Drive::new(parts.motor_left, parts.motor_right);

        let mut store = ParamStore::new(parts.storage);
        if store.initialize()? {
            let _ = writeln!(log, "# parameter store seeded with defaults\r");
        }
        let params = store.load()?;

        let mut tilt = Tilt::new(parts.sensor);
        if tilt.set_zero_angle(params.zero_angle).is_err() {
            let _ = writeln!(log, "# stored zero angle {} out of range, ignored\r", params.zero_angle);
        }
        tilt.begin().map_err(Fault::Sensor)?;

        let supervisor = Supervisor::new(
            balance_loop(params.balance),
            velocity_loop(params.velocity),
            Limits::default(),
        );

        let _ = writeln!(log, "# balancer started, zero angle {:.2} rad\r", tilt.zero_angle());

        Ok(Self {
            tilt,
            encoder_left: parts.encoder_left,
            encoder_right: parts.encoder_right,
            drive,
            supervisor,
            store,
            parser: Parser::new(),
        })
    }

    /// Run one control cycle. Call as often as possible.
    ///
    /// A failed sensor poll stops the motors and is returned; the caller decides whether to halt.
    pub fn cycle<W: Write>(
        &mut self,
        now: Instant,
        log: &mut W,
    ) -> Result<Actuation, Fault<S::Error, P::Error>> {
        if let Err(e) = self.tilt.poll() {
            self.drive.stop();
            return Err(Fault::Sensor(e));
        }
        let angle = self.tilt.angle();

        self.encoder_left.tick(now);
        self.encoder_right.tick(now);

        let before = self.supervisor.state();
        let actuation = self.supervisor.update(
            angle,
            self.encoder_left.frequency(),
            self.encoder_right.frequency(),
            now,
        );
        let after = self.supervisor.state();

        match actuation {
            Actuation::Duty(duty) => self.drive.set_duty(duty_from_output(duty)),
            Actuation::Stop => {
                self.drive.stop();
                let _ = writeln!(log, "# fell over at {:.2} rad\r", angle);
            }
            Actuation::Hold => {}
        }

        if before != after {
            let _ = writeln!(log, "# state {} -> {}\r", before.as_str(), after.as_str());
        }

        Ok(actuation)
    }

    /// Feed one byte received on the serial link, writing a reply once a request is complete.
    pub fn handle_byte<W: Write>(&mut self, byte: u8, out: &mut W) -> fmt::Result {
        let Some(request) = self.parser.push(byte) else {
            return Ok(());
        };

        let reply = match request {
            Ok(request) => {
                let mut tuning = Tuning {
                    supervisor: &mut self.supervisor,
                    tilt: &mut self.tilt,
                    store: &mut self.store,
                    duty: self.drive.duty(),
                };
                dispatch(&mut tuning, &PROPERTIES, &request)
            }
            Err(malformed) => Reply::from(malformed),
        };

        reply.write_to(out)
    }

    /// Stop both motors, e.g. before halting.
    pub fn stop(&mut self) {
        self.drive.stop();
    }

    #[inline]
    pub fn state(&self) -> State {
        self.supervisor.state()
    }

    /// [rad] Lean angle of the last poll.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.tilt.angle()
    }

    #[inline]
    pub fn supervisor(&self) -> &Supervisor<Pid> {
        &self.supervisor
    }

    #[inline]
    pub fn tilt(&self) -> &Tilt<S> {
        &self.tilt
    }

    #[inline]
    pub fn drive(&self) -> &Drive<L, R> {
        &self.drive
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut ParamStore<P> {
        &mut self.store
    }

    /// Give back the parts, motors stopped.
    pub fn free(mut self) -> Parts<S, E, L, R, P> {
        self.drive.stop();
        let (motor_left, motor_right) = self.drive.free();
        Parts {
            sensor: self.tilt.free(),
            encoder_left: self.encoder_left,
            encoder_right: self.encoder_right,
            motor_left,
            motor_right,
            storage: self.store.free(),
        }
    }
}
