// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Properties exposed over the serial link.
//!
//! Gains and the zero offset are persisted as soon as they are set, so a tuned vehicle keeps its
//! settings across resets. The velocity target and the telemetry values are not persisted.

use core::fmt::Write;

use crate::control::{Controller, Supervisor};
use crate::protocol::{Access, Properties, Property, PropertyError, Value};
use crate::protocol::properties::write_number;
use crate::sensors::{Inclinometer, Tilt};
use crate::store::{Param, ParamStore, Storage};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Key {
    /// Velocity loop target (forward speed).
    Speed,
    ZeroAngle,
    BalanceKp,
    BalanceKi,
    BalanceKd,
    VelocityKp,
    VelocityKi,
    VelocityKd,
    State,
    Angle,
    Duty,
}

impl Key {
    /// Store slot backing this property, if it is persisted.
    fn param(self) -> Option<Param> {
        match self {
            Key::ZeroAngle => Some(Param::ZeroAngle),
            Key::BalanceKp => Some(Param::BalanceKp),
            Key::BalanceKi => Some(Param::BalanceKi),
            Key::BalanceKd => Some(Param::BalanceKd),
            Key::VelocityKp => Some(Param::VelocityKp),
            Key::VelocityKi => Some(Param::VelocityKi),
            Key::VelocityKd => Some(Param::VelocityKd),
            Key::Speed | Key::State | Key::Angle | Key::Duty => None,
        }
    }
}

pub const PROPERTIES: [Property<Key>; 11] = [
    Property::new("s", Key::Speed, Access::WriteOnly),
    Property::new("gyroscope.zero-angle", Key::ZeroAngle, Access::ReadWrite),
    Property::new("balance-pid.kp", Key::BalanceKp, Access::ReadWrite),
    Property::new("balance-pid.ki", Key::BalanceKi, Access::ReadWrite),
    Property::new("balance-pid.kd", Key::BalanceKd, Access::ReadWrite),
    Property::new("velocity-pid.kp", Key::VelocityKp, Access::ReadWrite),
    Property::new("velocity-pid.ki", Key::VelocityKi, Access::ReadWrite),
    Property::new("velocity-pid.kd", Key::VelocityKd, Access::ReadWrite),
    Property::new("state", Key::State, Access::ReadOnly),
    Property::new("angle", Key::Angle, Access::ReadOnly),
    Property::new("duty", Key::Duty, Access::ReadOnly),
];

const BALANCE_DECIMALS: usize = 6;
const VELOCITY_DECIMALS: usize = 8;
const ANGLE_DECIMALS: usize = 4;

/// Borrowed view of the balancer state the properties act on.
pub struct Tuning<'a, S, C: Controller, P> {
    pub supervisor: &'a mut Supervisor<C>,
    pub tilt: &'a mut Tilt<S>,
    pub store: &'a mut ParamStore<P>,
    /// Duty currently applied to the wheels.
    pub duty: i8,
}

impl<S, C, P> Properties<Key> for Tuning<'_, S, C, P>
where
    S: Inclinometer,
    C: Controller,
    P: Storage,
{
    fn get(&mut self, key: Key, out: &mut Value) -> Result<(), PropertyError> {
        let balance = self.supervisor.balance();
        let velocity = self.supervisor.velocity();

        match key {
            Key::Speed => Err(PropertyError::Invalid),
            Key::ZeroAngle => write_number(out, self.tilt.zero_angle(), BALANCE_DECIMALS),
            Key::BalanceKp => write_number(out, balance.kp(), BALANCE_DECIMALS),
            Key::BalanceKi => write_number(out, balance.ki(), BALANCE_DECIMALS),
            Key::BalanceKd => write_number(out, balance.kd(), BALANCE_DECIMALS),
            Key::VelocityKp => write_number(out, velocity.kp(), VELOCITY_DECIMALS),
            Key::VelocityKi => write_number(out, velocity.ki(), VELOCITY_DECIMALS),
            Key::VelocityKd => write_number(out, velocity.kd(), VELOCITY_DECIMALS),
            Key::State => out
                .push_str(self.supervisor.state().as_str())
                .map_err(|_| PropertyError::Invalid),
            Key::Angle => write_number(out, self.tilt.angle(), ANGLE_DECIMALS),
            Key::Duty => write!(out, "{}", self.duty).map_err(|_| PropertyError::Invalid),
        }
    }

    fn set(&mut self, key: Key, value: f32) -> Result<(), PropertyError> {
        match key {
            Key::Speed => self.supervisor.velocity_mut().set_target(value),
            Key::ZeroAngle => self
                .tilt
                .set_zero_angle(value)
                .map_err(|_| PropertyError::Invalid)?,
            Key::BalanceKp => self.supervisor.balance_mut().set_kp(value),
            Key::BalanceKi => self.supervisor.balance_mut().set_ki(value),
            Key::BalanceKd => self.supervisor.balance_mut().set_kd(value),
            Key::VelocityKp => self.supervisor.velocity_mut().set_kp(value),
            Key::VelocityKi => self.supervisor.velocity_mut().set_ki(value),
            Key::VelocityKd => self.supervisor.velocity_mut().set_kd(value),
            Key::State | Key::Angle | Key::Duty => return Err(PropertyError::Invalid),
        }

        if let Some(param) = key.param() {
            self.store
                .set(param, value)
                .map_err(|_| PropertyError::Storage)?;
        }
        Ok(())
    }
}
