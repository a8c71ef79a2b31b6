// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Non-volatile parameter store.
//!
//! Layout: a little-endian `u32` layout version at address 0, followed by one little-endian `f32`
//! slot per [`Param`]. When the stored version differs from [`STORE_VERSION`] every slot is
//! rewritten with its compile-time default.

use crate::config::{self, Gains, Params, STORE_VERSION};

/// Byte-addressed non-volatile memory.
pub trait Storage {
    type Error;

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), Self::Error>;

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfBounds;

/// Storage backed by a plain byte array. Starts erased (all `0xFF`).
pub struct RamStorage<const N: usize> {
    bytes: [u8; N],
}

impl<const N: usize> RamStorage<N> {
    pub const fn new() -> Self {
        Self { bytes: [0xFF; N] }
    }

    pub fn bytes(&self) -> &[u8; N] {
        &self.bytes
    }
}

impl<const N: usize> Default for RamStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Storage for RamStorage<N> {
    type Error = OutOfBounds;

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), OutOfBounds> {
        let src = self
            .bytes
            .get(address..address + buf.len())
            .ok_or(OutOfBounds)?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), OutOfBounds> {
        let dst = self
            .bytes
            .get_mut(address..address + data.len())
            .ok_or(OutOfBounds)?;
        dst.copy_from_slice(data);
        Ok(())
    }
}

/// A persisted tunable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Param {
    ZeroAngle,
    BalanceKp,
    BalanceKi,
    BalanceKd,
    VelocityKp,
    VelocityKi,
    VelocityKd,
}

impl Param {
    pub const ALL: [Param; 7] = [
        Param::ZeroAngle,
        Param::BalanceKp,
        Param::BalanceKi,
        Param::BalanceKd,
        Param::VelocityKp,
        Param::VelocityKi,
        Param::VelocityKd,
    ];

    const VERSION_ADDRESS: usize = 0;

    #[inline]
    fn address(self) -> usize {
        4 + self as usize * 4
    }

    /// Compile-time default.
    pub fn default_value(self) -> f32 {
        match self {
            Param::ZeroAngle => config::GYRO_ZERO_ANGLE,
            Param::BalanceKp => config::BALANCE_PID_KP,
            Param::BalanceKi => config::BALANCE_PID_KI,
            Param::BalanceKd => config::BALANCE_PID_KD,
            Param::VelocityKp => config::VELOCITY_PID_KP,
            Param::VelocityKi => config::VELOCITY_PID_KI,
            Param::VelocityKd => config::VELOCITY_PID_KD,
        }
    }
}

/// Bytes a [`ParamStore`] occupies.
pub const STORE_SIZE: usize = 4 + Param::ALL.len() * 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreError<E>(pub E);

impl<E> From<E> for StoreError<E> {
    fn from(e: E) -> Self {
        StoreError(e)
    }
}

pub struct ParamStore<S> {
    storage: S,
}

impl<S: Storage> ParamStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn free(self) -> S {
        self.storage
    }

    /// Seed defaults if the stored layout version is not the current one.
    ///
    /// Returns `true` if the defaults were written.
    pub fn initialize(&mut self) -> Result<bool, StoreError<S::Error>> {
        let mut word = [0u8; 4];
        self.storage.read(Param::VERSION_ADDRESS, &mut word)?;

        if u32::from_le_bytes(word) == STORE_VERSION {
            return Ok(false);
        }

        for param in Param::ALL {
            self.set(param, param.default_value())?;
        }
        self.storage
            .write(Param::VERSION_ADDRESS, &STORE_VERSION.to_le_bytes())?;

        Ok(true)
    }

    pub fn get(&mut self, param: Param) -> Result<f32, StoreError<S::Error>> {
        let mut word = [0u8; 4];
        self.storage.read(param.address(), &mut word)?;
        Ok(f32::from_le_bytes(word))
    }

    pub fn set(&mut self, param: Param, value: f32) -> Result<(), StoreError<S::Error>> {
        self.storage.write(param.address(), &value.to_le_bytes())?;
        Ok(())
    }

    /// Read every tunable.
    pub fn load(&mut self) -> Result<Params, StoreError<S::Error>> {
        Ok(Params {
            zero_angle: self.get(Param::ZeroAngle)?,
            balance: Gains::new(
                self.get(Param::BalanceKp)?,
                self.get(Param::BalanceKi)?,
                self.get(Param::BalanceKd)?,
            ),
            velocity: Gains::new(
                self.get(Param::VelocityKp)?,
                self.get(Param::VelocityKi)?,
                self.get(Param::VelocityKd)?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_follow_version_word() {
        assert_eq!(Param::ZeroAngle.address(), 4);
        assert_eq!(Param::VelocityKd.address(), 28);
        assert_eq!(STORE_SIZE, 32);
    }

    #[test]
    fn erased_storage_is_seeded_once() {
        let mut store = ParamStore::new(RamStorage::<STORE_SIZE>::new());
        assert_eq!(store.initialize(), Ok(true));
        assert_eq!(store.load(), Ok(Params::default()));

        assert_eq!(store.initialize(), Ok(false));
    }

    #[test]
    fn writes_survive_reinitialization() {
        let mut store = ParamStore::new(RamStorage::<STORE_SIZE>::new());
        store.initialize().unwrap();
        store.set(Param::BalanceKd, 12.5).unwrap();
        store.set(Param::ZeroAngle, 0.01).unwrap();

        let mut store = ParamStore::new(store.free());
        assert_eq!(store.initialize(), Ok(false));
        let params = store.load().unwrap();
        assert_eq!(params.balance.kd, 12.5);
        assert_eq!(params.zero_angle, 0.01);
        assert_eq!(params.balance.kp, config::BALANCE_PID_KP);
    }

    #[test]
    fn version_mismatch_reseeds() {
        let mut storage = RamStorage::<STORE_SIZE>::new();
        storage.write(0, &(STORE_VERSION - 1).to_le_bytes()).unwrap();
        storage.write(Param::BalanceKp.address(), &1.0f32.to_le_bytes()).unwrap();

        let mut store = ParamStore::new(storage);
        assert_eq!(store.initialize(), Ok(true));
        assert_eq!(store.get(Param::BalanceKp), Ok(config::BALANCE_PID_KP));
    }

    #[test]
    fn short_storage_reports_error() {
        let mut store = ParamStore::new(RamStorage::<8>::new());
        assert_eq!(store.initialize(), Err(StoreError(OutOfBounds)));
    }
}
