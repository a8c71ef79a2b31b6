// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! InvenSense MPU6050 accelerometer used as an inclinometer.
//!
//! Only the accelerometer is read: the pitch is taken from the direction of gravity in the sensor
//! frame. The sensor is mounted with X pointing forward and Z pointing up, so leaning forward
//! gives a positive angle.
//!
//! The bus is owned by the driver. Any `embedded-hal` blocking I2C implementation works.

use embedded_hal::blocking::i2c::{Write, WriteRead};
use micromath::F32Ext;

use crate::sensors::Inclinometer;

// Register addresses
pub mod reg {
    pub const XA_OFFS_H: u8 = 0x06;
    pub const XG_OFFS_USRH: u8 = 0x13;
    pub const ACCEL_CONFIG: u8 = 0x1C;
    pub const ACCEL_XOUT_H: u8 = 0x3B;
    pub const PWR_MGMT_1: u8 = 0x6B;
    pub const WHO_AM_I: u8 = 0x75;
}

/// Expected `WHO_AM_I` contents.
pub const DEVICE_ID: u8 = 0x68;

/// PWR_MGMT_1: wake up, clock from the X gyro PLL.
const PWR_MGMT_1_WAKE_PLL_X: u8 = 0x01;

/// ACCEL_CONFIG: ±2 g full scale.
const ACCEL_FS_2G: u8 = 0x00;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// I2C transaction failed.
    Bus(E),
    /// Something answered, but it is not an MPU6050.
    NotFound(u8),
}

/// Factory-trim corrections written to the offset registers on [`Inclinometer::begin`].
///
/// Axis order is X, Y, Z. Units are those of the offset registers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Offsets {
    pub accel: [i16; 3],
    pub gyro: [i16; 3],
}

/// Raw accelerometer sample.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Accel {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Accel {
    fn from_be_bytes(buf: &[u8; 6]) -> Self {
        Self {
            x: i16::from_be_bytes([buf[0], buf[1]]),
            y: i16::from_be_bytes([buf[2], buf[3]]),
            z: i16::from_be_bytes([buf[4], buf[5]]),
        }
    }

    /// [rad] Pitch of the gravity vector.
    pub fn pitch(&self) -> f32 {
        let x = self.x as f32;
        let y = self.y as f32;
        let z = self.z as f32;
        x.atan2((y * y + z * z).sqrt())
    }
}

/// MPU6050 on an I2C bus.
pub struct Mpu6050<I2C> {
    i2c: I2C,
    address: u8,
    offsets: Option<Offsets>,
    accel: Accel,
}

impl<I2C, E> Mpu6050<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            offsets: None,
            accel: Accel::default(),
        }
    }

    /// Calibrate with `offsets` on begin. Without this the chip keeps its power-on trim.
    pub fn with_offsets(mut self, offsets: Offsets) -> Self {
        self.offsets = Some(offsets);
        self
    }

    /// Release the bus.
    pub fn free(self) -> I2C {
        self.i2c
    }

    pub fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Error<E>> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(Error::Bus)
    }

    /// Write big-endian 16-bit registers starting at `reg`.
    pub fn write_words(&mut self, reg: u8, words: &[i16; 3]) -> Result<(), Error<E>> {
        for (i, word) in words.iter().enumerate() {
            let [hi, lo] = word.to_be_bytes();
            self.i2c
                .write(self.address, &[reg + 2 * i as u8, hi, lo])
                .map_err(Error::Bus)?;
        }
        Ok(())
    }

    pub fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), Error<E>> {
        self.i2c
            .write_read(self.address, &[reg], buf)
            .map_err(Error::Bus)
    }

    /// Last raw accelerometer sample.
    #[inline]
    pub fn accel(&self) -> Accel {
        self.accel
    }
}

impl<I2C, E> Inclinometer for Mpu6050<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    type Error = Error<E>;

    fn begin(&mut self) -> Result<(), Error<E>> {
        let mut id = [0u8; 1];
        self.read_regs(reg::WHO_AM_I, &mut id)?;
        if id[0] != DEVICE_ID {
            return Err(Error::NotFound(id[0]));
        }

        self.write_reg(reg::PWR_MGMT_1, PWR_MGMT_1_WAKE_PLL_X)?;
        self.write_reg(reg::ACCEL_CONFIG, ACCEL_FS_2G)?;
        if let Some(offsets) = self.offsets {
            self.write_words(reg::XA_OFFS_H, &offsets.accel)?;
            self.write_words(reg::XG_OFFS_USRH, &offsets.gyro)?;
        }
        self.poll()
    }

    fn poll(&mut self) -> Result<(), Error<E>> {
        let mut buf = [0u8; 6];
        self.read_regs(reg::ACCEL_XOUT_H, &mut buf)?;
        self.accel = Accel::from_be_bytes(&buf);
        Ok(())
    }

    fn inclination(&self) -> f32 {
        self.accel.pitch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_4;

    /// Register file behind a fake bus.
    struct FakeBus {
        regs: [u8; 0x80],
        fail: bool,
    }

    impl FakeBus {
        fn new(who_am_i: u8) -> Self {
            let mut regs = [0u8; 0x80];
            regs[reg::WHO_AM_I as usize] = who_am_i;
            Self { regs, fail: false }
        }

        fn set_accel(&mut self, x: i16, y: i16, z: i16) {
            let base = reg::ACCEL_XOUT_H as usize;
            for (i, v) in [x, y, z].iter().enumerate() {
                let [hi, lo] = v.to_be_bytes();
                self.regs[base + 2 * i] = hi;
                self.regs[base + 2 * i + 1] = lo;
            }
        }
    }

    impl Write for FakeBus {
        type Error = ();

        fn write(&mut self, _addr: u8, bytes: &[u8]) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            let start = bytes[0] as usize;
            self.regs[start..start + bytes.len() - 1].copy_from_slice(&bytes[1..]);
            Ok(())
        }
    }

    impl WriteRead for FakeBus {
        type Error = ();

        fn write_read(&mut self, _addr: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            let start = bytes[0] as usize;
            buffer.copy_from_slice(&self.regs[start..start + buffer.len()]);
            Ok(())
        }
    }

    #[test]
    fn begin_wakes_device() {
        let mut imu = Mpu6050::new(FakeBus::new(DEVICE_ID), 0x68);
        imu.begin().unwrap();
        let bus = imu.free();
        assert_eq!(bus.regs[reg::PWR_MGMT_1 as usize], PWR_MGMT_1_WAKE_PLL_X);
    }

    #[test]
    fn begin_writes_calibration_offsets() {
        let offsets = Offsets {
            accel: [-1255, -1113, 1708],
            gyro: [-17, 65, 6],
        };
        let mut imu = Mpu6050::new(FakeBus::new(DEVICE_ID), 0x68).with_offsets(offsets);
        imu.begin().unwrap();
        let bus = imu.free();

        let word = |reg: u8| i16::from_be_bytes([bus.regs[reg as usize], bus.regs[reg as usize + 1]]);
        assert_eq!(word(reg::XA_OFFS_H), -1255);
        assert_eq!(word(reg::XA_OFFS_H + 4), 1708);
        assert_eq!(word(reg::XG_OFFS_USRH + 2), 65);
        assert_eq!(word(reg::XG_OFFS_USRH + 4), 6);
    }

    #[test]
    fn begin_without_offsets_keeps_trim() {
        let mut imu = Mpu6050::new(FakeBus::new(DEVICE_ID), 0x68);
        imu.begin().unwrap();
        let bus = imu.free();
        assert!(bus.regs[reg::XA_OFFS_H as usize..reg::XG_OFFS_USRH as usize + 6]
            .iter()
            .all(|&b| b == 0));
    }

    #[test]
    fn begin_rejects_wrong_device() {
        let mut imu = Mpu6050::new(FakeBus::new(0x70), 0x68);
        assert_eq!(imu.begin(), Err(Error::NotFound(0x70)));
    }

    #[test]
    fn bus_failure_is_reported() {
        let mut bus = FakeBus::new(DEVICE_ID);
        bus.fail = true;
        let mut imu = Mpu6050::new(bus, 0x68);
        assert_eq!(imu.begin(), Err(Error::Bus(())));
    }

    #[test]
    fn pitch_from_gravity() {
        let mut bus = FakeBus::new(DEVICE_ID);
        bus.set_accel(0, 0, 16_384);
        let mut imu = Mpu6050::new(bus, 0x68);
        imu.begin().unwrap();
        assert!(imu.inclination().abs() < 1e-3);

        let mut bus = imu.free();
        bus.set_accel(11_585, 0, 11_585);
        let mut imu = Mpu6050::new(bus, 0x68);
        imu.poll().unwrap();
        assert!((imu.inclination() - FRAC_PI_4).abs() < 1e-2);
        assert_eq!(imu.accel().x, 11_585);
    }
}
