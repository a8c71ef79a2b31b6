// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Parameter storage in the 4 KiB backup SRAM.
//!
//! The backup SRAM keeps its contents across resets, and across power loss when VBAT is supplied
//! and the backup regulator is on.

use core::ptr;

use stm32f7xx_hal::pac;

use crate::store::{OutOfBounds, Storage};

const BKPSRAM_BASE: usize = 0x4002_4000;
const BKPSRAM_SIZE: usize = 4 * 1024;

pub struct BackupSram {
    _pwr: pac::PWR,
}

impl BackupSram {
    /// Power the backup domain and enable write access to the backup SRAM.
    pub fn new(pwr: pac::PWR) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb1enr.modify(|_, w| w.pwren().set_bit());

        // Unlock the backup domain
        pwr.cr1.modify(|_, w| w.dbp().set_bit());

        rcc.ahb1enr.modify(|_, w| w.bkpsramen().set_bit());

        // Keep contents on VBAT
        pwr.csr1.modify(|_, w| w.bre().set_bit());
        while pwr.csr1.read().brr().bit_is_clear() {}

        Self { _pwr: pwr }
    }

    fn check(address: usize, len: usize) -> Result<(), OutOfBounds> {
        match address.checked_add(len) {
            Some(end) if end <= BKPSRAM_SIZE => Ok(()),
            _ => Err(OutOfBounds),
        }
    }
}

impl Storage for BackupSram {
    type Error = OutOfBounds;

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), OutOfBounds> {
        Self::check(address, buf.len())?;
        for (i, b) in buf.iter_mut().enumerate() {
            *b = unsafe { ptr::read_volatile((BKPSRAM_BASE + address + i) as *const u8) };
        }
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), OutOfBounds> {
        Self::check(address, data.len())?;
        for (i, &b) in data.iter().enumerate() {
            unsafe { ptr::write_volatile((BKPSRAM_BASE + address + i) as *mut u8, b) };
        }
        Ok(())
    }
}
