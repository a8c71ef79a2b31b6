// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Rising-edge interrupts on GPIOA lines for the encoder phase A inputs.
//!
//! Port A is the reset selection of every EXTI line, so only the trigger and mask registers are
//! touched.

use stm32f7xx_hal::pac;

/// Enable rising-edge interrupts on the given GPIOA lines (bit `n` = line `n`).
pub fn listen_rising(lines: u32) {
    let rcc = unsafe { &*pac::RCC::ptr() };
    rcc.apb2enr.modify(|_, w| w.syscfgen().set_bit());

    let exti = unsafe { &*pac::EXTI::ptr() };
    exti.rtsr.modify(|r, w| unsafe { w.bits(r.bits() | lines) });
    exti.ftsr.modify(|r, w| unsafe { w.bits(r.bits() & !lines) });
    exti.pr.write(|w| unsafe { w.bits(lines) });
    exti.imr.modify(|r, w| unsafe { w.bits(r.bits() | lines) });
}

/// Whether `line` has a pending edge.
#[inline]
pub fn is_pending(line: u8) -> bool {
    let exti = unsafe { &*pac::EXTI::ptr() };
    exti.pr.read().bits() & (1 << line) != 0
}

/// Acknowledge a pending edge on `line`.
#[inline]
pub fn clear_pending(line: u8) {
    let exti = unsafe { &*pac::EXTI::ptr() };
    // Write-one-to-clear
    exti.pr.write(|w| unsafe { w.bits(1 << line) });
}

/// Input level of GPIOA pin `pin`.
#[inline]
pub fn porta_level(pin: u8) -> bool {
    let gpioa = unsafe { &*pac::GPIOA::ptr() };
    gpioa.idr.read().bits() & (1 << pin) != 0
}
