// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Interrupt-side quadrature edge decoding.
//!
//! The interrupt handler for a wheel's phase A rising edge reads the phase B level and hands it to
//! one of the decoders below. Direction is resolved by comparing that level with the level phase B
//! has while the wheel turns forward, which depends on how the encoder is wired.
//!
//! Both decoders keep their state in a [`critical_section::Mutex`], so they can live in a `static`
//! that both the interrupt handler and the main loop borrow. The main loop only holds the lock
//! long enough to copy the state out and reset it.
//!
//! - [`EdgeQueue`] timestamps each pulse for period-based velocity estimation.
//! - [`PulseCounter`] only counts consecutive pulses in the same direction.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

use crate::config::PULSE_BUFFER_LEN;
use crate::time::Instant;

/// Wheel rotation direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Resolve the direction from the phase B level seen on a phase A rising edge.
    #[inline]
    pub fn from_phase_b(phase_b_high: bool, forward_level: bool) -> Self {
        if phase_b_high == forward_level {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// `1.0` going forward, `-1.0` in reverse.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

/// A single encoder pulse.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pulse {
    pub direction: Direction,
    pub timestamp: Instant,
}

/// Pulses waiting for the sampling tick.
pub type PulseBuffer = Deque<Pulse, PULSE_BUFFER_LEN>;

/// Bounded buffer of timestamped pulses, filled from interrupt context.
pub struct EdgeQueue {
    forward_level: bool,
    pulses: Mutex<RefCell<PulseBuffer>>,
}

impl EdgeQueue {
    /// `forward_level` is the phase B level on a phase A rising edge while going forward.
    pub const fn new(forward_level: bool) -> Self {
        Self {
            forward_level,
            pulses: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Record a phase A rising edge. Call from the edge interrupt.
    ///
    /// When the buffer is full the oldest pulse is dropped.
    pub fn on_edge(&self, phase_b_high: bool, now: Instant) {
        let pulse = Pulse {
            direction: Direction::from_phase_b(phase_b_high, self.forward_level),
            timestamp: now,
        };

        critical_section::with(|cs| {
            let mut pulses = self.pulses.borrow_ref_mut(cs);
            if pulses.is_full() {
                pulses.pop_front();
            }
            let _ = pulses.push_back(pulse);
        });
    }

    /// Take every buffered pulse, oldest first, leaving the queue empty.
    pub fn take(&self) -> PulseBuffer {
        critical_section::with(|cs| {
            core::mem::replace(&mut *self.pulses.borrow_ref_mut(cs), Deque::new())
        })
    }

    /// Number of buffered pulses.
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.pulses.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Copy, Clone, Debug)]
struct Count {
    pulses: u32,
    direction: Option<Direction>,
}

/// Running count of consecutive same-direction pulses, filled from interrupt context.
///
/// A direction change restarts the count at 1, so a single spurious reversal discards the
/// window collected so far.
pub struct PulseCounter {
    forward_level: bool,
    count: Mutex<RefCell<Count>>,
}

impl PulseCounter {
    /// `forward_level` is the phase B level on a phase A rising edge while going forward.
    pub const fn new(forward_level: bool) -> Self {
        Self {
            forward_level,
            count: Mutex::new(RefCell::new(Count {
                pulses: 0,
                direction: None,
            })),
        }
    }

    /// Record a phase A rising edge. Call from the edge interrupt.
    pub fn on_edge(&self, phase_b_high: bool) {
        let direction = Direction::from_phase_b(phase_b_high, self.forward_level);

        critical_section::with(|cs| {
            let mut count = self.count.borrow_ref_mut(cs);
            if count.direction == Some(direction) {
                count.pulses = count.pulses.saturating_add(1);
            } else {
                count.pulses = 1;
            }
            count.direction = Some(direction);
        });
    }

    /// Read the pulse count and last direction, then zero the count.
    ///
    /// The direction is kept so the next window continues counting in it.
    pub fn take(&self) -> (u32, Option<Direction>) {
        critical_section::with(|cs| {
            let mut count = self.count.borrow_ref_mut(cs);
            let taken = (count.pulses, count.direction);
            count.pulses = 0;
            taken
        })
    }
}
