// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Wheel velocity estimation from decoded encoder pulses.
//!
//! An estimator is ticked every main-loop cycle and only produces a new sample once its sample
//! period has elapsed. The frequency is in wheel revolutions per second, positive going forward.
//!
//! Two policies are available behind [`WheelEncoder`]:
//!
//! - [`TimingEstimator`] measures the time between pulses. It tolerates contact bounce and
//!   partial reversals and is what the firmware uses.
//! - [`CountingEstimator`] counts pulses over the whole window. It averages over the window at the
//!   cost of one sample period of latency.

use crate::drivers::quadrature::{Direction, EdgeQueue, Pulse, PulseCounter};
use crate::time::{elapsed, Duration, Instant};

/// Periodic wheel speed source.
pub trait WheelEncoder {
    /// Take a new sample if the sample period has elapsed.
    ///
    /// Returns `false` without touching the estimate when called too early.
    fn tick(&mut self, now: Instant) -> bool;

    /// Last estimated frequency in revolutions per second.
    fn frequency(&self) -> f32;
}

/// Shared sample-period gate.
#[derive(Copy, Clone, Debug)]
struct SampleGate {
    period: Duration,
    last_sample: Instant,
}

impl SampleGate {
    fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            last_sample: now,
        }
    }

    fn ready(&mut self, now: Instant) -> bool {
        if elapsed(self.last_sample, now) < self.period {
            return false;
        }
        self.last_sample = now;
        true
    }
}

/// Velocity from the number of pulses seen in each sample window.
pub struct CountingEstimator<'a> {
    counter: &'a PulseCounter,
    gate: SampleGate,
    pulses_per_rev: u32,
    frequency: f32,
}

impl<'a> CountingEstimator<'a> {
    /// The first window starts at `now`.
    pub fn new(
        counter: &'a PulseCounter,
        sample_period: Duration,
        pulses_per_rev: u32,
        now: Instant,
    ) -> Self {
        Self {
            counter,
            gate: SampleGate::new(sample_period, now),
            pulses_per_rev,
            frequency: 0.0,
        }
    }
}

impl WheelEncoder for CountingEstimator<'_> {
    fn tick(&mut self, now: Instant) -> bool {
        if !self.gate.ready(now) {
            return false;
        }

        let (pulses, direction) = self.counter.take();
        let period_ms = self.gate.period.ticks() as f32 / 1_000.0;

        self.frequency = (pulses as f32 * (1_000.0 / self.pulses_per_rev as f32)) / period_ms;
        if direction == Some(Direction::Reverse) {
            self.frequency = -self.frequency;
        }

        true
    }

    #[inline]
    fn frequency(&self) -> f32 {
        self.frequency
    }
}

/// Velocity from the interval between consecutive pulses.
pub struct TimingEstimator<'a> {
    queue: &'a EdgeQueue,
    gate: SampleGate,
    pulses_per_rev: u32,
    min_pulse: Duration,
    timeout: Duration,
    /// Reference pulse the next interval is measured from.
    last_pulse: Option<Pulse>,
    frequency: f32,
}

impl<'a> TimingEstimator<'a> {
    /// `min_pulse` rejects bounce, `timeout` is how long the wheel may go without a pulse before
    /// it reads as stopped.
    pub fn new(
        queue: &'a EdgeQueue,
        sample_period: Duration,
        pulses_per_rev: u32,
        min_pulse: Duration,
        timeout: Duration,
        now: Instant,
    ) -> Self {
        Self {
            queue,
            gate: SampleGate::new(sample_period, now),
            pulses_per_rev,
            min_pulse,
            timeout,
            last_pulse: None,
            frequency: 0.0,
        }
    }

    /// Fold one pulse into the reference, returning a valid interval if it produced one.
    fn accept(&mut self, pulse: Pulse) -> Option<(Duration, Direction)> {
        let Some(reference) = self.last_pulse else {
            self.last_pulse = Some(pulse);
            return None;
        };

        let interval = elapsed(reference.timestamp, pulse.timestamp);
        if interval < self.min_pulse {
            return None;
        }

        self.last_pulse = Some(pulse);
        if pulse.direction != reference.direction {
            return None;
        }

        Some((interval, pulse.direction))
    }
}

impl WheelEncoder for TimingEstimator<'_> {
    fn tick(&mut self, now: Instant) -> bool {
        if !self.gate.ready(now) {
            return false;
        }

        let mut pulses = self.queue.take();
        let mut longest: Option<(Duration, Direction)> = None;

        while let Some(pulse) = pulses.pop_front() {
            if let Some((interval, direction)) = self.accept(pulse) {
                let period = match longest {
                    Some((current, _)) if current > interval => current,
                    _ => interval,
                };
                longest = Some((period, direction));
            }
        }

        if let Some((period, direction)) = longest {
            let revs_per_tick = 1_000_000.0 / self.pulses_per_rev as f32;
            self.frequency = direction.sign() * revs_per_tick / period.ticks() as f32;
        } else {
            let stale = match self.last_pulse {
                Some(pulse) => elapsed(pulse.timestamp, now) > self.timeout,
                None => true,
            };
            if stale {
                self.frequency = 0.0;
            }
        }

        true
    }

    #[inline]
    fn frequency(&self) -> f32 {
        self.frequency
    }
}
