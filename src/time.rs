// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Monotonic time types shared by the control core.
//!
//! All timestamps come from a free-running 32-bit microsecond counter, so they wrap roughly every
//! 71 minutes. `fugit` comparisons are wrap-aware as long as two instants are less than half the
//! counter range apart.

/// Timestamp of a 1 MHz free-running counter.
pub type Instant = fugit::TimerInstantU32<1_000_000>;

/// Microsecond duration.
pub type Duration = fugit::MicrosDurationU32;

/// Build a duration from milliseconds.
#[inline]
pub const fn millis(ms: u32) -> Duration {
    Duration::from_ticks(ms * 1_000)
}

/// Time elapsed from `since` to `now`, or zero if `now` is before `since`.
#[inline]
pub fn elapsed(since: Instant, now: Instant) -> Duration {
    now.checked_duration_since(since)
        .unwrap_or(Duration::from_ticks(0))
}

/// Duration in seconds as a float.
#[inline]
pub fn as_secs_f32(d: Duration) -> f32 {
    d.ticks() as f32 / 1_000_000.0
}
