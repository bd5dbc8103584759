//! Clock and Delay Abstractions
//!
//! Acquisition timestamps are the `x` values of the regression, so the
//! clock must be monotonic and microsecond-resolution. Delays are blocking
//! and only used between phases (discharge polling, settle, cool-down).
//!
//! ## Implementation Requirements
//!
//! - `now_micros()` never decreases; the acquirer reports
//!   [`MeterError::ClockWentBackwards`](crate::MeterError) otherwise
//! - the epoch is arbitrary (boot time is typical)
//! - `delay()` may overshoot but must not return early
//!
//! On an ESP32 this is `esp_timer_get_time()` plus the HAL delay; in tests
//! it is [`VirtualClock`](crate::sim::VirtualClock), which advances only
//! when told to.

use fugit::MillisDurationU32;

/// Monotonic microsecond clock
pub trait MonotonicClock {
    /// Current time in microseconds since an arbitrary epoch
    fn now_micros(&self) -> u64;
}

/// Blocking delay
pub trait Delay {
    /// Block for at least `duration`
    fn delay(&mut self, duration: MillisDurationU32);
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    fn now_micros(&self) -> u64 {
        (**self).now_micros()
    }
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &mut T {
    fn now_micros(&self) -> u64 {
        (**self).now_micros()
    }
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay(&mut self, duration: MillisDurationU32) {
        (**self).delay(duration)
    }
}
