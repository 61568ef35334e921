//! Timer interface trait
//!
//! This module defines the monotonic timer and blocking delay interface that
//! platform implementations must provide.

use crate::platform::Result;

/// Timer interface trait
///
/// Provides a free-running monotonic microsecond clock plus a short blocking
/// delay. `delay_us` must be callable from interrupt context; drivers rely on
/// it for their fixed glitch-rejection window and never ask for more than a
/// few hundred microseconds there.
pub trait TimerInterface {
    /// Blocking delay in microseconds
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer(TimerError::InvalidDuration)` if the
    /// duration cannot be represented by the underlying timer.
    fn delay_us(&mut self, us: u32) -> Result<()>;

    /// Blocking delay in milliseconds
    ///
    /// # Errors
    ///
    /// Propagates errors from [`TimerInterface::delay_us`].
    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        self.delay_us(ms.saturating_mul(1000))
    }

    /// Microseconds since an arbitrary monotonic start
    fn now_us(&self) -> u64;

    /// Milliseconds since an arbitrary monotonic start
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }
}
