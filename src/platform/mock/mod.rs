//! Mock platform implementation for testing
//!
//! This module provides mock implementations of platform traits that can be
//! used for unit testing without requiring actual hardware.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled
//!
//! # Example
//!
//! ```
//! use relay_feedback::platform::mock::MockTimer;
//! use relay_feedback::platform::traits::TimerInterface;
//!
//! let mut timer = MockTimer::new();
//! timer.advance(1_000);
//! assert_eq!(timer.now_us(), 1_000);
//! ```

#![cfg(any(test, feature = "mock"))]

mod exti;
mod timer;

pub use exti::MockExti;
pub use timer::MockTimer;
