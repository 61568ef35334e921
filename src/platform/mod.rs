//! Platform abstraction layer
//!
//! This module provides hardware abstraction for the feedback capture driver.
//! All platform-specific code must stay behind the traits defined here.

pub mod error;
pub mod traits;

// Mock implementations (test builds or the `mock` feature)
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{EdgeTrigger, ExtiInterface, PinPull, TimerInterface};
