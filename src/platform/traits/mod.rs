//! Platform abstraction traits
//!
//! This module defines the traits that platform implementations must provide.

pub mod exti;
pub mod timer;

// Re-export trait interfaces
pub use exti::{EdgeTrigger, ExtiInterface, PinPull};
pub use timer::TimerInterface;
