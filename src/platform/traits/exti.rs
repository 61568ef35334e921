//! External-interrupt input pin trait
//!
//! This module defines the edge-interrupt interface that platform
//! implementations must provide for the feedback line.

use crate::platform::Result;

/// Edge trigger selection for an interrupt-capable input pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeTrigger {
    /// No edge armed; the interrupt line is masked
    None,
    /// Rising edges only
    Rising,
    /// Falling edges only
    Falling,
    /// Both edges
    Both,
}

/// Input pin pull configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinPull {
    /// Floating input
    None,
    /// Pull-up resistor enabled
    Up,
    /// Pull-down resistor enabled
    Down,
}

/// External-interrupt input pin interface
///
/// Platform implementations must provide this interface for interrupt-capable
/// input pins. The platform's EXTI handler is expected to dispatch rising and
/// falling edges to the driver that owns the pin, and to stop dispatching as
/// soon as the trigger is set to [`EdgeTrigger::None`].
///
/// # Safety Invariants
///
/// - Only one owner per interrupt line; arming a trigger replaces any
///   previous handler routing unconditionally
/// - Edges on a single line are delivered serially, never concurrently
pub trait ExtiInterface {
    /// Select which edges raise an interrupt
    ///
    /// [`EdgeTrigger::None`] masks the line entirely.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Exti(ExtiError::UnsupportedTrigger)` if the
    /// pin cannot generate the requested edge interrupts.
    fn set_trigger(&mut self, trigger: EdgeTrigger) -> Result<()>;

    /// Configure the pin's pull resistor
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Exti(ExtiError::UnsupportedPull)` if the pull
    /// mode is not available on this pin.
    fn set_pull(&mut self, pull: PinPull) -> Result<()>;

    /// Get the currently armed edge trigger
    fn trigger(&self) -> EdgeTrigger;
}
