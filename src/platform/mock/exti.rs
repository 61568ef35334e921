//! Mock external-interrupt pin implementation for testing

use heapless::Vec;

use crate::platform::{
    Result,
    traits::{EdgeTrigger, ExtiInterface, PinPull},
};

/// Mock external-interrupt pin
///
/// Tracks the armed edge trigger and pull configuration, and records every
/// trigger transition so tests can verify when a driver armed or masked the
/// line. A test harness stands in for the hardware EXTI dispatcher: it must
/// consult [`ExtiInterface::trigger`] before delivering an edge, exactly as
/// masked interrupt lines stay silent on real hardware.
#[derive(Debug, Default)]
pub struct MockExti {
    trigger: Option<EdgeTrigger>,
    pull: Option<PinPull>,
    trigger_history: Vec<EdgeTrigger, 16>,
}

impl MockExti {
    /// Create a new mock pin with the line masked and no pull configured
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the configured pull mode, if any was ever set
    pub fn pull(&self) -> Option<PinPull> {
        self.pull
    }

    /// All trigger transitions in the order they were requested
    pub fn trigger_history(&self) -> &[EdgeTrigger] {
        &self.trigger_history
    }

    /// Whether the given edge currently raises an interrupt
    pub fn delivers(&self, rising: bool) -> bool {
        match self.trigger() {
            EdgeTrigger::None => false,
            EdgeTrigger::Rising => rising,
            EdgeTrigger::Falling => !rising,
            EdgeTrigger::Both => true,
        }
    }
}

impl ExtiInterface for MockExti {
    fn set_trigger(&mut self, trigger: EdgeTrigger) -> Result<()> {
        self.trigger = Some(trigger);
        // Oldest entries win if a test overflows the history
        let _ = self.trigger_history.push(trigger);
        Ok(())
    }

    fn set_pull(&mut self, pull: PinPull) -> Result<()> {
        self.pull = Some(pull);
        Ok(())
    }

    fn trigger(&self) -> EdgeTrigger {
        self.trigger.unwrap_or(EdgeTrigger::None)
    }
}
