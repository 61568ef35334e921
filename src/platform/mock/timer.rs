//! Mock timer implementation for testing

use crate::platform::{Result, traits::TimerInterface};

/// Mock timer implementation
///
/// Uses simulated time: delays advance the clock instead of sleeping, and
/// tests move time forward explicitly with [`MockTimer::advance`].
#[derive(Debug, Default)]
pub struct MockTimer {
    now_us: u64,
}

impl MockTimer {
    /// Create a new mock timer at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the simulated clock
    pub fn advance(&mut self, us: u64) {
        self.now_us = self.now_us.wrapping_add(us);
    }
}

impl TimerInterface for MockTimer {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        // Simulated delay; just move the clock
        self.now_us = self.now_us.wrapping_add(us as u64);
        Ok(())
    }

    fn now_us(&self) -> u64 {
        self.now_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_timer_delay_us() {
        let mut timer = MockTimer::new();
        assert_eq!(timer.now_us(), 0);

        timer.delay_us(1000).unwrap();
        assert_eq!(timer.now_us(), 1000);

        timer.delay_us(500).unwrap();
        assert_eq!(timer.now_us(), 1500);
    }

    #[test]
    fn test_mock_timer_delay_ms() {
        let mut timer = MockTimer::new();
        timer.delay_ms(5).unwrap();
        assert_eq!(timer.now_us(), 5000);
    }

    #[test]
    fn test_mock_timer_advance() {
        let mut timer = MockTimer::new();
        timer.advance(3500);
        assert_eq!(timer.now_us(), 3500);
        assert_eq!(timer.now_ms(), 3);
    }
}
