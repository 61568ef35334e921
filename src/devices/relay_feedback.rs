//! Relay commutation feedback driver
//!
//! Measures how far a relay's real ON/OFF transitions land from the commanded
//! half-cycle boundary, using a digital feedback line that pulses while the
//! contacts move:
//!
//! ```text
//!                ON                        OFF
//! ----------------      ----      ----      -----------------------
//!                 |    |    |    |    |    |
//!                  ----      ----      ----
//!                   t_on                t_off
//! ```
//!
//! Each pulse is timed by a pair of edge interrupts: the edge that leaves the
//! released level restarts the microsecond clock (start edge), the opposite
//! edge reads it back as one sample (capture edge). Samples cycle through
//! three roles: the first after `start()` is the ON time, the second seeds the
//! half-cycle accumulator, and every later sample folds the *previous* sample
//! into the running half-cycle average while itself becoming the OFF time.
//! A fixed 500 us busy wait after every edge rejects contact bounce; it is the
//! only blocking the interrupt path is allowed.
//!
//! # Calibration bands
//!
//! [`RelayFeedback::result`] compares the ON/OFF times against the half-cycle
//! estimate `t_sc` with a tolerance `delta`: a commutation is clean when it
//! falls in `[t_sc - delta, t_sc)`. At or past `t_sc` it is an overshoot
//! (switching after the zero crossing); below the band it fires too early.
//! The caller nudges its commutation schedule and re-queries after the next
//! cycle; no retry logic lives here.
//!
//! # Concurrency
//!
//! All edge processing runs in interrupt context and is serialized by the
//! hardware (one feedback line cannot fire two edges at once). The result
//! triple, lifecycle flags, and diagnostic buffer are shared with non-ISR
//! callers, so they live behind a critical-section mutex; `result()` and the
//! lifecycle/diagnostic calls always observe a consistent snapshot. The
//! capture counters are exclusive to the interrupt path and stay plain
//! fields. Reconfiguring the diagnostic buffer while capture is armed is a
//! producer/consumer hazard left to the caller: pause or stop first.

use alloc::vec::Vec;
use core::cell::RefCell;

use bitflags::bitflags;
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use crate::log_debug;
use crate::log_info;
use crate::platform::{
    Result,
    traits::{EdgeTrigger, ExtiInterface, PinPull, TimerInterface},
};

/// Tolerance applied by [`RelayFeedback::result`] when the caller passes a
/// zero delta: percentage of the current half-cycle estimate
pub const DEFAULT_DELTA_PERCENT: u32 = 5;

/// Lead time in milliseconds for arming the capture before commanding the
/// relay, so the first feedback edge is never missed
pub const DEFAULT_PREVIOUS_CAPTURE_TIME_MS: u32 = 100;

/// Anti-glitch dead time after each feedback edge, in microseconds
const DEFAULT_GLITCH_TIMEOUT_US: u32 = 500;

/// Idle logic level of the feedback line
///
/// Determines which physical edge starts a measurement and which one captures
/// it: the edge leaving the released level is the start edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogicLevel {
    /// Feedback line reads low while the relay is released
    ReleasedIsLowLevel,
    /// Feedback line reads high while the relay is released
    ReleasedIsHighLevel,
}

bitflags! {
    /// Calibration-quality flags reported by [`RelayFeedback::result`]
    ///
    /// These are advisory, not faults: the caller recovers by adjusting its
    /// commutation schedule and querying again after the next cycle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Status: u8 {
        /// ON time at or past the half-cycle: energize overshoot
        const ERROR_TIME_ON_HIGH = 1 << 0;
        /// ON time below the tolerance band: energize fires too early
        const ERROR_TIME_ON_LOW = 1 << 1;
        /// OFF time at or past the half-cycle: release overshoot
        const ERROR_TIME_OFF_HIGH = 1 << 2;
        /// OFF time below the tolerance band: release fires too early
        const ERROR_TIME_OFF_LOW = 1 << 3;
    }
}

bitflags! {
    /// Lifecycle flags governing the capture state machine
    ///
    /// Bit positions are part of the diagnostic log format and must not move.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Flags: u8 {
        /// Capture paused; edges detach lazily at the next capture sample
        const PAUSED = 1 << 1;
        /// Capture resumed; the next sample is discarded
        const RESUMED = 1 << 3;
        /// Capture stopped; terminal until the next `start()`
        const STOPPED = 1 << 4;
    }
}

/// Edge class reported to an attached feedback probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ProbeEdge {
    /// A start edge fired (measurement begins)
    Start = 0,
    /// A capture edge fired (sample taken)
    Capture = 1,
}

/// Observer invoked on every feedback edge, for external test instrumentation
pub type FeedbackProbe = fn(ProbeEdge);

/// Point-in-time calibration report
///
/// Timing fields are valid regardless of `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackResult {
    /// Elapsed time from the commanded energize edge to the first feedback
    /// edge, in microseconds
    pub t_on_us: u32,
    /// Elapsed time from the commanded release edge to the first feedback
    /// edge, in microseconds
    pub t_off_us: u32,
    /// Running average of the AC half-cycle duration, in microseconds
    pub t_sc_us: u32,
    /// Calibration-quality flags, recomputed fresh on every query
    pub status: Status,
}

/// Timing triple updated by the capture path
#[derive(Debug, Clone, Copy, Default)]
struct Timing {
    t_sc_us: u32,
    t_on_us: u32,
    t_off_us: u32,
}

/// Fixed-capacity raw sample log, append-only until full
#[derive(Debug)]
struct DebugBuffer {
    samples: Vec<u32>,
    capacity: usize,
}

impl DebugBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, sample: u32) {
        if self.samples.len() < self.capacity {
            self.samples.push(sample);
        }
    }

    /// Reset the fill count, keeping the allocation
    fn clear(&mut self) {
        self.samples.clear();
    }
}

/// State shared between the interrupt path and non-ISR callers
struct Shared {
    timing: Timing,
    flags: Flags,
    debug: Option<DebugBuffer>,
}

/// Relay feedback capture driver
///
/// Generic over the platform's edge-interrupt pin and microsecond timer, so
/// the same state machine runs on hardware and against the mock platform.
///
/// The platform's EXTI handler must route the feedback pin's edges to
/// [`RelayFeedback::on_rising_edge`] / [`RelayFeedback::on_falling_edge`]
/// while the pin's trigger is armed, and stop as soon as the driver masks the
/// line. The pin is owned exclusively: `start()` and `resume()` overwrite the
/// armed trigger unconditionally.
pub struct RelayFeedback<P: ExtiInterface, T: TimerInterface> {
    pin: P,
    timer: T,
    level: LogicLevel,
    debug_trace: bool,
    probe: Option<FeedbackProbe>,
    shared: Mutex<CriticalSectionRawMutex, RefCell<Shared>>,
    // Capture state below is touched only from the interrupt path
    count: u8,
    t_sc_acc: u32,
    count_sc: u32,
    last_sample: u32,
    t0_us: u64,
}

impl<P: ExtiInterface, T: TimerInterface> RelayFeedback<P, T> {
    /// Create a new driver with the interrupt line masked
    ///
    /// Capture does not begin until [`RelayFeedback::start`].
    ///
    /// # Arguments
    ///
    /// * `pin` - Feedback edge-interrupt pin
    /// * `timer` - Monotonic microsecond timer, also used for the glitch wait
    /// * `level` - Idle logic level of the feedback line
    /// * `debug_trace` - Enable diagnostic log traces (never behavior-affecting)
    ///
    /// # Errors
    ///
    /// Propagates the platform error if the interrupt line cannot be masked.
    pub fn new(mut pin: P, timer: T, level: LogicLevel, debug_trace: bool) -> Result<Self> {
        pin.set_trigger(EdgeTrigger::None)?;
        if debug_trace {
            log_info!("relay feedback capture created");
        }
        Ok(Self {
            pin,
            timer,
            level,
            debug_trace,
            probe: None,
            shared: Mutex::new(RefCell::new(Shared {
                timing: Timing::default(),
                flags: Flags::empty(),
                debug: None,
            })),
            count: 0,
            t_sc_acc: 0,
            count_sc: 0,
            last_sample: 0,
            t0_us: 0,
        })
    }

    /// Create a new driver, configuring the pin's pull resistor first
    ///
    /// # Errors
    ///
    /// Propagates the platform error if the pull mode is unsupported or the
    /// interrupt line cannot be masked.
    pub fn with_pull(
        mut pin: P,
        timer: T,
        level: LogicLevel,
        pull: PinPull,
        debug_trace: bool,
    ) -> Result<Self> {
        pin.set_pull(pull)?;
        Self::new(pin, timer, level, debug_trace)
    }

    /// Start capturing from a clean state
    ///
    /// Resets the timing result, all counters, and the lifecycle flags, then
    /// arms both feedback edges. The diagnostic buffer's fill count is reset
    /// but its allocation is kept.
    ///
    /// # Errors
    ///
    /// Propagates the platform error if the edges cannot be armed.
    pub fn start(&mut self) -> Result<()> {
        self.count = 0;
        self.t_sc_acc = 0;
        self.count_sc = 0;
        self.last_sample = 0;
        self.t0_us = 0;
        self.shared.lock(|shared| {
            let mut shared = shared.borrow_mut();
            shared.timing = Timing::default();
            shared.flags = Flags::empty();
            if let Some(debug) = shared.debug.as_mut() {
                debug.clear();
            }
        });
        self.pin.set_trigger(EdgeTrigger::Both)
    }

    /// Pause capturing
    ///
    /// Takes effect lazily: edges stay armed until the next capture sample
    /// observes the flag and masks the interrupt line. Idempotent, and safe
    /// to call from non-interrupt context while a handler is in flight.
    pub fn pause(&self) {
        self.shared.lock(|shared| {
            shared.borrow_mut().flags.insert(Flags::PAUSED);
        });
    }

    /// Resume capturing after a pause
    ///
    /// Re-arms both feedback edges without resetting the result or counters.
    /// The first sample captured after resume is discarded, so a stale or
    /// partial half-cycle measured across the pause gap never contaminates
    /// the running average.
    ///
    /// # Errors
    ///
    /// Propagates the platform error if the edges cannot be armed.
    pub fn resume(&mut self) -> Result<()> {
        self.shared.lock(|shared| {
            let mut shared = shared.borrow_mut();
            shared.flags.insert(Flags::RESUMED);
            shared.flags.remove(Flags::PAUSED);
        });
        self.pin.set_trigger(EdgeTrigger::Both)
    }

    /// Stop capturing
    ///
    /// Like [`RelayFeedback::pause`], the interrupt line is masked lazily at
    /// the next capture sample, never synchronously: callers must not assume
    /// edges are disabled the moment this returns. Terminal until the next
    /// [`RelayFeedback::start`].
    pub fn stop(&self) {
        self.shared.lock(|shared| {
            shared.borrow_mut().flags.insert(Flags::STOPPED);
        });
    }

    /// Query the current calibration state
    ///
    /// `delta_us` is the tolerance below the half-cycle estimate; zero selects
    /// the default of [`DEFAULT_DELTA_PERCENT`] percent of the current
    /// half-cycle. Status flags are computed fresh from the snapshot on every
    /// call; the timing fields are returned regardless of status.
    pub fn result(&self, delta_us: u32) -> FeedbackResult {
        let timing = self.shared.lock(|shared| shared.borrow().timing);

        let delta_us = if delta_us == 0 {
            (DEFAULT_DELTA_PERCENT as u64 * timing.t_sc_us as u64 / 100) as u32
        } else {
            delta_us
        };
        let low_band = timing.t_sc_us.saturating_sub(delta_us);

        let mut status = Status::empty();
        if timing.t_on_us >= timing.t_sc_us {
            status |= Status::ERROR_TIME_ON_HIGH;
        }
        if timing.t_on_us < low_band {
            status |= Status::ERROR_TIME_ON_LOW;
        }
        if timing.t_off_us >= timing.t_sc_us {
            status |= Status::ERROR_TIME_OFF_HIGH;
        }
        if timing.t_off_us < low_band {
            status |= Status::ERROR_TIME_OFF_LOW;
        }

        FeedbackResult {
            t_on_us: timing.t_on_us,
            t_off_us: timing.t_off_us,
            t_sc_us: timing.t_sc_us,
            status,
        }
    }

    /// Allocate (or replace) the diagnostic sample buffer
    ///
    /// The buffer holds `size` raw samples, append-only until full, and its
    /// fill count starts at zero. Enabling it while capture is armed races
    /// the interrupt path appending into the buffer being replaced: pause or
    /// stop the capture first.
    pub fn enable_debug_buffer(&self, size: usize) {
        self.shared.lock(|shared| {
            shared.borrow_mut().debug = Some(DebugBuffer::new(size));
        });
        if self.debug_trace {
            log_debug!("debug buffer enabled with {} slots", size);
        }
    }

    /// Emit all logged samples in capture order, then reset the fill count
    ///
    /// The allocation is kept, so logging restarts from slot zero.
    ///
    /// # Panics
    ///
    /// Panics if [`RelayFeedback::enable_debug_buffer`] was never called.
    pub fn print_debug_buffer(&self) {
        self.shared.lock(|shared| {
            let mut shared = shared.borrow_mut();
            let Some(debug) = shared.debug.as_mut() else {
                panic!("print_debug_buffer called without an enabled buffer");
            };
            log_info!("dumping {} feedback samples:", debug.samples.len());
            for (i, sample) in debug.samples.iter().enumerate() {
                log_debug!("[{}] = {}", i, sample);
            }
            debug.clear();
        });
    }

    /// Attach an observer fired on every feedback edge
    ///
    /// The probe is called with [`ProbeEdge::Start`] on every start edge and
    /// [`ProbeEdge::Capture`] on every capture edge, purely for external test
    /// instrumentation.
    pub fn attach_feedback_tester(&mut self, probe: FeedbackProbe) {
        self.probe = Some(probe);
    }

    /// Rising-edge interrupt entry point
    ///
    /// Call from the platform's EXTI handler while the rising trigger is
    /// armed. Blocks for the fixed glitch window.
    pub fn on_rising_edge(&mut self) {
        match self.level {
            LogicLevel::ReleasedIsLowLevel => self.start_edge(),
            LogicLevel::ReleasedIsHighLevel => self.capture_edge(),
        }
    }

    /// Falling-edge interrupt entry point
    ///
    /// Call from the platform's EXTI handler while the falling trigger is
    /// armed. Blocks for the fixed glitch window.
    pub fn on_falling_edge(&mut self) {
        match self.level {
            LogicLevel::ReleasedIsLowLevel => self.capture_edge(),
            LogicLevel::ReleasedIsHighLevel => self.start_edge(),
        }
    }

    /// Get a reference to the feedback pin
    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Get mutable access to the timer
    ///
    /// Used by test harnesses to drive the simulated clock.
    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Snapshot of the diagnostic buffer, for test instrumentation
    #[cfg(any(test, feature = "mock"))]
    pub fn debug_buffer_contents(&self) -> Option<Vec<u32>> {
        self.shared
            .lock(|shared| shared.borrow().debug.as_ref().map(|d| d.samples.clone()))
    }

    /// Start edge: restart the measurement clock
    fn start_edge(&mut self) {
        if let Some(probe) = self.probe {
            probe(ProbeEdge::Start);
        }
        self.t0_us = self.timer.now_us();
        let _ = self.timer.delay_us(DEFAULT_GLITCH_TIMEOUT_US);
    }

    /// Capture edge: read the elapsed time and process it as one sample
    fn capture_edge(&mut self) {
        if let Some(probe) = self.probe {
            probe(ProbeEdge::Capture);
        }
        let sample = self.timer.now_us().wrapping_sub(self.t0_us) as u32;
        let _ = self.timer.delay_us(DEFAULT_GLITCH_TIMEOUT_US);
        self.process_sample(sample);
    }

    /// Fold one captured sample into the running state
    ///
    /// Samples cycle through three roles: the first after `start()` is the ON
    /// time, the second seeds the half-cycle accumulator, and every later one
    /// folds the *previous* sample into the accumulator while itself becoming
    /// the OFF time. The one-step delay is intentional: the retained sample
    /// is the half-cycle interval, the current one times the release.
    fn process_sample(&mut self, sample: u32) {
        let Self {
            shared,
            pin,
            count,
            t_sc_acc,
            count_sc,
            last_sample,
            ..
        } = self;

        shared.lock(|shared| {
            let mut shared = shared.borrow_mut();

            // Lazy detach point for pause/stop
            if shared.flags.intersects(Flags::PAUSED | Flags::STOPPED) {
                let _ = pin.set_trigger(EdgeTrigger::None);
                return;
            }
            // One-sample skip after resume
            if shared.flags.contains(Flags::RESUMED) {
                shared.flags.remove(Flags::RESUMED);
                return;
            }

            if let Some(debug) = shared.debug.as_mut() {
                debug.push(sample);
            }

            match *count {
                0 => shared.timing.t_on_us = sample,
                1 => {
                    *t_sc_acc = sample;
                    *count_sc = 1;
                }
                _ => {
                    *count = 1;
                    *t_sc_acc = t_sc_acc.wrapping_add(*last_sample);
                    *count_sc += 1;
                    shared.timing.t_sc_us = *t_sc_acc / *count_sc;
                    shared.timing.t_off_us = sample;
                }
            }
            *last_sample = sample;
            *count += 1;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{MockExti, MockTimer};

    type Fixture = RelayFeedback<MockExti, MockTimer>;

    fn fixture(level: LogicLevel) -> Fixture {
        let mut fb = RelayFeedback::new(MockExti::new(), MockTimer::new(), level, false).unwrap();
        fb.start().unwrap();
        fb
    }

    /// Simulate one feedback pulse of the given width for
    /// `ReleasedIsLowLevel` polarity (rising = start, falling = capture)
    fn feed_sample(fb: &mut Fixture, width_us: u32) {
        assert!(width_us >= DEFAULT_GLITCH_TIMEOUT_US);
        fb.on_rising_edge();
        // The start edge's glitch wait already advanced the clock
        fb.timer_mut()
            .advance((width_us - DEFAULT_GLITCH_TIMEOUT_US) as u64);
        fb.on_falling_edge();
        // Idle gap before the next pulse
        fb.timer_mut().advance(1_000);
    }

    #[test]
    fn test_first_sample_sets_on_time() {
        let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
        feed_sample(&mut fb, 9_700);

        let res = fb.result(500);
        assert_eq!(res.t_on_us, 9_700);
        assert_eq!(res.t_off_us, 0);
        assert_eq!(res.t_sc_us, 0);
    }

    #[test]
    fn test_half_cycle_running_average() {
        let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
        feed_sample(&mut fb, 9_000); // ON time
        feed_sample(&mut fb, 10_000); // accumulator seed
        feed_sample(&mut fb, 10_200);
        // Third sample folds the seed a second time: (10000 + 10000) / 2
        assert_eq!(fb.result(500).t_sc_us, 10_000);

        feed_sample(&mut fb, 9_800);
        // (10000 + 10000 + 10200) / 3
        assert_eq!(fb.result(500).t_sc_us, 30_200 / 3);

        feed_sample(&mut fb, 10_400);
        // (10000 + 10000 + 10200 + 9800) / 4
        assert_eq!(fb.result(500).t_sc_us, 10_000);
        // Every averaging sample also refreshes the OFF time
        assert_eq!(fb.result(500).t_off_us, 10_400);
        assert_eq!(fb.result(500).t_on_us, 9_000);
    }

    #[test]
    fn test_start_resets_state() {
        let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
        feed_sample(&mut fb, 9_000);
        feed_sample(&mut fb, 10_000);
        feed_sample(&mut fb, 9_600);
        assert_ne!(fb.result(500).t_sc_us, 0);

        fb.start().unwrap();
        let res = fb.result(500);
        assert_eq!(res.t_on_us, 0);
        assert_eq!(res.t_off_us, 0);
        assert_eq!(res.t_sc_us, 0);
        assert_eq!(fb.pin().trigger(), EdgeTrigger::Both);

        // The counter restarted too: the next sample is an ON time again
        feed_sample(&mut fb, 8_800);
        assert_eq!(fb.result(500).t_on_us, 8_800);
    }

    #[test]
    fn test_pause_detaches_lazily() {
        let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
        feed_sample(&mut fb, 9_000);
        fb.pause();

        // Still armed until the next capture sample observes the flag
        assert_eq!(fb.pin().trigger(), EdgeTrigger::Both);

        feed_sample(&mut fb, 10_000);
        assert_eq!(fb.pin().trigger(), EdgeTrigger::None);
        // The observed sample was dropped, not accumulated
        assert_eq!(fb.result(500).t_sc_us, 0);
        assert_eq!(fb.result(500).t_on_us, 9_000);
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
        feed_sample(&mut fb, 9_000);
        fb.pause();
        fb.pause();

        feed_sample(&mut fb, 10_000);
        assert_eq!(fb.pin().trigger(), EdgeTrigger::None);
        assert_eq!(fb.result(500).t_on_us, 9_000);
    }

    #[test]
    fn test_resume_skips_exactly_one_sample() {
        let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
        feed_sample(&mut fb, 10_000);
        feed_sample(&mut fb, 10_000);
        feed_sample(&mut fb, 9_600);
        assert_eq!(fb.result(500).t_sc_us, 10_000);

        fb.pause();
        feed_sample(&mut fb, 12_345); // detaches
        assert_eq!(fb.pin().trigger(), EdgeTrigger::None);

        fb.resume().unwrap();
        assert_eq!(fb.pin().trigger(), EdgeTrigger::Both);

        // First sample after resume is discarded entirely
        feed_sample(&mut fb, 7_777);
        assert_eq!(fb.result(500).t_sc_us, 10_000);
        assert_eq!(fb.result(500).t_off_us, 9_600);

        // The next one is processed normally, folding the sample retained
        // from before the pause: (10000 + 10000 + 9600) / 3
        feed_sample(&mut fb, 9_900);
        let res = fb.result(500);
        assert_eq!(res.t_sc_us, 29_600 / 3);
        assert_eq!(res.t_off_us, 9_900);
    }

    #[test]
    fn test_stop_detaches_lazily_and_is_terminal() {
        let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
        feed_sample(&mut fb, 9_000);
        fb.stop();
        assert_eq!(fb.pin().trigger(), EdgeTrigger::Both);

        feed_sample(&mut fb, 10_000);
        assert_eq!(fb.pin().trigger(), EdgeTrigger::None);

        // resume() re-arms, but the stopped flag wins at the next sample
        fb.resume().unwrap();
        feed_sample(&mut fb, 10_000);
        assert_eq!(fb.pin().trigger(), EdgeTrigger::None);

        // Only start() leaves the stopped state
        fb.start().unwrap();
        feed_sample(&mut fb, 8_500);
        assert_eq!(fb.result(500).t_on_us, 8_500);
    }

    #[test]
    fn test_default_delta_is_five_percent() {
        let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
        feed_sample(&mut fb, 9_700);
        feed_sample(&mut fb, 10_000);
        feed_sample(&mut fb, 9_700);
        // t_sc = 10000; default delta = 500, band [9500, 10000)
        assert_eq!(fb.result(0).status, Status::empty());
        // A tighter explicit delta moves the band to [9800, 10000)
        assert_eq!(
            fb.result(200).status,
            Status::ERROR_TIME_ON_LOW | Status::ERROR_TIME_OFF_LOW
        );
    }

    #[test]
    fn test_status_energize_overshoot() {
        let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
        feed_sample(&mut fb, 10_000);
        feed_sample(&mut fb, 10_000);
        feed_sample(&mut fb, 9_600);

        let res = fb.result(500);
        assert_eq!(res.t_sc_us, 10_000);
        assert_eq!(res.t_on_us, 10_000);
        assert_eq!(res.t_off_us, 9_600);
        assert_eq!(res.status, Status::ERROR_TIME_ON_HIGH);
    }

    #[test]
    fn test_status_energize_too_early() {
        let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
        feed_sample(&mut fb, 9_400);
        feed_sample(&mut fb, 10_000);
        feed_sample(&mut fb, 9_950);

        let res = fb.result(500);
        assert_eq!(res.t_sc_us, 10_000);
        assert_eq!(res.status, Status::ERROR_TIME_ON_LOW);
    }

    #[test]
    fn test_uncalibrated_reads_as_overshoot() {
        let fb = fixture(LogicLevel::ReleasedIsLowLevel);
        // All-zero state: 0 >= 0 on both comparisons
        assert_eq!(
            fb.result(0).status,
            Status::ERROR_TIME_ON_HIGH | Status::ERROR_TIME_OFF_HIGH
        );
    }

    #[test]
    fn test_debug_buffer_capacity_and_drain() {
        let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
        fb.enable_debug_buffer(4);

        for width in [1_000u32, 2_000, 3_000, 4_000, 5_000, 6_000] {
            feed_sample(&mut fb, width);
        }
        // Only the first four samples fit, in arrival order
        assert_eq!(
            fb.debug_buffer_contents().unwrap(),
            &[1_000, 2_000, 3_000, 4_000]
        );

        fb.print_debug_buffer();
        assert_eq!(fb.debug_buffer_contents().unwrap(), &[] as &[u32]);

        // Logging restarts from slot zero after the drain
        feed_sample(&mut fb, 7_000);
        assert_eq!(fb.debug_buffer_contents().unwrap(), &[7_000]);
    }

    #[test]
    fn test_resume_skip_bypasses_debug_buffer() {
        let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
        fb.enable_debug_buffer(8);
        feed_sample(&mut fb, 1_000);
        fb.pause();
        feed_sample(&mut fb, 2_000); // dropped at the detach point
        fb.resume().unwrap();
        feed_sample(&mut fb, 3_000); // resume skip
        feed_sample(&mut fb, 4_000); // processed

        assert_eq!(fb.debug_buffer_contents().unwrap(), &[1_000, 4_000]);
    }

    #[test]
    #[should_panic(expected = "without an enabled buffer")]
    fn test_print_without_buffer_panics() {
        let fb = fixture(LogicLevel::ReleasedIsLowLevel);
        fb.print_debug_buffer();
    }

    #[test]
    fn test_start_resets_debug_fill_count() {
        let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
        fb.enable_debug_buffer(4);
        feed_sample(&mut fb, 1_000);
        feed_sample(&mut fb, 2_000);

        fb.start().unwrap();
        assert_eq!(fb.debug_buffer_contents().unwrap(), &[] as &[u32]);
    }

    #[test]
    fn test_constructor_masks_interrupt_line() {
        let fb =
            RelayFeedback::new(MockExti::new(), MockTimer::new(), LogicLevel::ReleasedIsLowLevel, false)
                .unwrap();
        assert_eq!(fb.pin().trigger(), EdgeTrigger::None);
        assert_eq!(fb.pin().trigger_history(), &[EdgeTrigger::None]);
    }

    #[test]
    fn test_with_pull_configures_pin() {
        let fb = RelayFeedback::with_pull(
            MockExti::new(),
            MockTimer::new(),
            LogicLevel::ReleasedIsLowLevel,
            PinPull::Up,
            false,
        )
        .unwrap();
        assert_eq!(fb.pin().pull(), Some(PinPull::Up));
    }

    mod probe_released_low {
        use super::*;
        use core::sync::atomic::{AtomicU32, Ordering};

        static STARTS: AtomicU32 = AtomicU32::new(0);
        static CAPTURES: AtomicU32 = AtomicU32::new(0);

        fn probe(edge: ProbeEdge) {
            match edge {
                ProbeEdge::Start => STARTS.fetch_add(1, Ordering::Relaxed),
                ProbeEdge::Capture => CAPTURES.fetch_add(1, Ordering::Relaxed),
            };
        }

        #[test]
        fn test_probe_sees_rising_as_start() {
            let mut fb = fixture(LogicLevel::ReleasedIsLowLevel);
            fb.attach_feedback_tester(probe);

            fb.on_rising_edge();
            assert_eq!(STARTS.load(Ordering::Relaxed), 1);
            assert_eq!(CAPTURES.load(Ordering::Relaxed), 0);

            fb.timer_mut().advance(9_500);
            fb.on_falling_edge();
            assert_eq!(CAPTURES.load(Ordering::Relaxed), 1);
        }
    }

    mod probe_released_high {
        use super::*;
        use core::sync::atomic::{AtomicU32, Ordering};

        static STARTS: AtomicU32 = AtomicU32::new(0);
        static CAPTURES: AtomicU32 = AtomicU32::new(0);

        fn probe(edge: ProbeEdge) {
            match edge {
                ProbeEdge::Start => STARTS.fetch_add(1, Ordering::Relaxed),
                ProbeEdge::Capture => CAPTURES.fetch_add(1, Ordering::Relaxed),
            };
        }

        #[test]
        fn test_probe_sees_falling_as_start() {
            let mut fb = fixture(LogicLevel::ReleasedIsHighLevel);
            fb.attach_feedback_tester(probe);

            fb.on_falling_edge();
            assert_eq!(STARTS.load(Ordering::Relaxed), 1);
            assert_eq!(CAPTURES.load(Ordering::Relaxed), 0);

            fb.timer_mut().advance(9_500);
            fb.on_rising_edge();
            assert_eq!(CAPTURES.load(Ordering::Relaxed), 1);
        }
    }

    #[test]
    fn test_inverted_polarity_measures_identically() {
        let mut fb = fixture(LogicLevel::ReleasedIsHighLevel);
        // Active pulses are low: falling starts, rising captures
        for width in [9_700u32, 10_000, 9_800] {
            fb.on_falling_edge();
            fb.timer_mut()
                .advance((width - DEFAULT_GLITCH_TIMEOUT_US) as u64);
            fb.on_rising_edge();
            fb.timer_mut().advance(1_000);
        }
        let res = fb.result(500);
        assert_eq!(res.t_on_us, 9_700);
        assert_eq!(res.t_sc_us, 10_000);
        assert_eq!(res.t_off_us, 9_800);
    }
}
