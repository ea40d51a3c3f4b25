use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use crate::config::PlayConfig;

/// Shared state read by every lane worker during a run.
///
/// Handed to each worker at spawn time instead of living in process globals.
/// All fields are lock-free: the cancel flag is monotonic (false → true
/// only) and must be observed by every lane within one polling interval;
/// timing shift and jitter amplitude are single-writer-many-reader and only
/// need eventual visibility, taking effect on the next event a lane
/// schedules.
#[derive(Debug)]
pub struct RunContext {
    cancelled: AtomicBool,
    timing_shift_ms: AtomicI64,
    jitter_amplitude_ms: AtomicI64,
}

impl RunContext {
    pub fn new(config: &PlayConfig) -> Self {
        Self {
            cancelled: AtomicBool::new(false),
            timing_shift_ms: AtomicI64::new(config.timing_shift_ms),
            jitter_amplitude_ms: AtomicI64::new(config.jitter_amplitude_ms),
        }
    }

    /// Request that the current run stop. Idempotent; there is no way to
    /// un-cancel.
    pub fn request_cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Shift every subsequently scheduled deadline by this many
    /// milliseconds (positive = later).
    pub fn set_timing_shift_ms(&self, ms: i64) {
        self.timing_shift_ms.store(ms, Ordering::Relaxed);
    }

    pub fn timing_shift_ms(&self) -> i64 {
        self.timing_shift_ms.load(Ordering::Relaxed)
    }

    /// Set the jitter amplitude for subsequently scheduled events.
    pub fn set_jitter_amplitude_ms(&self, ms: i64) {
        self.jitter_amplitude_ms.store(ms.max(0), Ordering::Relaxed);
    }

    pub fn jitter_amplitude_ms(&self) -> i64 {
        self.jitter_amplitude_ms.load(Ordering::Relaxed)
    }
}

/// Per-lane key-down state.
///
/// While a run is in progress each lane's flag is written only by that
/// lane's worker; after the join the orchestrator reads it to force-release
/// anything still held. Out-of-range lanes read as unpressed.
#[derive(Debug)]
pub struct LaneStates {
    pressed: Vec<AtomicBool>,
}

impl LaneStates {
    pub fn new(lane_count: usize) -> Self {
        Self {
            pressed: (0..lane_count).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    pub fn set_pressed(&self, lane: usize, pressed: bool) {
        if let Some(flag) = self.pressed.get(lane) {
            flag.store(pressed, Ordering::Release);
        }
    }

    pub fn is_pressed(&self, lane: usize) -> bool {
        self.pressed
            .get(lane)
            .map(|flag| flag.load(Ordering::Acquire))
            .unwrap_or(false)
    }
}
