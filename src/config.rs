use serde::{Deserialize, Serialize};

use crate::traits::input::Key;

/// Configuration for one playback run.
///
/// `timing_shift_ms` and `jitter_amplitude_ms` seed the live-adjustable
/// values in [`crate::RunContext`]; everything else is fixed for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayConfig {
    /// Subtracted from every chart timestamp, aligning chart time with the
    /// run clock (e.g. when starting mid-song).
    pub start_time_adjustment_ms: i64,
    /// When false, deadlines are scheduled and waited on but no key events
    /// are injected (dry run).
    pub enable_clicking: bool,
    /// Initial bell-curve jitter amplitude; ~99.7% of offsets fall within
    /// this many milliseconds of zero. Live-adjustable during the run.
    pub jitter_amplitude_ms: i64,
    /// Initial global timing shift applied to every deadline.
    /// Live-adjustable during the run.
    pub timing_shift_ms: i64,
    /// How long a tap is held down.
    pub tap_duration_ms: i64,
    /// Minimum gap enforced between a release and the next press in the
    /// same lane.
    pub guard_gap_ms: i64,
    /// Maximum events per lane; the excess is dropped and counted.
    pub lane_capacity: usize,
    /// Busy-wait tuning: above this remaining time the worker yields the
    /// thread between clock polls, below it it spins.
    pub spin_yield_threshold_us: i64,
    /// Known lane count. When set, lane coordinates are the centers of
    /// equally wide columns and hit objects are snapped to them; when
    /// unset, lanes are auto-detected from distinct x coordinates.
    pub expected_lanes: Option<usize>,
    /// Overrides the default home-row key layout.
    pub custom_keys: Option<Vec<Key>>,
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            start_time_adjustment_ms: 0,
            enable_clicking: true,
            jitter_amplitude_ms: 30,
            timing_shift_ms: 0,
            tap_duration_ms: 50,
            guard_gap_ms: 5,
            lane_capacity: 9999,
            spin_yield_threshold_us: 1_000,
            expected_lanes: None,
            custom_keys: None,
        }
    }
}
