//! The run orchestrator.
//!
//! [`AutoPlayer::play`] resolves the lane layout, partitions the timeline,
//! spawns one scheduler thread per lane, and blocks until every lane
//! finishes or cancellation is observed. Whatever ends the run, no key is
//! left held down afterwards.

use std::borrow::Cow;
use std::sync::Arc;
use std::thread;

use tracing::info;

use crate::config::PlayConfig;
use crate::context::{LaneStates, RunContext};
use crate::layout;
use crate::model::HitObject;
use crate::partition;
use crate::scheduler::{LaneScheduler, TimingParams};
use crate::traits::input::{Key, KeySink};
use crate::traits::time::Clock;

/// Metrics for one completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaySummary {
    /// Resolved lane count.
    pub lanes: usize,
    /// Events scheduled per lane, after drops.
    pub scheduled: Vec<usize>,
    /// Events whose x matched no lane.
    pub dropped_unmapped: usize,
    /// Events beyond per-lane capacity.
    pub dropped_overflow: usize,
    /// Whether the run ended through cancellation.
    pub cancelled: bool,
}

/// Drives one timeline through per-lane scheduler threads.
pub struct AutoPlayer<S: KeySink, C: Clock> {
    sink: S,
    clock: C,
    config: PlayConfig,
    ctx: Arc<RunContext>,
}

impl<S: KeySink, C: Clock> AutoPlayer<S, C> {
    pub fn new(sink: S, clock: C, config: PlayConfig) -> Self {
        let ctx = Arc::new(RunContext::new(&config));
        Self {
            sink,
            clock,
            config,
            ctx,
        }
    }

    /// Handle for live control: cancellation, timing shift, and jitter
    /// amplitude can be driven from other threads while `play` blocks.
    pub fn context(&self) -> Arc<RunContext> {
        self.ctx.clone()
    }

    pub fn config(&self) -> &PlayConfig {
        &self.config
    }

    /// Play the timeline. Blocks the caller until every lane thread has
    /// finished (normally or via cancellation); before returning, any key
    /// still held down is force-released.
    ///
    /// Note: the context is shared across runs of this player, so a
    /// cancelled player stays cancelled.
    pub fn play(&self, objects: &[HitObject]) -> PlaySummary {
        // With a known lane count, snap raw x values onto the column
        // centers so exact-match partitioning applies.
        let objects: Cow<'_, [HitObject]> = match self.config.expected_lanes {
            Some(k) if (1..=layout::MAX_LANES).contains(&k) => {
                Cow::Owned(layout::remap_to_lane_centers(objects, k))
            }
            _ => Cow::Borrowed(objects),
        };

        let lanes = layout::resolve_lanes(&objects, self.config.expected_lanes);
        if lanes.is_empty() {
            info!("empty timeline, nothing to play");
            return PlaySummary {
                lanes: 0,
                scheduled: Vec::new(),
                dropped_unmapped: objects.len(),
                dropped_overflow: 0,
                cancelled: self.ctx.is_cancelled(),
            };
        }
        info!(lanes = lanes.len(), "detected {}K layout", lanes.len());

        let keys = layout::assign_keys(lanes.len(), self.config.custom_keys.as_deref());
        let (buckets, stats) = partition::partition(&objects, &lanes, self.config.lane_capacity);
        let scheduled: Vec<usize> = buckets.iter().map(Vec::len).collect();

        let states = LaneStates::new(lanes.len());
        let timing = TimingParams {
            start_adjustment_ms: self.config.start_time_adjustment_ms,
            tap_duration_ms: self.config.tap_duration_ms,
            guard_gap_ms: self.config.guard_gap_ms,
        };
        // One epoch for the whole run, so lanes share a single timeline.
        let start_us = self.clock.now_us();

        thread::scope(|scope| {
            for (lane, objects) in buckets.into_iter().enumerate() {
                let worker = LaneScheduler {
                    lane,
                    key: keys[lane],
                    objects,
                    timing,
                    start_us,
                    enable_clicking: self.config.enable_clicking,
                    spin_yield_threshold_us: self.config.spin_yield_threshold_us,
                    ctx: self.ctx.as_ref(),
                    states: &states,
                    sink: &self.sink,
                    clock: &self.clock,
                };
                scope.spawn(move || worker.run());
            }
        });

        // Lanes that exited through cancellation leave their key down;
        // releasing is the orchestrator's job, never the workers'.
        self.release_held(&states, &keys);

        let cancelled = self.ctx.is_cancelled();
        info!(cancelled, "all lanes completed");
        PlaySummary {
            lanes: lanes.len(),
            scheduled,
            dropped_unmapped: stats.unmapped,
            dropped_overflow: stats.overflow,
            cancelled,
        }
    }

    fn release_held(&self, states: &LaneStates, keys: &[Key]) {
        for lane in 0..states.len() {
            if states.is_pressed(lane) {
                self.sink.release(keys[lane]);
                states.set_pressed(lane, false);
            }
        }
    }
}
