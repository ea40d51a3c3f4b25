//! Per-lane press/release scheduling.
//!
//! One [`LaneScheduler`] runs on its own thread and walks its lane's
//! time-ordered events, busy-waiting on the monotonic clock until each
//! press/release deadline. Busy-waiting is deliberate: OS sleep granularity
//! is coarser than the sub-5ms precision required, so the worker polls the
//! clock, yielding between polls while the deadline is far and spinning
//! once it is close. The cancellation flag is checked on every poll.

use tracing::{debug, trace};

use crate::context::{LaneStates, RunContext};
use crate::jitter;
use crate::model::{HitKind, HitObject};
use crate::traits::input::{Key, KeySink};
use crate::traits::time::Clock;

/// Fixed deadline parameters for one run.
#[derive(Debug, Clone, Copy)]
pub struct TimingParams {
    /// Subtracted from every chart timestamp.
    pub start_adjustment_ms: i64,
    /// How long a tap is held.
    pub tap_duration_ms: i64,
    /// Minimum release-to-next-press gap within a lane.
    pub guard_gap_ms: i64,
}

/// Press and release instants for one event, in run-clock milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    pub press_ms: i64,
    pub release_ms: i64,
}

/// Compute the press/release deadlines for `obj`, given the event that
/// follows it in the same lane.
///
/// Holds release at their end time, taps after a fixed hold duration; both
/// carry an independent jitter offset and the live timing shift. If the
/// release would land within `guard_gap_ms` of the next event's press time,
/// it is clamped to that bound so press/release intervals in one lane never
/// overlap.
pub fn compute_deadlines(
    obj: &HitObject,
    next: Option<&HitObject>,
    timing: &TimingParams,
    timing_shift_ms: i64,
    press_offset_ms: i64,
    release_offset_ms: i64,
) -> Deadlines {
    let press_ms = obj.time_ms - timing.start_adjustment_ms + press_offset_ms + timing_shift_ms;

    let mut release_ms = match obj.kind {
        HitKind::Hold { end_ms } => {
            end_ms - timing.start_adjustment_ms + release_offset_ms + timing_shift_ms
        }
        HitKind::Tap => press_ms + timing.tap_duration_ms + release_offset_ms,
    };

    if let Some(next) = next {
        let bound = next.time_ms - timing.start_adjustment_ms - timing.guard_gap_ms;
        if release_ms > bound {
            release_ms = bound;
        }
    }

    Deadlines {
        press_ms,
        release_ms,
    }
}

/// Worker that plays back one lane's events.
pub(crate) struct LaneScheduler<'a> {
    pub lane: usize,
    pub key: Key,
    pub objects: Vec<HitObject>,
    pub timing: TimingParams,
    /// Run epoch in clock microseconds, shared by every lane.
    pub start_us: i64,
    pub enable_clicking: bool,
    pub spin_yield_threshold_us: i64,
    pub ctx: &'a RunContext,
    pub states: &'a LaneStates,
    pub sink: &'a dyn KeySink,
    pub clock: &'a dyn Clock,
}

impl LaneScheduler<'_> {
    pub fn run(self) {
        for i in 0..self.objects.len() {
            if self.ctx.is_cancelled() {
                debug!(lane = self.lane, "lane cancelled");
                return;
            }

            let obj = self.objects[i];
            let next = self.objects.get(i + 1);

            let amplitude = self.ctx.jitter_amplitude_ms();
            let deadlines = compute_deadlines(
                &obj,
                next,
                &self.timing,
                self.ctx.timing_shift_ms(),
                jitter::sample(amplitude),
                jitter::sample(amplitude),
            );
            trace!(
                lane = self.lane,
                press_ms = deadlines.press_ms,
                release_ms = deadlines.release_ms,
                "scheduled event"
            );

            if !self.wait_until(deadlines.press_ms) {
                debug!(lane = self.lane, "lane cancelled");
                return;
            }
            if self.enable_clicking {
                self.sink.press(self.key);
                self.states.set_pressed(self.lane, true);
            }

            if !self.wait_until(deadlines.release_ms) {
                debug!(lane = self.lane, "lane cancelled");
                return;
            }
            if self.enable_clicking {
                self.sink.release(self.key);
                self.states.set_pressed(self.lane, false);
            }
        }
        debug!(lane = self.lane, events = self.objects.len(), "lane done");
    }

    /// Poll the clock until run time reaches `deadline_ms`.
    /// Returns false if cancellation was observed while waiting.
    fn wait_until(&self, deadline_ms: i64) -> bool {
        let deadline_us = deadline_ms.saturating_mul(1_000);
        loop {
            if self.ctx.is_cancelled() {
                return false;
            }
            let elapsed_us = self.clock.now_us() - self.start_us;
            if elapsed_us >= deadline_us {
                return true;
            }
            if deadline_us - elapsed_us > self.spin_yield_threshold_us {
                std::thread::yield_now();
            } else {
                core::hint::spin_loop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayConfig;
    use crate::traits::input::{KeyAction, RecordingSink};
    use crate::traits::time::MockClock;
    use proptest::prelude::*;

    fn timing() -> TimingParams {
        TimingParams {
            start_adjustment_ms: 0,
            tap_duration_ms: 50,
            guard_gap_ms: 5,
        }
    }

    #[test]
    fn tap_release_follows_press_by_tap_duration() {
        let obj = HitObject::tap(64, 1000);
        let d = compute_deadlines(&obj, None, &timing(), 0, 0, 0);
        assert_eq!(d, Deadlines { press_ms: 1000, release_ms: 1050 });
    }

    #[test]
    fn hold_releases_at_end_time() {
        let obj = HitObject::hold(64, 1000, 1800);
        let d = compute_deadlines(&obj, None, &timing(), 0, 0, 0);
        assert_eq!(d, Deadlines { press_ms: 1000, release_ms: 1800 });
    }

    #[test]
    fn offsets_and_shift_apply_independently() {
        let obj = HitObject::hold(64, 1000, 1800);
        let d = compute_deadlines(&obj, None, &timing(), 10, -3, 7);
        assert_eq!(d.press_ms, 1000 + 10 - 3);
        assert_eq!(d.release_ms, 1800 + 10 + 7);

        let tap = HitObject::tap(64, 1000);
        let d = compute_deadlines(&tap, None, &timing(), 10, -3, 7);
        // Tap release rides on the press deadline, so the shift is not
        // applied twice.
        assert_eq!(d.press_ms, 1007);
        assert_eq!(d.release_ms, 1007 + 50 + 7);
    }

    #[test]
    fn start_adjustment_shifts_everything_earlier() {
        let obj = HitObject::tap(64, 1000);
        let next = HitObject::tap(64, 1100);
        let d = compute_deadlines(&obj, Some(&next), &timing(), 0, 0, 0);
        let adjusted = compute_deadlines(
            &obj,
            Some(&next),
            &TimingParams { start_adjustment_ms: 400, ..timing() },
            0,
            0,
            0,
        );
        assert_eq!(adjusted.press_ms, d.press_ms - 400);
        assert_eq!(adjusted.release_ms, d.release_ms - 400);
    }

    #[test]
    fn long_hold_release_clamps_exactly_to_guard_bound() {
        let obj = HitObject::hold(64, 1000, 2000);
        let next = HitObject::tap(64, 1500);
        let d = compute_deadlines(&obj, Some(&next), &timing(), 0, 0, 0);
        assert_eq!(d.release_ms, 1500 - 5);
    }

    #[test]
    fn close_tap_pair_does_not_clamp_when_unneeded() {
        // Press at 1000, natural release 1050, bound 1095: no clamp.
        let obj = HitObject::tap(64, 1000);
        let next = HitObject::tap(64, 1100);
        let d = compute_deadlines(&obj, Some(&next), &timing(), 0, 0, 0);
        assert_eq!(d, Deadlines { press_ms: 1000, release_ms: 1050 });

        let d2 = compute_deadlines(&next, None, &timing(), 0, 0, 0);
        assert_eq!(d2, Deadlines { press_ms: 1100, release_ms: 1150 });
    }

    proptest! {
        /// Post-clamp, a release never overlaps the next press in the lane.
        #[test]
        fn release_never_crosses_next_press(
            start in 0i64..10_000,
            gaps in prop::collection::vec((6i64..500, any::<bool>(), 1i64..1_000), 2..40),
        ) {
            let mut t = start;
            let mut objects = Vec::new();
            for &(gap, is_hold, hold_len) in &gaps {
                objects.push(if is_hold {
                    HitObject::hold(64, t, t + hold_len)
                } else {
                    HitObject::tap(64, t)
                });
                t += gap;
            }

            for pair in objects.windows(2) {
                let d = compute_deadlines(&pair[0], Some(&pair[1]), &timing(), 0, 0, 0);
                let next_press =
                    compute_deadlines(&pair[1], None, &timing(), 0, 0, 0).press_ms;
                prop_assert!(d.release_ms <= next_press);
            }
        }
    }

    fn scheduler<'a>(
        objects: Vec<HitObject>,
        ctx: &'a RunContext,
        states: &'a LaneStates,
        sink: &'a RecordingSink,
        clock: &'a MockClock,
    ) -> LaneScheduler<'a> {
        LaneScheduler {
            lane: 0,
            key: Key('f'),
            objects,
            timing: timing(),
            start_us: 0,
            enable_clicking: true,
            spin_yield_threshold_us: 1_000,
            ctx,
            states,
            sink,
            clock,
        }
    }

    fn quiet_ctx() -> RunContext {
        RunContext::new(&PlayConfig {
            jitter_amplitude_ms: 0,
            timing_shift_ms: 0,
            ..PlayConfig::default()
        })
    }

    #[test]
    fn plays_events_in_press_release_order() {
        let ctx = quiet_ctx();
        let states = LaneStates::new(1);
        let sink = RecordingSink::new();
        let clock = MockClock::auto_advancing(500);

        let objects = vec![HitObject::tap(64, 1000), HitObject::hold(64, 1100, 1300)];
        scheduler(objects, &ctx, &states, &sink, &clock).run();

        let actions: Vec<KeyAction> = sink.events().iter().map(|&(a, _)| a).collect();
        assert_eq!(
            actions,
            vec![
                KeyAction::Press,
                KeyAction::Release,
                KeyAction::Press,
                KeyAction::Release,
            ]
        );
        assert!(!states.is_pressed(0));
    }

    #[test]
    fn disabled_clicking_schedules_but_injects_nothing() {
        let ctx = quiet_ctx();
        let states = LaneStates::new(1);
        let sink = RecordingSink::new();
        let clock = MockClock::auto_advancing(500);

        let mut sched = scheduler(vec![HitObject::tap(64, 100)], &ctx, &states, &sink, &clock);
        sched.enable_clicking = false;
        sched.run();

        assert!(sink.events().is_empty());
        assert!(!states.is_pressed(0));
    }

    #[test]
    fn pre_cancelled_lane_emits_nothing() {
        let ctx = quiet_ctx();
        ctx.request_cancel();
        let states = LaneStates::new(1);
        let sink = RecordingSink::new();
        let clock = MockClock::auto_advancing(500);

        scheduler(vec![HitObject::tap(64, 100)], &ctx, &states, &sink, &clock).run();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn cancellation_breaks_out_of_busy_wait() {
        let ctx = std::sync::Arc::new(quiet_ctx());
        let states = std::sync::Arc::new(LaneStates::new(1));
        let sink = std::sync::Arc::new(RecordingSink::new());
        // Frozen clock: the press deadline is never reached, so only
        // cancellation can end the wait.
        let clock = std::sync::Arc::new(MockClock::new());

        let handle = {
            let (ctx, states, sink, clock) =
                (ctx.clone(), states.clone(), sink.clone(), clock.clone());
            std::thread::spawn(move || {
                scheduler(
                    vec![HitObject::tap(64, 1_000_000)],
                    &ctx,
                    &states,
                    &sink,
                    &clock,
                )
                .run();
            })
        };

        std::thread::sleep(std::time::Duration::from_millis(20));
        ctx.request_cancel();
        handle.join().unwrap();
        assert!(sink.events().is_empty());
    }

    #[test]
    fn past_deadlines_fire_immediately() {
        let ctx = quiet_ctx();
        let states = LaneStates::new(1);
        let sink = RecordingSink::new();
        let clock = MockClock::new();
        clock.set(10_000_000);

        let mut sched = scheduler(vec![HitObject::tap(64, 100)], &ctx, &states, &sink, &clock);
        sched.start_us = 0;
        sched.run();
        assert_eq!(sink.events().len(), 2);
    }
}
