//! Millisecond-accurate per-lane key scheduling for rhythm-game style input.
//!
//! A time-sorted list of [`HitObject`]s is partitioned into independent lanes,
//! and one worker thread per lane busy-waits on a monotonic clock to fire
//! press/release events through a [`KeySink`] at jittered, clamped deadlines.
//! A shared [`RunContext`] drives live control (cancellation, timing shift,
//! jitter amplitude) from other threads while a run is in progress.

pub mod beatmap;
pub mod config;
pub mod context;
pub mod jitter;
pub mod layout;
pub mod model;
pub mod partition;
pub mod player;
pub mod scheduler;
pub mod traits;
pub mod util;

pub use config::PlayConfig;
pub use context::{LaneStates, RunContext};
pub use model::{HitKind, HitObject};
pub use player::{AutoPlayer, PlaySummary};
pub use traits::input::{Key, KeySink};
pub use traits::time::{Clock, SystemClock};
