//! Timed input events ("hit objects") on a horizontal playfield.
//!
//! A hit object is immutable once constructed. Within one lane, objects are
//! ordered ascending by `time_ms`; the scheduler enforces non-overlapping
//! press/release intervals at runtime by clamping release deadlines.

/// What kind of input an object demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    /// A short press of fixed duration.
    Tap,
    /// A press held down until `end_ms`.
    Hold { end_ms: i64 },
}

/// One timed event targeting the lane at horizontal position `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitObject {
    /// Horizontal playfield coordinate; identifies the lane.
    pub x: i32,
    /// Vertical coordinate. Carried through from chart data but unused.
    pub y: i32,
    /// Press time in milliseconds from chart start.
    pub time_ms: i64,
    pub kind: HitKind,
}

impl HitObject {
    pub fn tap(x: i32, time_ms: i64) -> Self {
        Self {
            x,
            y: 0,
            time_ms,
            kind: HitKind::Tap,
        }
    }

    pub fn hold(x: i32, time_ms: i64, end_ms: i64) -> Self {
        Self {
            x,
            y: 0,
            time_ms,
            kind: HitKind::Hold { end_ms },
        }
    }

    /// Nominal release time: the hold end for holds, the press time for taps.
    pub fn end_ms(&self) -> i64 {
        match self.kind {
            HitKind::Hold { end_ms } => end_ms,
            HitKind::Tap => self.time_ms,
        }
    }
}
