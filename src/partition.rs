//! Splitting the global timeline into per-lane sub-timelines.

use tracing::warn;

use crate::model::HitObject;

/// Drop counters for one partitioning pass.
///
/// Unmapped and over-capacity events are dropped silently; these counts
/// are the only signal that a drop happened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionStats {
    /// Events whose x matched no resolved lane coordinate.
    pub unmapped: usize,
    /// Events beyond a lane's capacity.
    pub overflow: usize,
}

/// Assign each object to the lane whose coordinate equals its x, preserving
/// input order (the source is globally time-sorted, so each lane stays
/// time-sorted). Each lane holds at most `capacity` events.
pub fn partition(
    objects: &[HitObject],
    lanes: &[i32],
    capacity: usize,
) -> (Vec<Vec<HitObject>>, PartitionStats) {
    let mut buckets: Vec<Vec<HitObject>> = vec![Vec::new(); lanes.len()];
    let mut stats = PartitionStats::default();

    for obj in objects {
        match lanes.iter().position(|&x| x == obj.x) {
            Some(lane) if buckets[lane].len() < capacity => buckets[lane].push(*obj),
            Some(_) => stats.overflow += 1,
            None => stats.unmapped += 1,
        }
    }

    if stats.unmapped > 0 {
        warn!(count = stats.unmapped, "dropped events matching no lane");
    }
    if stats.overflow > 0 {
        warn!(count = stats.overflow, "dropped events over lane capacity");
    }

    (buckets, stats)
}
