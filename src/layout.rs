//! Lane coordinate resolution and key bindings.
//!
//! Lanes are identified by their horizontal playfield coordinate. With a
//! known lane count the coordinates are the centers of equally wide columns
//! across the 512-unit playfield; otherwise they are auto-detected from the
//! distinct x values in the timeline.

use crate::model::HitObject;
use crate::traits::input::Key;

/// Maximum supported lane count.
pub const MAX_LANES: usize = 9;

/// Playfield width the lane coordinates are laid out across.
pub const PLAYFIELD_WIDTH: f64 = 512.0;

/// Home-row keys assigned outward from the middle lane.
const HOME_ROW: [Key; 9] = [
    Key('a'),
    Key('s'),
    Key('d'),
    Key('f'),
    Key::SPACE,
    Key('j'),
    Key('k'),
    Key('l'),
    Key(';'),
];

/// Center x coordinate of each of `lane_count` equally wide columns.
pub fn lane_centers(lane_count: usize) -> Vec<i32> {
    let width = PLAYFIELD_WIDTH / lane_count as f64;
    (0..lane_count)
        .map(|i| ((i as f64 + 0.5) * width) as i32)
        .collect()
}

/// Resolve the lane coordinate set for a timeline.
///
/// A valid `expected` count wins; otherwise the first `MAX_LANES` distinct
/// x values are taken in encounter order. Events whose x matches none of
/// the resolved coordinates are later dropped by the partitioner. The
/// result is sorted ascending.
pub fn resolve_lanes(objects: &[HitObject], expected: Option<usize>) -> Vec<i32> {
    let mut lanes = match expected {
        Some(k) if (1..=MAX_LANES).contains(&k) => lane_centers(k),
        _ => {
            let mut seen: Vec<i32> = Vec::new();
            for obj in objects {
                if seen.len() >= MAX_LANES {
                    break;
                }
                if !seen.contains(&obj.x) {
                    seen.push(obj.x);
                }
            }
            seen
        }
    };
    lanes.sort_unstable();
    lanes
}

/// Snap every object's x to the center of the column it falls in.
///
/// Used when the lane count is known but the chart's raw x values are not
/// already column centers.
pub fn remap_to_lane_centers(objects: &[HitObject], lane_count: usize) -> Vec<HitObject> {
    let width = PLAYFIELD_WIDTH / lane_count as f64;
    objects
        .iter()
        .map(|obj| {
            let index = ((obj.x.max(0) as f64 / width) as usize).min(lane_count - 1);
            HitObject {
                x: ((index as f64 + 0.5) * width) as i32,
                ..*obj
            }
        })
        .collect()
}

/// Default key layout: home row centered on the middle lane, with Space in
/// the middle for odd lane counts.
pub fn default_keys(lane_count: usize) -> Vec<Key> {
    let lane_count = lane_count.min(MAX_LANES);
    let mut keys = vec![Key::SPACE; lane_count];
    let middle = lane_count / 2;

    let mut key_index = 3usize;
    for lane in (0..middle).rev() {
        keys[lane] = HOME_ROW[key_index];
        key_index = key_index.wrapping_sub(1);
    }

    let right_start = if lane_count % 2 == 1 {
        keys[middle] = Key::SPACE;
        middle + 1
    } else {
        middle
    };
    let mut key_index = 5usize;
    for lane in right_start..lane_count {
        keys[lane] = HOME_ROW[key_index];
        key_index += 1;
    }

    keys
}

/// The per-lane key bindings for a run: custom keys when provided and
/// complete, otherwise the default layout. Fixed before the run starts.
pub fn assign_keys(lane_count: usize, custom: Option<&[Key]>) -> Vec<Key> {
    match custom {
        Some(keys) if keys.len() >= lane_count => keys[..lane_count].to_vec(),
        _ => default_keys(lane_count),
    }
}
