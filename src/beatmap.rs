//! `.osu` beatmap loading.
//!
//! Only the `[HitObjects]` section matters here: comma-separated lines of
//! `x,y,time,type,hitSound[,endTime:...]`. Type bit 7 marks a hold whose
//! end time leads the sixth field. Malformed lines are skipped, not fatal.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::model::HitObject;

const HOLD_TYPE_BIT: u32 = 128;

/// Load the hit objects of a beatmap file, sorted by press time.
///
/// `rate` divides every timestamp (e.g. 1.5 for a speed-up mod); values at
/// or below zero are treated as 1.0.
pub fn load(path: &Path, rate: f64) -> Result<Vec<HitObject>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read beatmap {}", path.display()))?;
    Ok(parse_hit_objects(&text, rate))
}

/// Parse the `[HitObjects]` section out of beatmap text.
pub fn parse_hit_objects(text: &str, rate: f64) -> Vec<HitObject> {
    let rate = if rate > 0.0 { rate } else { 1.0 };
    let mut objects = Vec::new();
    let mut in_section = false;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if !in_section {
            in_section = line == "[HitObjects]";
            continue;
        }
        if line.is_empty() {
            break;
        }
        if let Some(obj) = parse_line(line, rate) {
            objects.push(obj);
        }
    }

    objects.sort_by_key(|obj| obj.time_ms);
    objects
}

fn parse_line(line: &str, rate: f64) -> Option<HitObject> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 5 {
        return None;
    }

    let x = parts[0].parse::<i32>().ok()?;
    let y = parts[1].parse::<i32>().ok()?;
    let time_ms = scale(parts[2].parse::<i64>().ok()?, rate);
    let object_type = parts[3].parse::<u32>().ok()?;

    if object_type & HOLD_TYPE_BIT != 0 && parts.len() >= 6 {
        // Hold end time leads the colon-separated extras field; a
        // malformed end degrades the object to an instant hold.
        let end_ms = parts[5]
            .split(':')
            .next()
            .and_then(|v| v.parse::<i64>().ok())
            .map(|v| scale(v, rate))
            .unwrap_or(time_ms);
        let mut obj = HitObject::hold(x, time_ms, end_ms);
        obj.y = y;
        Some(obj)
    } else {
        let mut obj = HitObject::tap(x, time_ms);
        obj.y = y;
        Some(obj)
    }
}

fn scale(time_ms: i64, rate: f64) -> i64 {
    (time_ms as f64 / rate) as i64
}
