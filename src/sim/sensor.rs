//! Ground sensing by vertical ray fan
//!
//! Probes are cast straight down from the character, one pixel at a time,
//! against the terrain mask. The slope comes from the outermost two hits.

use glam::{IVec2, Vec2};

use super::mask::TerrainMask;
use crate::slope_normal;

/// Diagnostic record of one probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayTrace {
    pub start: Vec2,
    pub end: Vec2,
    pub hit: Option<Vec2>,
}

/// Diagnostic slope line: midpoint of the extreme hits and its unit normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeLine {
    pub mid: Vec2,
    pub normal: Vec2,
}

/// A fixed fan of downward probes
#[derive(Debug, Clone)]
pub struct GroundSensor {
    offsets: Vec<f32>,
    length: u32,
}

impl GroundSensor {
    pub fn new(offsets: Vec<f32>, length: u32) -> Self {
        Self { offsets, length }
    }

    /// One slot per probe offset, `None` where the probe escaped
    pub fn cast(&self, position: Vec2, terrain: &TerrainMask) -> Vec<Option<Vec2>> {
        self.offsets
            .iter()
            .map(|&offset| self.probe(position + Vec2::new(offset, 0.0), terrain))
            .collect()
    }

    /// Same as [`GroundSensor::cast`], keeping each probe's extent
    pub fn cast_traced(&self, position: Vec2, terrain: &TerrainMask) -> Vec<RayTrace> {
        let reach = Vec2::new(0.0, self.length as f32);
        self.offsets
            .iter()
            .zip(self.cast(position, terrain))
            .map(|(&offset, hit)| {
                let start = position + Vec2::new(offset, 0.0);
                RayTrace {
                    start,
                    end: start + reach,
                    hit,
                }
            })
            .collect()
    }

    /// First solid world pixel below `start`, nearest first
    fn probe(&self, start: Vec2, terrain: &TerrainMask) -> Option<Vec2> {
        let x = start.x.floor() as i32;
        (0..self.length)
            .map(|dy| IVec2::new(x, (start.y + dy as f32).floor() as i32))
            .find(|&p| terrain.point_occupied(p))
            .map(|p| p.as_vec2())
    }
}

/// Present hits only, in probe order
pub fn collect_hits(slots: &[Option<Vec2>]) -> Vec<Vec2> {
    slots.iter().flatten().copied().collect()
}

/// Hit with the smallest y (the highest surface point)
pub fn closest_hit(hits: &[Vec2]) -> Option<Vec2> {
    hits.iter().copied().min_by(|a, b| a.y.total_cmp(&b.y))
}

/// Leftmost and rightmost hit, ordered by (x, y)
fn extremes(hits: &[Vec2]) -> Option<(Vec2, Vec2)> {
    if hits.len() < 2 {
        return None;
    }
    let mut sorted = hits.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    Some((sorted[0], sorted[sorted.len() - 1]))
}

/// Slope angle (radians) of the line through the outermost hits.
///
/// Uses the whole fan rather than the pair nearest the contact point, which
/// smooths out small bumps. Returns 0 for fewer than two hits or a vertical
/// spread.
pub fn slope_from_hits(hits: &[Vec2]) -> f32 {
    match extremes(hits) {
        Some((left, right)) => {
            let d = right - left;
            if d.x == 0.0 { 0.0 } else { d.y.atan2(d.x) }
        }
        None => 0.0,
    }
}

/// Slope line for debug overlays, when the slope is defined
pub fn slope_line(hits: &[Vec2]) -> Option<SlopeLine> {
    let (left, right) = extremes(hits)?;
    if right.x == left.x {
        return None;
    }
    let angle = slope_from_hits(hits);
    Some(SlopeLine {
        mid: (left + right) * 0.5,
        normal: slope_normal(angle),
    })
}
