//! Distance measurement
//!
//! Point-accumulation state machine behind the scene measuring gesture:
//! while the measure modifier is held, each click drops a point and the
//! running total grows by the new segment. Releasing the modifier keeps the
//! path on screen; only an explicit reset clears it.

use crate::models::Vec3;

/// Where the tool is in its gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureState {
    Idle,
    Accumulating,
}

/// Accumulates clicked points and the path length through them
#[derive(Debug, Clone, Default)]
pub struct MeasureTool {
    points: Vec<Vec3>,
    total: f32,
    modifier_held: bool,
}

impl MeasureTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the measure modifier; releasing it does not clear the path
    pub fn set_modifier(&mut self, held: bool) {
        self.modifier_held = held;
    }

    pub fn is_modifier_held(&self) -> bool {
        self.modifier_held
    }

    pub fn state(&self) -> MeasureState {
        if self.points.is_empty() {
            MeasureState::Idle
        } else {
            MeasureState::Accumulating
        }
    }

    /// Add a point under the cursor
    ///
    /// Ignored unless the measure modifier is held. With `snap`, each
    /// coordinate is rounded to the nearest whole unit, halves to even.
    /// Returns whether the point was taken.
    pub fn click(&mut self, point: Vec3, snap: bool) -> bool {
        if !self.modifier_held {
            return false;
        }
        let point = if snap { point.rounded() } else { point };
        match self.points.last() {
            Some(last) => self.total += last.distance(&point),
            None => self.total = 0.0,
        }
        self.points.push(point);
        true
    }

    /// Clear the path; like clicking, only while the measure modifier is held
    pub fn reset(&mut self) -> bool {
        if !self.modifier_held {
            return false;
        }
        self.points.clear();
        self.total = 0.0;
        true
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn total_distance(&self) -> f32 {
        self.total
    }

    /// Length of each segment in click order
    pub fn segments(&self) -> Vec<f32> {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance(&pair[1]))
            .collect()
    }

    /// Distance from the last point to the cursor, while measuring
    pub fn preview(&self, cursor: Vec3, snap: bool) -> Option<f32> {
        if !self.modifier_held {
            return None;
        }
        let cursor = if snap { cursor.rounded() } else { cursor };
        self.points.last().map(|last| last.distance(&cursor))
    }

    /// Average of all points, where the total label is anchored
    pub fn centroid(&self) -> Option<Vec3> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f32;
        let sum = self.points.iter().fold(Vec3::ZERO, |acc, p| {
            Vec3::new(acc.x + p.x, acc.y + p.y, acc.z + p.z)
        });
        Some(Vec3::new(sum.x / n, sum.y / n, sum.z / n))
    }
}
