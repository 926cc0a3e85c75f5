//! Fundamental types used across the entire workspace.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Scalar type: f64 throughout — the distance metric and MDL costs are
// sensitive to cancellation on near-collinear inputs.
// ---------------------------------------------------------------------------

/// A single observed position in the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The position as an nalgebra vector, for dot/cross arithmetic.
    pub fn coords(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Identifier type — newtype wrapper so entity ids are never confused with
// raw counters at compile time.
// ---------------------------------------------------------------------------

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TrajectoryId(pub u64);

impl fmt::Display for TrajectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Trajectory
// ---------------------------------------------------------------------------

/// Ordered sequence of observed (or partitioned) positions of one tracked
/// entity. The id lives in the owning [`TrajectorySet`] key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub points: Vec<Point>,
}

impl Trajectory {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Total path length: sum of the consecutive point-to-point distances.
    pub fn path_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].coords() - w[0].coords()).norm())
            .sum()
    }
}

/// The unit of input to the whole algorithm. Ordered map so every phase
/// iterates entities in a deterministic order.
pub type TrajectorySet = BTreeMap<TrajectoryId, Trajectory>;

// ---------------------------------------------------------------------------
// Segments (t-partitions)
// ---------------------------------------------------------------------------

/// One straight-line piece of a partitioned trajectory, between two
/// consecutive representative points. Geometrically immutable once built.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    /// The trajectory this t-partition was cut from.
    pub owner: TrajectoryId,
}

impl Segment {
    pub fn new(start: Point, end: Point, owner: TrajectoryId) -> Self {
        Self { start, end, owner }
    }

    /// Euclidean length. Zero for a degenerate segment; callers dividing by
    /// this must guard for 0.
    pub fn length(&self) -> f64 {
        (self.end.coords() - self.start.coords()).norm()
    }

    /// Direction vector from start to end (not normalized).
    pub fn direction(&self) -> Vector2<f64> {
        self.end.coords() - self.start.coords()
    }
}

/// A segment together with its detection verdict. The detector returns a
/// fresh collection of these rather than mutating segments in place, so the
/// data flow stays value-oriented and safe to produce in parallel.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlaggedSegment {
    pub segment: Segment,
    pub is_outlier: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn path_length_sums_consecutive_segments() {
        let t = Trajectory::new(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 4.0),
        ]);
        assert_abs_diff_eq!(t.path_length(), 7.0, epsilon = 1e-12);
    }

    #[test]
    fn degenerate_trajectory_has_zero_length() {
        assert_eq!(Trajectory::new(vec![]).path_length(), 0.0);
        assert_eq!(Trajectory::new(vec![Point::new(1.0, 1.0)]).path_length(), 0.0);
    }

    #[test]
    fn segment_length_and_direction() {
        let s = Segment::new(Point::new(1.0, 2.0), Point::new(4.0, 6.0), TrajectoryId(0));
        assert_abs_diff_eq!(s.length(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.direction().x, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.direction().y, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn trajectory_id_display() {
        assert_eq!(TrajectoryId(7).to_string(), "P7");
    }
}
