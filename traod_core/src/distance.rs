//! Composite distance between two t-partitions.
//!
//! # Components
//! Three weighted terms, combined after canonically ordering the operands
//! so the shorter segment is projected onto the longer:
//! - **perpendicular**: offsets of each start point from the other segment's
//!   infinite line, blended as `(l1² + l2²) / (l1 + l2)` so one large offset
//!   costs more than two evenly split ones
//! - **parallel**: nearest-endpoint distance to the projected points
//! - **angular**: `sin θ` scaled by the longer segment's length, saturating
//!   at the full length once the segments point 90° or more apart

use crate::geometry::{length, project};
use crate::types::Segment;

/// Component weights for [`segment_distance`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceWeights {
    pub perpendicular: f64,
    pub parallel: f64,
    pub angular: f64,
}

impl Default for DistanceWeights {
    fn default() -> Self {
        Self {
            perpendicular: 1.0,
            parallel: 1.0,
            angular: 1.0,
        }
    }
}

/// Distance between two t-partitions with default (unit) weights.
/// Symmetric: `segment_distance(a, b) == segment_distance(b, a)`.
pub fn segment_distance(l1: &Segment, l2: &Segment) -> f64 {
    segment_distance_weighted(l1, l2, &DistanceWeights::default())
}

/// Weighted distance between two t-partitions.
pub fn segment_distance_weighted(l1: &Segment, l2: &Segment, w: &DistanceWeights) -> f64 {
    // Shorter segment first; which operand is projected onto which depends
    // on this order, so it is what makes the result symmetric.
    let (l1, l2) = if l1.length() > l2.length() {
        (l2, l1)
    } else {
        (l1, l2)
    };

    // Start-point projections onto the other segment's infinite line.
    let proj1 = project(l1.start, l2.start, l2.end);
    let proj2 = project(l2.start, l1.start, l1.end);
    let lper1 = length(l1.start, proj1);
    let lper2 = length(l2.start, proj2);

    // Collinear and coincident at the projected point.
    let offset_sum = lper1 + lper2;
    let d_per = if offset_sum == 0.0 {
        0.0
    } else {
        (lper1 * lper1 + lper2 * lper2) / offset_sum
    };

    // Nearest endpoint to the point projected onto this segment's line.
    let d_par1 = length(l1.start, proj2).min(length(l1.end, proj2));
    let d_par2 = length(l2.start, proj1).min(length(l2.end, proj1));
    let d_par = d_par1.min(d_par2);

    let d1 = l1.direction();
    let d2 = l2.direction();
    let norms = d1.norm() * d2.norm();
    let d_ang = if norms == 0.0 {
        // Degenerate operand: no direction, no angular penalty.
        0.0
    } else {
        // Clamp against floating-point overshoot before acos.
        let cos = (d1.dot(&d2) / norms).clamp(-1.0, 1.0);
        let theta = cos.acos();
        if theta < std::f64::consts::FRAC_PI_2 {
            theta.sin() * l2.length()
        } else {
            l2.length()
        }
    };

    w.perpendicular * d_per + w.parallel * d_par + w.angular * d_ang
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point, TrajectoryId};
    use approx::assert_abs_diff_eq;

    fn seg(sx: f64, sy: f64, ex: f64, ey: f64) -> Segment {
        Segment::new(Point::new(sx, sy), Point::new(ex, ey), TrajectoryId(0))
    }

    #[test]
    fn identical_segments_have_zero_distance() {
        let a = seg(0.0, 0.0, 3.0, 4.0);
        assert_abs_diff_eq!(segment_distance(&a, &a), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn parallel_offset_segments() {
        // Unit perpendicular offset, no parallel or angular component.
        let a = seg(0.0, 0.0, 2.0, 0.0);
        let b = seg(0.0, 1.0, 2.0, 1.0);
        assert_abs_diff_eq!(segment_distance(&a, &b), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn orthogonal_segments_pay_full_angular_penalty() {
        let a = seg(0.0, 0.0, 1.0, 0.0);
        let b = seg(0.0, 0.0, 0.0, 1.0);
        // θ = 90°: the angular term saturates at the longer length.
        assert_abs_diff_eq!(segment_distance(&a, &b), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn antiparallel_segments_pay_full_angular_penalty() {
        let a = seg(0.0, 0.0, 2.0, 0.0);
        let b = seg(2.0, 0.0, 0.0, 0.0);
        assert_abs_diff_eq!(segment_distance(&a, &b), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn symmetric_under_argument_swap() {
        let pairs = [
            (seg(0.0, 0.0, 2.0, 0.0), seg(0.5, 1.0, 3.0, 2.0)),
            (seg(-1.0, 4.0, 2.0, -3.0), seg(0.0, 0.0, 10.0, 1.0)),
            (seg(0.0, 0.0, 1.0, 1.0), seg(5.0, 5.0, 5.0, 9.0)),
            // Equal lengths: canonicalization cannot break the tie.
            (seg(0.0, 0.0, 2.0, 0.0), seg(1.0, 1.0, 3.0, 1.0)),
        ];
        for (a, b) in pairs {
            assert_abs_diff_eq!(
                segment_distance(&a, &b),
                segment_distance(&b, &a),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn non_negative_for_degenerate_inputs() {
        let degenerate = seg(1.0, 1.0, 1.0, 1.0);
        let normal = seg(0.0, 0.0, 2.0, 0.0);
        assert!(segment_distance(&degenerate, &normal) >= 0.0);
        assert!(segment_distance(&degenerate, &degenerate) >= 0.0);
    }

    #[test]
    fn weights_scale_components_independently() {
        let a = seg(0.0, 0.0, 2.0, 0.0);
        let b = seg(0.0, 1.0, 2.0, 1.0);
        // Only the perpendicular component is non-zero for this pair.
        let w = DistanceWeights {
            perpendicular: 3.0,
            parallel: 1.0,
            angular: 1.0,
        };
        assert_abs_diff_eq!(segment_distance_weighted(&a, &b, &w), 3.0, epsilon = 1e-12);
    }
}
