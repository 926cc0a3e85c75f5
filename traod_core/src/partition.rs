//! Trajectory partitioning via a minimum-description-length tradeoff.
//!
//! A raw trajectory is collapsed into a reduced sequence of representative
//! points in one greedy forward pass. At each step the cost of representing
//! the current sub-range by a single straight segment (`mdl_par`) is compared
//! against the cost of keeping every raw point (`mdl_nopar`); when the
//! single-segment representation becomes more expensive, the previous
//! candidate point is committed and the scan restarts from it.

use crate::error::TraodError;
use crate::geometry::{length, perpendicular_distance};
use crate::types::Point;

/// Divisor applied to the summed perpendicular deviation in `mdl_par`.
const SMOOTHING_FACTOR: f64 = 2.0;

/// Relative tolerance on the MDL cost comparison. On a perfectly linear
/// range the two costs are equal up to rounding; rounding must not commit.
const COST_TOLERANCE: f64 = 1e-9;

/// MDL cost of representing `t[s..=e]` by the single segment `t[s] → t[e]`:
/// the segment's length plus the averaged perpendicular deviation of the
/// raw points in the range.
///
/// A zero-length candidate (`t[s] == t[e]`, a stationary run) has no defined
/// perpendicular deviation; its cost is 0 so partitioning it away always wins.
fn mdl_par(t: &[Point], s: usize, e: usize) -> f64 {
    let ld = length(t[s], t[e]);
    if ld == 0.0 {
        return 0.0;
    }
    let deviation: f64 = (s..e)
        .map(|i| perpendicular_distance(t[i], t[s], t[e]))
        .sum();
    ld + deviation / SMOOTHING_FACTOR
}

/// MDL cost of keeping every raw point in `t[s..=e]`: the sum of the
/// consecutive raw-segment lengths.
fn mdl_nopar(t: &[Point], s: usize, e: usize) -> f64 {
    (s..e).map(|i| length(t[i], t[i + 1])).sum()
}

/// Collapse a raw trajectory into its representative points.
///
/// The output always starts with the first raw point and ends with the last
/// one; interior points are kept only where a straight-segment representation
/// would lose more detail than it saves. Deterministic and pure.
///
/// Returns [`TraodError::InvalidTrajectory`] for inputs with fewer than 2
/// points; a 2-point trajectory passes through unchanged.
pub fn partition(t: &[Point]) -> Result<Vec<Point>, TraodError> {
    if t.len() < 2 {
        return Err(TraodError::InvalidTrajectory(t.len()));
    }

    let mut cp = vec![t[0]];
    let mut si = 1usize;
    let mut l = 1usize;
    while si + l < t.len() {
        let ci = si + l;
        // A single-step candidate has no interior point to commit; committing
        // it would re-append `t[si]` without advancing the scan.
        if l >= 2 && mdl_par(t, si, ci) > mdl_nopar(t, si, ci) * (1.0 + COST_TOLERANCE) {
            cp.push(t[ci - 1]);
            si = ci - 1;
            l = 1;
        } else {
            l += 1;
        }
    }

    // A committed point can coincide with the endpoint on closed loops; the
    // reduced sequence must stay free of zero-length segments.
    let last = t[t.len() - 1];
    if cp.last() != Some(&last) {
        cp.push(last);
    }
    Ok(cp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
