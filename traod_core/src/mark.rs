//! Trajectory-level aggregation of per-segment verdicts.

use crate::error::TraodError;
use crate::types::{FlaggedSegment, TrajectoryId, TrajectorySet};
use std::collections::BTreeSet;

/// Mark trajectories whose outlier segments cover more than
/// `outlier_fraction` of their total partitioned length.
///
/// A trajectory with zero total segment length carries no evidence and is
/// excluded from consideration.
pub fn mark(
    trajectories: &TrajectorySet,
    segments: &[FlaggedSegment],
    outlier_fraction: f64,
) -> Result<BTreeSet<TrajectoryId>, TraodError> {
    for fs in segments {
        if !trajectories.contains_key(&fs.segment.owner) {
            return Err(TraodError::UnknownTrajectory(fs.segment.owner));
        }
    }

    let mut outliers = BTreeSet::new();
    for id in trajectories.keys() {
        let mut outlier_len = 0.0;
        let mut total_len = 0.0;
        for fs in segments.iter().filter(|fs| fs.segment.owner == *id) {
            let len = fs.segment.length();
            total_len += len;
            if fs.is_outlier {
                outlier_len += len;
            }
        }
        if total_len == 0.0 {
            continue;
        }
        if outlier_len / total_len > outlier_fraction {
            outliers.insert(*id);
        }
    }
    Ok(outliers)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
