//! Outlier t-partition detection.
//!
//! Every segment is compared against every segment of every other
//! trajectory: a peer trajectory *supports* a segment when the summed length
//! of its close segments covers the segment's own length, and a segment is
//! flagged when its supporter count — calibrated by how densely the peer
//! distances cluster around it — falls short of the population threshold.
//!
//! This is quadratic in the segment count. Each verdict depends only on the
//! read-only segment list and trajectory set, never on another verdict, so
//! the outer loop runs on rayon workers with no ordering between segments.

use crate::distance::{segment_distance_weighted, DistanceWeights};
use crate::error::TraodError;
use crate::types::{FlaggedSegment, Segment, TrajectoryId, TrajectorySet};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Output of the detection phase.
#[derive(Clone, Debug)]
pub struct DetectOutput {
    /// Every input segment with its verdict, in input order.
    pub segments: Vec<FlaggedSegment>,
    /// Number of segments flagged as outliers.
    pub outlier_count: usize,
}

/// Classify every segment with default (unit) distance weights.
///
/// `closeness` is the distance below which two segments count as close;
/// `support_factor` scales how many supporting trajectories a segment needs
/// relative to the population size.
pub fn detect(
    trajectories: &TrajectorySet,
    segments: &[Segment],
    closeness: f64,
    support_factor: f64,
) -> Result<DetectOutput, TraodError> {
    detect_weighted(
        trajectories,
        segments,
        closeness,
        support_factor,
        &DistanceWeights::default(),
    )
}

/// Classify every segment, with explicit distance weights.
pub fn detect_weighted(
    trajectories: &TrajectorySet,
    segments: &[Segment],
    closeness: f64,
    support_factor: f64,
    weights: &DistanceWeights,
) -> Result<DetectOutput, TraodError> {
    // Group segment indices by owning trajectory once, up front. Owners
    // missing from the set are a structural violation, not a geometry case.
    let mut by_owner: BTreeMap<TrajectoryId, Vec<usize>> = BTreeMap::new();
    for (i, seg) in segments.iter().enumerate() {
        if !trajectories.contains_key(&seg.owner) {
            return Err(TraodError::UnknownTrajectory(seg.owner));
        }
        by_owner.entry(seg.owner).or_default().push(i);
    }

    let population = trajectories.len() as f64;
    let total_segments = segments.len() as f64;

    let flagged: Vec<FlaggedSegment> = segments
        .par_iter()
        .map(|li| {
            let own_length = li.length();
            let mut distances = Vec::with_capacity(segments.len());
            let mut supporters = 0usize;

            for (owner, indices) in &by_owner {
                if *owner == li.owner {
                    continue;
                }
                let mut match_len = 0.0;
                for &j in indices {
                    let peer = &segments[j];
                    let dist = segment_distance_weighted(li, peer, weights);
                    if dist < closeness {
                        match_len += peer.length();
                    }
                    distances.push(dist);
                }
                // Full coverage at exactly the segment's own length still
                // counts as support.
                if match_len >= own_length {
                    supporters += 1;
                }
            }

            // No peer trajectories: no evidence either way.
            if distances.is_empty() {
                return FlaggedSegment {
                    segment: *li,
                    is_outlier: false,
                };
            }

            let sd = std_deviation(&distances);
            let within = distances.iter().filter(|&&d| d <= sd).count();
            // +1 keeps the density positive; dividing by the global segment
            // count makes it comparable across differently sized datasets.
            let density = (within + 1) as f64 / total_segments;
            let is_outlier = (supporters as f64 / density) < support_factor * population;
            FlaggedSegment {
                segment: *li,
                is_outlier,
            }
        })
        .collect();

    let outlier_count = flagged.iter().filter(|s| s.is_outlier).count();
    Ok(DetectOutput {
        segments: flagged,
        outlier_count,
    })
}

/// Population standard deviation.
fn std_deviation(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|v| {
            let d = v - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    variance.sqrt()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
