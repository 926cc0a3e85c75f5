//! Pipeline orchestrator: the full detection cycle for one trajectory set.
//!
//! # Processing phases
//! 1. Partition every trajectory into its representative points
//! 2. Build the global t-partition list
//! 3. Classify every t-partition (parallel)
//! 4. Mark trajectories by outlier-length ratio

use crate::{
    detect::detect_weighted,
    distance::DistanceWeights,
    error::TraodError,
    mark::mark,
    partition::partition,
    types::{FlaggedSegment, Segment, Trajectory, TrajectoryId, TrajectorySet},
};
use std::collections::BTreeSet;
use std::time::Instant;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Configuration for the detection pipeline.
#[derive(Clone, Debug)]
pub struct TraodConfig {
    /// Distance below which two t-partitions count as close.
    pub closeness_threshold: f64,
    /// Scales how many supporting trajectories a t-partition needs,
    /// relative to the population size.
    pub support_factor: f64,
    /// Fraction of a trajectory's length that must be outlying before the
    /// whole trajectory is marked.
    pub outlier_fraction: f64,
    /// Distance component weights.
    pub weights: DistanceWeights,
}

impl Default for TraodConfig {
    fn default() -> Self {
        Self {
            // Calibrated for grid-scaled pedestrian data (units of one cell).
            closeness_threshold: 1.0,
            support_factor: 0.1,
            outlier_fraction: 0.3,
            weights: DistanceWeights::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A trajectory the pipeline had to leave out, and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedTrajectory {
    pub id: TrajectoryId,
    pub reason: TraodError,
}

/// Outputs of one pipeline run.
#[derive(Clone, Debug)]
pub struct TraodOutput {
    /// Identifiers of the trajectories marked as outliers.
    pub outliers: BTreeSet<TrajectoryId>,
    /// The partitioned trajectory set (originals are left untouched).
    pub partitioned: TrajectorySet,
    /// Every t-partition with its verdict.
    pub segments: Vec<FlaggedSegment>,
    /// Number of t-partitions produced by the partition phase.
    pub segment_count: usize,
    /// Number of t-partitions flagged as outliers.
    pub outlier_segment_count: usize,
    /// Trajectories skipped over structural violations.
    pub skipped: Vec<SkippedTrajectory>,
    /// Timings in microseconds.
    pub timing_partition_us: u64,
    pub timing_detect_us: u64,
    pub timing_mark_us: u64,
    pub total_time_us: u64,
}

impl TraodOutput {
    /// Number of trajectories marked as outliers.
    pub fn outlier_trajectory_count(&self) -> usize {
        self.outliers.len()
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The detection pipeline. Owns its configuration; every call to [`run`]
/// owns its trajectory set view and segment list for the call's duration.
///
/// [`run`]: Traod::run
#[derive(Clone, Debug, Default)]
pub struct Traod {
    pub config: TraodConfig,
}

impl Traod {
    pub fn new(config: TraodConfig) -> Self {
        Self { config }
    }

    /// Run the full partition → detect → mark cycle.
    ///
    /// A trajectory that cannot be partitioned is skipped and reported in
    /// [`TraodOutput::skipped`]; the rest of the set is still processed.
    pub fn run(&self, trajectories: &TrajectorySet) -> Result<TraodOutput, TraodError> {
        let start_total = Instant::now();

        // ----------------------------------------------------------------
        // Phase 1-2: partition + global segment list
        // ----------------------------------------------------------------
        let t0 = Instant::now();
        let mut partitioned = TrajectorySet::new();
        let mut skipped = Vec::new();
        for (id, trajectory) in trajectories {
            match partition(&trajectory.points) {
                Ok(points) => {
                    partitioned.insert(*id, Trajectory::new(points));
                }
                Err(reason) => skipped.push(SkippedTrajectory { id: *id, reason }),
            }
        }

        let mut segments = Vec::new();
        for (id, trajectory) in &partitioned {
            for w in trajectory.points.windows(2) {
                segments.push(Segment::new(w[0], w[1], *id));
            }
        }
        let timing_partition_us = t0.elapsed().as_micros() as u64;

        // ----------------------------------------------------------------
        // Phase 3: per-segment classification
        // ----------------------------------------------------------------
        let t0 = Instant::now();
        let detected = detect_weighted(
            &partitioned,
            &segments,
            self.config.closeness_threshold,
            self.config.support_factor,
            &self.config.weights,
        )?;
        let timing_detect_us = t0.elapsed().as_micros() as u64;

        // ----------------------------------------------------------------
        // Phase 4: trajectory marking
        // ----------------------------------------------------------------
        let t0 = Instant::now();
        let outliers = mark(&partitioned, &detected.segments, self.config.outlier_fraction)?;
        let timing_mark_us = t0.elapsed().as_micros() as u64;

        Ok(TraodOutput {
            outliers,
            partitioned,
            segment_count: segments.len(),
            outlier_segment_count: detected.outlier_count,
            segments: detected.segments,
            skipped,
            timing_partition_us,
            timing_detect_us,
            timing_mark_us,
            total_time_us: start_total.elapsed().as_micros() as u64,
        })
    }
}

/// Top-level entry point: run the pipeline with the given thresholds and
/// return the outlier trajectory identifiers.
pub fn traod(
    trajectories: &TrajectorySet,
    closeness_threshold: f64,
    support_factor: f64,
    outlier_fraction: f64,
) -> Result<BTreeSet<TrajectoryId>, TraodError> {
    let config = TraodConfig {
        closeness_threshold,
        support_factor,
        outlier_fraction,
        ..TraodConfig::default()
    };
    Ok(Traod::new(config).run(trajectories)?.outliers)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    fn trajectory(coords: &[(f64, f64)]) -> Trajectory {
        Trajectory::new(coords.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    /// Two near-identical straight walkers and one divergent one.
    fn three_walkers() -> TrajectorySet {
        let mut set = TrajectorySet::new();
        set.insert(
            TrajectoryId(0),
            trajectory(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]),
        );
        set.insert(
            TrajectoryId(1),
            trajectory(&[(0.0, 0.01), (1.0, 0.01), (2.0, 0.01)]),
        );
        set.insert(
            TrajectoryId(2),
            trajectory(&[(0.0, 0.0), (1.0, 5.0), (2.0, 10.0)]),
        );
        set
    }

    #[test]
    fn divergent_walker_is_the_only_outlier() {
        let set = three_walkers();
        let outliers = traod(&set, 1.0, 0.1, 0.3).unwrap();
        assert_eq!(
            outliers.into_iter().collect::<Vec<_>>(),
            vec![TrajectoryId(2)]
        );
    }

    #[test]
    fn run_reports_segment_and_outlier_counts() {
        let set = three_walkers();
        let out = Traod::new(TraodConfig::default()).run(&set).unwrap();

        // Each straight walker collapses to a single t-partition.
        assert_eq!(out.segment_count, 3);
        assert_eq!(out.segments.len(), 3);
        assert_eq!(out.outlier_segment_count, 1);
        assert_eq!(out.outlier_trajectory_count(), 1);
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn originals_are_preserved_and_partitions_are_reduced() {
        let set = three_walkers();
        let out = Traod::new(TraodConfig::default()).run(&set).unwrap();

        assert_eq!(set[&TrajectoryId(0)].points.len(), 3);
        assert_eq!(out.partitioned[&TrajectoryId(0)].points.len(), 2);
    }

    #[test]
    fn degenerate_trajectory_is_skipped_not_fatal() {
        let mut set = three_walkers();
        set.insert(TrajectoryId(3), trajectory(&[(5.0, 5.0)]));

        let out = Traod::new(TraodConfig::default()).run(&set).unwrap();
        assert_eq!(
            out.skipped,
            vec![SkippedTrajectory {
                id: TrajectoryId(3),
                reason: TraodError::InvalidTrajectory(1),
            }]
        );
        // The rest of the population is still classified.
        assert_eq!(
            out.outliers.into_iter().collect::<Vec<_>>(),
            vec![TrajectoryId(2)]
        );
        assert!(!out.partitioned.contains_key(&TrajectoryId(3)));
    }

    #[test]
    fn single_trajectory_set_produces_no_outliers() {
        let mut set = TrajectorySet::new();
        set.insert(
            TrajectoryId(0),
            trajectory(&[(0.0, 0.0), (1.0, 3.0), (2.0, -4.0), (3.0, 0.0)]),
        );
        let out = Traod::new(TraodConfig::default()).run(&set).unwrap();
        assert!(out.outliers.is_empty());
        assert_eq!(out.outlier_segment_count, 0);
    }

    #[test]
    fn empty_set_is_a_clean_no_op() {
        let out = Traod::new(TraodConfig::default())
            .run(&TrajectorySet::new())
            .unwrap();
        assert!(out.outliers.is_empty());
        assert_eq!(out.segment_count, 0);
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn raising_the_fraction_never_grows_the_outlier_set() {
        let set = three_walkers();
        let mut previous = usize::MAX;
        for fraction in [0.1, 0.3, 0.5, 0.9] {
            let outliers = traod(&set, 1.0, 0.1, fraction).unwrap();
            assert!(outliers.len() <= previous);
            previous = outliers.len();
        }
    }
}
