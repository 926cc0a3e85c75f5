//! Library error type. Geometric and numeric edge cases are resolved
//! locally with defined fallbacks; only structural violations surface here.

use crate::types::TrajectoryId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraodError {
    /// A trajectory must contain at least 2 points to be partitionable.
    #[error("trajectory has {0} point(s), at least 2 are required")]
    InvalidTrajectory(usize),

    /// A segment references an owner that is missing from the trajectory set.
    #[error("segment owner {0} is not present in the trajectory set")]
    UnknownTrajectory(TrajectoryId),
}
