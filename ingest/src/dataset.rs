//! Dataset persistence: serialize/deserialize trajectory sets for offline
//! runs and reproducible experiments.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use traod_core::{Point, Trajectory, TrajectoryId, TrajectorySet};

/// One stored trajectory.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrajectoryRecord {
    pub id: u64,
    pub points: Vec<Point>,
}

/// A named, self-contained set of trajectories.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrajectoryDataset {
    pub name: String,
    pub trajectories: Vec<TrajectoryRecord>,
}

impl TrajectoryDataset {
    pub fn from_set(name: impl Into<String>, set: &TrajectorySet) -> Self {
        Self {
            name: name.into(),
            trajectories: set
                .iter()
                .map(|(id, t)| TrajectoryRecord {
                    id: id.0,
                    points: t.points.clone(),
                })
                .collect(),
        }
    }

    pub fn to_set(&self) -> TrajectorySet {
        self.trajectories
            .iter()
            .map(|r| (TrajectoryId(r.id), Trajectory::new(r.points.clone())))
            .collect()
    }
}

/// Save a dataset to a JSON file.
pub fn save_dataset(dataset: &TrajectoryDataset, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, dataset)?;
    Ok(())
}

/// Load a dataset from a JSON file.
pub fn load_dataset(path: &Path) -> Result<TrajectoryDataset> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let reader = BufReader::new(file);
    let dataset: TrajectoryDataset = serde_json::from_reader(reader)?;
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_conversion_preserves_ids_and_points() {
        let mut set = TrajectorySet::new();
        set.insert(
            TrajectoryId(3),
            Trajectory::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 2.0)]),
        );
        set.insert(
            TrajectoryId(8),
            Trajectory::new(vec![Point::new(5.0, 5.0), Point::new(6.0, 5.0)]),
        );

        let dataset = TrajectoryDataset::from_set("roundtrip", &set);
        assert_eq!(dataset.trajectories.len(), 2);
        assert_eq!(dataset.to_set(), set);
    }

    #[test]
    fn json_shape_is_stable() {
        let mut set = TrajectorySet::new();
        set.insert(
            TrajectoryId(1),
            Trajectory::new(vec![Point::new(0.5, -1.0), Point::new(1.5, 0.0)]),
        );
        let dataset = TrajectoryDataset::from_set("shape", &set);

        let json = serde_json::to_value(&dataset).unwrap();
        assert_eq!(json["name"], "shape");
        assert_eq!(json["trajectories"][0]["id"], 1);
        assert_eq!(json["trajectories"][0]["points"][0]["x"], 0.5);
    }
}
