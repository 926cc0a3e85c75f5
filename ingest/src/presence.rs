//! Per-second presence and flow aggregation over the binned grid.
//!
//! Presence answers "who occupied which cell during each second"; flow
//! accumulates an 8-direction histogram of single-cell moves between
//! consecutive observations of the same entity. Both are byproducts of the
//! same position log the detection pipeline consumes.

use crate::positions::{IngestConfig, PositionRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Grid cell index, from truncating millimetre coordinates by the
/// configured divisors.
pub type Cell = (i64, i64);

/// Per-second presence: for each time label, the set of entities seen in
/// each occupied cell.
pub type PresenceMap = BTreeMap<String, BTreeMap<Cell, BTreeSet<u64>>>;

/// Per-second flow: for each time label, a direction histogram per cell.
pub type FlowMap = BTreeMap<String, BTreeMap<Cell, FlowHistogram>>;

/// The eight single-cell displacement directions, in histogram order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowDirection {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl FlowDirection {
    /// Map a cell displacement to a direction. `None` for no move or a
    /// jump farther than one cell.
    pub fn from_step(dx: i64, dy: i64) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::North),
            (1, -1) => Some(Self::NorthEast),
            (1, 0) => Some(Self::East),
            (1, 1) => Some(Self::SouthEast),
            (0, 1) => Some(Self::South),
            (-1, 1) => Some(Self::SouthWest),
            (-1, 0) => Some(Self::West),
            (-1, -1) => Some(Self::NorthWest),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Direction counts for one cell over one second.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowHistogram(pub [u32; 8]);

impl FlowHistogram {
    pub fn add(&mut self, direction: FlowDirection) {
        self.0[direction.index()] += 1;
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

fn cell_of(record: &PositionRecord, config: &IngestConfig) -> Cell {
    (
        (record.x_mm as f64 / config.x_scale) as i64,
        (record.y_mm as f64 / config.y_scale) as i64,
    )
}

/// Count which entities occupied which cell during each second.
pub fn presence_by_second(records: &[PositionRecord], config: &IngestConfig) -> PresenceMap {
    let mut presence = PresenceMap::new();
    for record in records {
        presence
            .entry(record.time_label.clone())
            .or_default()
            .entry(cell_of(record, config))
            .or_default()
            .insert(record.entity);
    }
    presence
}

/// Accumulate flow histograms from consecutive rows of the same entity.
///
/// A move is attributed to the cell the entity left, under the time label
/// of the arrival row. Moves spanning more than one cell are ignored.
pub fn flow_by_second(records: &[PositionRecord], config: &IngestConfig) -> FlowMap {
    let mut flow = FlowMap::new();
    let mut previous: Option<(&PositionRecord, Cell)> = None;

    for record in records {
        let cell = cell_of(record, config);
        if let Some((prev, prev_cell)) = previous {
            if prev.entity == record.entity && prev_cell != cell {
                let (dx, dy) = (cell.0 - prev_cell.0, cell.1 - prev_cell.1);
                match FlowDirection::from_step(dx, dy) {
                    Some(direction) => flow
                        .entry(record.time_label.clone())
                        .or_default()
                        .entry(prev_cell)
                        .or_default()
                        .add(direction),
                    None => debug!(entity = record.entity, dx, dy, "move spans several cells"),
                }
            }
        }
        previous = Some((record, cell));
    }
    flow
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(time_label: &str, x_mm: i64, y_mm: i64, entity: u64) -> PositionRecord {
        PositionRecord {
            time_label: time_label.to_string(),
            seconds: 0.0,
            tag: "A".to_string(),
            x_mm,
            y_mm,
            entity,
        }
    }

    fn unit_config() -> IngestConfig {
        IngestConfig {
            x_scale: 1000.0,
            y_scale: 1000.0,
        }
    }

    #[test]
    fn presence_counts_distinct_entities_per_cell() {
        let records = vec![
            record("10:00:00", 500, 500, 1),
            record("10:00:00", 700, 900, 2),
            record("10:00:00", 1500, 500, 3),
            record("10:00:00", 600, 600, 1), // same entity, same cell
        ];
        let presence = presence_by_second(&records, &unit_config());

        let frame = &presence["10:00:00"];
        assert_eq!(frame[&(0, 0)].len(), 2);
        assert_eq!(frame[&(1, 0)].len(), 1);
    }

    #[test]
    fn flow_attributes_moves_to_the_departed_cell() {
        let records = vec![
            record("10:00:00", 500, 500, 1),
            record("10:00:01", 1500, 500, 1), // east
            record("10:00:02", 1500, 1500, 1), // south
        ];
        let flow = flow_by_second(&records, &unit_config());

        let east = &flow["10:00:01"][&(0, 0)];
        assert_eq!(east.0[FlowDirection::East.index()], 1);
        assert_eq!(east.total(), 1);

        let south = &flow["10:00:02"][&(1, 0)];
        assert_eq!(south.0[FlowDirection::South.index()], 1);
    }

    #[test]
    fn flow_ignores_entity_changes_and_long_jumps() {
        let records = vec![
            record("10:00:00", 500, 500, 1),
            record("10:00:01", 1500, 500, 2), // different entity
            record("10:00:02", 9500, 500, 2), // 8-cell jump
        ];
        let flow = flow_by_second(&records, &unit_config());
        assert!(flow.is_empty());
    }

    #[test]
    fn direction_mapping_covers_all_eight_neighbors() {
        let steps = [
            (0, -1),
            (1, -1),
            (1, 0),
            (1, 1),
            (0, 1),
            (-1, 1),
            (-1, 0),
            (-1, -1),
        ];
        let mut seen = [false; 8];
        for (dx, dy) in steps {
            let dir = FlowDirection::from_step(dx, dy).unwrap();
            seen[dir.index()] = true;
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(FlowDirection::from_step(0, 0), None);
        assert_eq!(FlowDirection::from_step(2, 0), None);
    }
}
