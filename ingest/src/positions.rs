//! Position-log ingestion: raw tracking rows → per-entity trajectories.
//!
//! The log is semicolon-delimited, one observation per row:
//! `<date>T<HH:MM:SS:mmm>;<tag>;<x mm>;<y mm>;<entity id>`.
//! Millimetre coordinates are scaled down to grid units so the default
//! closeness threshold of the detection pipeline is meaningful.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::warn;
use traod_core::{Point, Trajectory, TrajectoryId, TrajectorySet};

/// Scaling applied when turning millimetre positions into grid units.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Divisor for the x coordinate (millimetres per grid unit).
    pub x_scale: f64,
    /// Divisor for the y coordinate (millimetres per grid unit).
    pub y_scale: f64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            x_scale: 6700.0,
            y_scale: 20100.0,
        }
    }
}

/// One parsed observation row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Second-resolution time label (`HH:MM:SS`), as found in the log.
    pub time_label: String,
    /// Seconds since midnight.
    pub seconds: f64,
    /// Sensor/tag field, carried through unparsed.
    pub tag: String,
    pub x_mm: i64,
    pub y_mm: i64,
    pub entity: u64,
}

/// Parse every well-formed row of a position log. Malformed rows are
/// skipped with a warning; the file is never abandoned half-way.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<PositionRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (row_idx, row) in csv_reader.records().enumerate() {
        let row = row.with_context(|| format!("reading row {row_idx}"))?;
        match parse_row(&row) {
            Some(record) => records.push(record),
            None => warn!(row = row_idx, "skipping malformed position row"),
        }
    }
    Ok(records)
}

/// Read and parse a position log file.
pub fn load_position_log(path: &Path) -> Result<Vec<PositionRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_records(BufReader::new(file))
}

fn parse_row(row: &csv::StringRecord) -> Option<PositionRecord> {
    let timestamp = row.get(0)?;
    let tag = row.get(1)?.to_string();
    let x_mm: i64 = row.get(2)?.trim().parse().ok()?;
    let y_mm: i64 = row.get(3)?.trim().parse().ok()?;
    let entity: u64 = row.get(4)?.trim().parse().ok()?;

    // `<date>T<HH:MM:SS:mmm>` → keep the time of day, drop milliseconds.
    let time_of_day = timestamp.split('T').nth(1)?;
    let time_label = time_of_day.get(..time_of_day.len().checked_sub(4)?)?;
    let seconds = seconds_of_day(time_label)?;

    Some(PositionRecord {
        time_label: time_label.to_string(),
        seconds,
        tag,
        x_mm,
        y_mm,
        entity,
    })
}

fn seconds_of_day(label: &str) -> Option<f64> {
    let mut parts = label.split(':');
    let hours: u32 = parts.next()?.parse().ok()?;
    let minutes: u32 = parts.next()?.parse().ok()?;
    let seconds: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }
    Some(f64::from(hours * 3600 + minutes * 60 + seconds))
}

/// Build a trajectory set from parsed rows.
///
/// Rows are grouped per entity and ordered by time (stable, so same-second
/// observations keep their file order). Consecutive duplicate positions are
/// dropped, and entities left with fewer than 2 distinct positions are
/// discarded — the detection pipeline requires at least one segment.
pub fn trajectories_from_records(
    records: &[PositionRecord],
    config: &IngestConfig,
) -> TrajectorySet {
    let mut grouped: BTreeMap<u64, Vec<(f64, Point)>> = BTreeMap::new();
    for record in records {
        let point = Point::new(
            record.x_mm as f64 / config.x_scale,
            record.y_mm as f64 / config.y_scale,
        );
        grouped
            .entry(record.entity)
            .or_default()
            .push((record.seconds, point));
    }

    let mut set = TrajectorySet::new();
    for (entity, mut timed) in grouped {
        timed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut points: Vec<Point> = Vec::with_capacity(timed.len());
        for (_, point) in timed {
            if points.last() != Some(&point) {
                points.push(point);
            }
        }

        if points.len() < 2 {
            warn!(entity, observations = points.len(), "dropping short track");
            continue;
        }
        set.insert(TrajectoryId(entity), Trajectory::new(points));
    }
    set
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
