//! `ingest` — Data layer around the detection engine.
//!
//! # Module layout
//! - [`positions`] — Position-log parsing and trajectory building
//! - [`presence`]  — Per-second presence and flow aggregation
//! - [`dataset`]   — Trajectory dataset persistence (JSON)
//! - [`synth`]     — Deterministic synthetic crowd scenarios

pub mod dataset;
pub mod positions;
pub mod presence;
pub mod synth;

pub use dataset::{load_dataset, save_dataset, TrajectoryDataset, TrajectoryRecord};
pub use positions::{read_records, trajectories_from_records, IngestConfig, PositionRecord};
pub use synth::ScenarioKind;
