use serde::{Deserialize, Serialize};
use vsrg_model::Time;

/// Number of equally spaced samples taken across a chart.
pub const SNAPSHOT_COUNT: usize = 100;

/// A point-in-time sample of the running totals, for UI score graphs.
///
/// `lamp` is the lamp that would be awarded if the run ended at this sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Chart-relative sample time (measured from the first note).
    pub time: Time,
    pub points_scored: f64,
    pub max_points_scored: f64,
    pub combo: u32,
    pub lamp: i32,
}
