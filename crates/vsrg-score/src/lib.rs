// Scoring engine: judgement state machine, health, snapshots, personal bests

mod bests;
mod event;
mod health;
mod hit_data;
mod processor;
mod snapshot;
mod state;

pub use bests::{Improvement, LegacyBests, PersonalBests};
pub use event::{HitEvent, HitEventGuts};
pub use health::HealthBar;
pub use hit_data::{HitData, HitRow, HitStatus};
pub use processor::{HoldState, Scorer, ScoringRun};
pub use snapshot::{SNAPSHOT_COUNT, Snapshot};
pub use state::ScoreState;
