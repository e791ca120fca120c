// Ruleset configuration: windows, judgements, points, holds, grades, lamps

mod classify;
mod hold;
mod points;
pub mod presets;
mod ruleset;

pub use classify::{grade_for, lamp_for};
pub use hold::{HoldBehaviour, osu_ln_judgement};
pub use points::{PointsSpec, wife_curve};
pub use ruleset::{
    Grade, HealthConfig, Judgement, Lamp, Ruleset, RulesetError, Timegate, judge_with_gates,
    symmetric_gates,
};

/// Index into a ruleset's judgement list. Lower is better.
pub type JudgementId = usize;
