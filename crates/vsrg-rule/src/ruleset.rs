use serde::{Deserialize, Serialize};
use thiserror::Error;
use vsrg_model::Time;

use crate::JudgementId;
use crate::hold::HoldBehaviour;
use crate::points::PointsSpec;

/// One judgement category: an ordinal quality label for a hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Judgement {
    pub name: String,
    pub breaks_combo: bool,
    /// Display colour, RGBA.
    pub color: [u8; 4],
}

/// A signed upper-bound threshold mapping a delta onto a judgement.
///
/// Gates are kept sorted ascending by time; the first gate whose threshold
/// exceeds the delta wins, so the window nearest zero takes precedence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timegate {
    pub time: Time,
    pub judgement: JudgementId,
}

/// Health bar configuration. Values live in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthConfig {
    pub start: f32,
    pub clear_threshold: f32,
    /// When set, `failed()` reports the live value instead of the sticky one.
    pub only_fail_at_end: bool,
    /// Per-judgement health change; same length as the judgement list.
    pub deltas: Vec<f32>,
}

/// An end-of-run rank awarded by accuracy ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grade {
    pub name: String,
    pub accuracy_threshold: f64,
}

/// An end-of-run accomplishment tag awarded by judgement thresholds.
///
/// `judgement == -1` counts combo breaks; otherwise the lamp counts that
/// judgement and every worse one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lamp {
    pub name: String,
    pub judgement: i32,
    pub threshold: u32,
}

#[derive(Debug, Error)]
pub enum RulesetError {
    #[error("ruleset has no judgements")]
    NoJudgements,

    #[error("timegate {index} is not sorted ascending")]
    UnsortedTimegates { index: usize },

    #[error("timegate {index} references judgement {judgement} out of range")]
    GateJudgementOutOfRange { index: usize, judgement: JudgementId },

    #[error("default judgement {0} out of range")]
    DefaultJudgementOutOfRange(JudgementId),

    #[error("health deltas length {got} does not match judgement count {expected}")]
    HealthDeltasMismatch { got: usize, expected: usize },

    #[error("ruleset has no grades")]
    NoGrades,

    #[error("ruleset has no lamps")]
    NoLamps,

    #[error("miss window {0} must be positive")]
    NonPositiveMissWindow(Time),

    #[error("cbrush window {cbrush} exceeds miss window {miss}")]
    CbrushWiderThanMiss { cbrush: Time, miss: Time },

    #[error("points weight table is empty")]
    EmptyWeights,
}

/// Immutable scoring configuration, constructed once and shared read-only
/// across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    pub name: String,
    /// Absolute window beyond which a press cannot match a note and a note
    /// is forcibly missed.
    pub miss_window: Time,
    /// Inner window controlling absorption of repeat presses by an
    /// already-hit early note.
    pub cbrush_window: Time,
    pub timegates: Vec<Timegate>,
    /// Judgement returned when no gate matches.
    pub default_judgement: JudgementId,
    pub points: PointsSpec,
    pub hold_behaviour: HoldBehaviour,
    pub health: HealthConfig,
    pub judgements: Vec<Judgement>,
    pub grades: Vec<Grade>,
    pub lamps: Vec<Lamp>,
}

impl Ruleset {
    /// Structural validation; every preset and every caller-supplied ruleset
    /// must pass before a run is started.
    pub fn validate(&self) -> Result<(), RulesetError> {
        if self.judgements.is_empty() {
            return Err(RulesetError::NoJudgements);
        }
        if self.miss_window <= Time::ZERO {
            return Err(RulesetError::NonPositiveMissWindow(self.miss_window));
        }
        if self.cbrush_window > self.miss_window {
            return Err(RulesetError::CbrushWiderThanMiss {
                cbrush: self.cbrush_window,
                miss: self.miss_window,
            });
        }
        for (index, pair) in self.timegates.windows(2).enumerate() {
            if pair[1].time <= pair[0].time {
                return Err(RulesetError::UnsortedTimegates { index: index + 1 });
            }
        }
        for (index, gate) in self.timegates.iter().enumerate() {
            if gate.judgement >= self.judgements.len() {
                return Err(RulesetError::GateJudgementOutOfRange {
                    index,
                    judgement: gate.judgement,
                });
            }
        }
        if self.default_judgement >= self.judgements.len() {
            return Err(RulesetError::DefaultJudgementOutOfRange(
                self.default_judgement,
            ));
        }
        if self.health.deltas.len() != self.judgements.len() {
            return Err(RulesetError::HealthDeltasMismatch {
                got: self.health.deltas.len(),
                expected: self.judgements.len(),
            });
        }
        if self.grades.is_empty() {
            return Err(RulesetError::NoGrades);
        }
        if self.lamps.is_empty() {
            return Err(RulesetError::NoLamps);
        }
        if let PointsSpec::Weights { weights, .. } = &self.points
            && weights.is_empty()
        {
            return Err(RulesetError::EmptyWeights);
        }
        Ok(())
    }

    /// Map a delta onto a judgement: first gate with `delta < gate.time`
    /// wins, else the default judgement.
    pub fn judge(&self, delta: Time) -> JudgementId {
        judge_with_gates(&self.timegates, self.default_judgement, delta)
    }

    /// Points awarded for a hit, as a fraction of one full point.
    pub fn points(&self, delta: Time, judgement: JudgementId) -> f64 {
        self.points.points(delta, judgement)
    }

    pub fn judgement_count(&self) -> usize {
        self.judgements.len()
    }

    pub fn breaks_combo(&self, judgement: JudgementId) -> bool {
        self.judgements[judgement].breaks_combo
    }
}

/// Shared gate lookup, also used by release gate lists.
pub fn judge_with_gates(
    gates: &[Timegate],
    default: JudgementId,
    delta: Time,
) -> JudgementId {
    for gate in gates {
        if delta < gate.time {
            return gate.judgement;
        }
    }
    default
}

/// Expand half-window widths into a signed gate list.
///
/// `windows` is ordered best-to-worst, e.g. `[(22.5, 0), (45.0, 1)]`. On the
/// early side a delta just beyond window `i` belongs to window `i + 1`, and a
/// delta early beyond the widest window falls through to `default`.
pub fn symmetric_gates(windows: &[(f32, JudgementId)], default: JudgementId) -> Vec<Timegate> {
    let mut gates = Vec::with_capacity(windows.len() * 2);
    for (i, &(w, _)) in windows.iter().enumerate().rev() {
        let judgement = windows.get(i + 1).map_or(default, |&(_, j)| j);
        gates.push(Timegate {
            time: Time(-w),
            judgement,
        });
    }
    for &(w, j) in windows {
        gates.push(Timegate {
            time: Time(w),
            judgement: j,
        });
    }
    gates
}
