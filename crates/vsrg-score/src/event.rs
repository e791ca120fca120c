use serde::{Deserialize, Serialize};
use vsrg_model::Time;
use vsrg_rule::JudgementId;

/// How a note or release was resolved.
///
/// `judgement` is `None` when the ruleset defers a hold head's judgement to
/// its release, and for releases under rulesets that never judge them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HitEventGuts {
    Hit {
        judgement: Option<JudgementId>,
        delta: Time,
        missed: bool,
        is_hold: bool,
    },
    Release {
        judgement: Option<JudgementId>,
        delta: Time,
        missed: bool,
        overhold: bool,
        dropped: bool,
    },
}

/// One resolved scoring event, in `(time, lane)` order within a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitEvent {
    /// Chart time the resolution happened: input time for active hits,
    /// `row_time + miss_window` for passive retirements.
    pub time: Time,
    pub column: usize,
    pub guts: HitEventGuts,
}

impl HitEvent {
    pub fn is_miss(&self) -> bool {
        match self.guts {
            HitEventGuts::Hit { missed, .. } | HitEventGuts::Release { missed, .. } => missed,
        }
    }

    pub fn judgement(&self) -> Option<JudgementId> {
        match self.guts {
            HitEventGuts::Hit { judgement, .. } | HitEventGuts::Release { judgement, .. } => {
                judgement
            }
        }
    }

    pub fn delta(&self) -> Time {
        match self.guts {
            HitEventGuts::Hit { delta, .. } | HitEventGuts::Release { delta, .. } => delta,
        }
    }
}
