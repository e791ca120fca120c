use serde::{Deserialize, Serialize};
use vsrg_model::Time;

use crate::JudgementId;
use crate::ruleset::Timegate;

/// How hold (long) notes resolve into judgements.
///
/// Data-driven: the scoring machine branches on the variant, there is no
/// per-behaviour trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HoldBehaviour {
    /// The head is judged like a tap; the release only affects combo.
    BreakComboOnly,
    /// Head judgement is deferred; the release combines head and release
    /// deltas through the osu!mania long-note table.
    OsuStyle { od: f32 },
    /// Head judgement is deferred; a dropped or overheld hold degrades the
    /// head judgement to at least the configured ones.
    Normal {
        drop: JudgementId,
        overhold: JudgementId,
    },
    /// The head is judged like a tap; the release is judged against its own
    /// gate list.
    JudgeReleases { gates: Vec<Timegate> },
    /// Only the release is judged (against the ruleset's main gates).
    OnlyJudgeReleases,
}

/// Combined osu!mania long-note judgement.
///
/// `a` is half the absolute release delta, `h` the absolute head delta and
/// `b = 151.5 - 3*od` the head-hit bound; constants in milliseconds.
pub fn osu_ln_judgement(
    head_delta: Time,
    release_delta: Time,
    od: f32,
    overhold: bool,
    dropped: bool,
) -> JudgementId {
    let a = release_delta.as_ms().abs() * 0.5;
    let h = head_delta.as_ms().abs();
    let b = 151.5 - 3.0 * od;
    let head_ok = overhold || h < b;

    let w300 = 64.5 - 3.0 * od;
    let w200 = 97.5 - 3.0 * od;
    let w100 = 127.5 - 3.0 * od;

    if a < 19.8 && a + h < 39.6 && head_ok && !dropped {
        0
    } else if a < w300 * 1.1 && a + h < 2.2 * w300 && head_ok && !dropped {
        1
    } else if a < w200 && a + h < 2.0 * w200 && head_ok {
        2
    } else if a < w100 && a + h < 2.0 * w100 && head_ok {
        3
    } else if head_ok {
        4
    } else {
        5
    }
}
