//! Builtin rulesets.
//!
//! These are starting points; callers may construct any [`Ruleset`] by hand
//! as long as it passes [`Ruleset::validate`].

use vsrg_model::Time;

use crate::hold::HoldBehaviour;
use crate::points::PointsSpec;
use crate::ruleset::{
    Grade, HealthConfig, Judgement, Lamp, Ruleset, Timegate, symmetric_gates,
};

fn judgement(name: &str, breaks_combo: bool, color: [u8; 4]) -> Judgement {
    Judgement {
        name: name.to_string(),
        breaks_combo,
        color,
    }
}

fn grade(name: &str, accuracy_threshold: f64) -> Grade {
    Grade {
        name: name.to_string(),
        accuracy_threshold,
    }
}

fn lamp(name: &str, judgement: i32, threshold: u32) -> Lamp {
    Lamp {
        name: name.to_string(),
        judgement,
        threshold,
    }
}

const MARVELOUS: [u8; 4] = [0, 255, 255, 255];
const PERFECT: [u8; 4] = [255, 215, 0, 255];
const GREAT: [u8; 4] = [0, 230, 90, 255];
const GOOD: [u8; 4] = [0, 128, 255, 255];
const BAD: [u8; 4] = [230, 0, 230, 255];
const MISS: [u8; 4] = [255, 40, 40, 255];

/// Six-judgement weight-table ruleset with `Normal` hold behaviour.
pub fn standard() -> Ruleset {
    let windows = [(22.5, 0), (45.0, 1), (90.0, 2), (135.0, 3), (180.0, 4)];
    Ruleset {
        name: "Standard".to_string(),
        miss_window: Time(180.0),
        cbrush_window: Time(90.0),
        timegates: symmetric_gates(&windows, 5),
        default_judgement: 5,
        points: PointsSpec::Weights {
            max_weight: 10.0,
            weights: vec![10.0, 9.0, 5.0, 1.0, 0.0, 0.0],
        },
        hold_behaviour: HoldBehaviour::Normal {
            drop: 4,
            overhold: 3,
        },
        health: HealthConfig {
            start: 0.5,
            clear_threshold: 0.0,
            only_fail_at_end: false,
            deltas: vec![0.008, 0.008, 0.004, 0.0, -0.04, -0.08],
        },
        judgements: vec![
            judgement("Marvelous", false, MARVELOUS),
            judgement("Perfect", false, PERFECT),
            judgement("Great", false, GREAT),
            judgement("Good", false, GOOD),
            judgement("Bad", true, BAD),
            judgement("Miss", true, MISS),
        ],
        grades: vec![
            grade("D", 0.5),
            grade("C", 0.7),
            grade("B", 0.8),
            grade("A", 0.9),
            grade("S", 0.95),
            grade("SS", 0.98),
        ],
        lamps: vec![
            lamp("SDCB", -1, 9),
            lamp("FC", -1, 0),
            lamp("SDG", 3, 9),
            lamp("PFC", 3, 0),
            lamp("MFC", 1, 0),
        ],
    }
}

/// osu!mania-style ruleset: OD-scaled windows and combined long-note
/// judgement at the release.
pub fn osu_mania(od: f32) -> Ruleset {
    let w300g = 16.5;
    let w300 = 64.5 - 3.0 * od;
    let w200 = 97.5 - 3.0 * od;
    let w100 = 127.5 - 3.0 * od;
    let w50 = 151.5 - 3.0 * od;
    let windows = [(w300g, 0), (w300, 1), (w200, 2), (w100, 3), (w50, 4)];
    Ruleset {
        name: format!("osu!mania (OD{od})"),
        miss_window: Time(188.5 - 3.0 * od),
        cbrush_window: Time(w300),
        timegates: symmetric_gates(&windows, 5),
        default_judgement: 5,
        points: PointsSpec::Weights {
            max_weight: 320.0,
            weights: vec![320.0, 300.0, 200.0, 100.0, 50.0, 0.0],
        },
        hold_behaviour: HoldBehaviour::OsuStyle { od },
        health: HealthConfig {
            start: 1.0,
            clear_threshold: 0.0,
            only_fail_at_end: false,
            deltas: vec![0.01, 0.01, 0.005, 0.0, -0.02, -0.05],
        },
        judgements: vec![
            judgement("300g", false, MARVELOUS),
            judgement("300", false, PERFECT),
            judgement("200", false, GREAT),
            judgement("100", false, GOOD),
            judgement("50", false, BAD),
            judgement("MISS", true, MISS),
        ],
        grades: vec![
            grade("D", 0.6),
            grade("C", 0.7),
            grade("B", 0.8),
            grade("A", 0.9),
            grade("S", 0.95),
            grade("SS", 1.0),
        ],
        lamps: vec![lamp("FC", -1, 0), lamp("PFC", 2, 0), lamp("MFC", 1, 0)],
    }
}

/// Wife-curve ruleset: fixed windows, continuous points, releases judged
/// against gates widened by half.
pub fn wife(judge: i32) -> Ruleset {
    let windows = [(22.5, 0), (45.0, 1), (90.0, 2), (135.0, 3), (180.0, 4)];
    let release_windows: Vec<(f32, usize)> =
        windows.iter().map(|&(w, j)| (w * 1.5, j)).collect();
    Ruleset {
        name: format!("Wife (J{judge})"),
        miss_window: Time(180.0),
        cbrush_window: Time(90.0),
        timegates: symmetric_gates(&windows, 5),
        default_judgement: 5,
        points: PointsSpec::WifeCurve { judge },
        hold_behaviour: HoldBehaviour::JudgeReleases {
            gates: symmetric_gates(&release_windows, 5),
        },
        health: HealthConfig {
            start: 0.5,
            clear_threshold: 0.0,
            only_fail_at_end: false,
            deltas: vec![0.008, 0.008, 0.004, 0.0, -0.045, -0.09],
        },
        judgements: vec![
            judgement("Marvelous", false, MARVELOUS),
            judgement("Perfect", false, PERFECT),
            judgement("Great", false, GREAT),
            judgement("Good", false, GOOD),
            judgement("Bad", true, BAD),
            judgement("Miss", true, MISS),
        ],
        grades: vec![
            grade("D", 0.2),
            grade("C", 0.6),
            grade("B", 0.7),
            grade("A", 0.8),
            grade("AA", 0.93),
            grade("AAA", 0.997),
        ],
        lamps: vec![
            lamp("SDCB", -1, 9),
            lamp("FC", -1, 0),
            lamp("PFC", 3, 0),
            lamp("MFC", 1, 0),
        ],
    }
}

/// Same shape as [`standard`], with caller-chosen hold behaviour. Handy for
/// tests and for games that expose hold handling as a player option.
pub fn standard_with_holds(hold_behaviour: HoldBehaviour) -> Ruleset {
    Ruleset {
        hold_behaviour,
        ..standard()
    }
}

/// Release gates for [`HoldBehaviour::JudgeReleases`] matching a window list.
pub fn release_gates(windows: &[(f32, usize)], default: usize) -> Vec<Timegate> {
    symmetric_gates(windows, default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_presets_validate() {
        standard().validate().unwrap();
        osu_mania(0.0).validate().unwrap();
        osu_mania(8.0).validate().unwrap();
        osu_mania(10.0).validate().unwrap();
        wife(4).validate().unwrap();
        wife(7).validate().unwrap();
        standard_with_holds(HoldBehaviour::BreakComboOnly)
            .validate()
            .unwrap();
        standard_with_holds(HoldBehaviour::OnlyJudgeReleases)
            .validate()
            .unwrap();
    }

    #[test]
    fn osu_windows_scale_with_od() {
        let lenient = osu_mania(0.0);
        let strict = osu_mania(10.0);
        assert!(strict.miss_window < lenient.miss_window);
        // A 60ms hit is a 300 on OD0 but worse on OD10 (w300 = 34.5)
        assert_eq!(lenient.judge(Time(60.0)), 1);
        assert!(strict.judge(Time(60.0)) > 1);
    }

    #[test]
    fn standard_combo_break_flags() {
        let rs = standard();
        assert!(!rs.breaks_combo(0));
        assert!(!rs.breaks_combo(3));
        assert!(rs.breaks_combo(4));
        assert!(rs.breaks_combo(5));
    }
}
