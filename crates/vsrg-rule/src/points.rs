use serde::{Deserialize, Serialize};
use vsrg_model::Time;

use crate::JudgementId;

/// How a resolved hit converts into points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointsSpec {
    /// Fixed per-judgement weights, normalised by `max_weight`.
    Weights { max_weight: f64, weights: Vec<f64> },
    /// Continuous curve over the timing delta, parameterised by a judge
    /// difficulty integer (harder judges narrow the curve).
    WifeCurve { judge: i32 },
}

impl PointsSpec {
    pub fn points(&self, delta: Time, judgement: JudgementId) -> f64 {
        match self {
            PointsSpec::Weights { max_weight, weights } => {
                weights.get(judgement).copied().unwrap_or(0.0) / max_weight
            }
            PointsSpec::WifeCurve { judge } => f64::from(wife_curve(*judge, delta)),
        }
    }
}

/// Abramowitz & Stegun 7.1.26 rational approximation, max error ~1.5e-7.
fn erf(x: f32) -> f32 {
    const A1: f32 = 0.254829592;
    const A2: f32 = -0.284496736;
    const A3: f32 = 1.421413741;
    const A4: f32 = -1.453152027;
    const A5: f32 = 1.061405429;
    const P: f32 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

/// The continuous "wife" scoring curve.
///
/// Full credit inside a tiny ridiculous window, an erf falloff to zero, then
/// a linear descent into the miss weight. Narrower at higher `judge`.
pub fn wife_curve(judge: i32, delta: Time) -> f32 {
    const MISS_WEIGHT: f32 = -2.75;
    const TS_POW: f32 = 0.75;

    let scale = (10.0 - judge as f32) / 6.0;
    let ridiculous = 5.0 * scale;
    let boo_window = 180.0 * scale;
    let zero = 65.0 * scale.powf(TS_POW);
    let dev = 22.7 * scale.powf(TS_POW);

    let delta = delta.as_ms().abs();
    if delta <= ridiculous {
        1.0
    } else if delta <= zero {
        erf((zero - delta) / dev)
    } else if delta <= boo_window {
        (delta - zero) * MISS_WEIGHT / (boo_window - zero)
    } else {
        MISS_WEIGHT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_normalise_by_max() {
        let spec = PointsSpec::Weights {
            max_weight: 10.0,
            weights: vec![10.0, 9.0, 5.0, 1.0, 0.0, 0.0],
        };
        assert_eq!(spec.points(Time::ZERO, 0), 1.0);
        assert_eq!(spec.points(Time::ZERO, 1), 0.9);
        assert_eq!(spec.points(Time::ZERO, 5), 0.0);
        // Out-of-range judgement scores nothing
        assert_eq!(spec.points(Time::ZERO, 6), 0.0);
    }

    #[test]
    fn erf_reference_values() {
        assert!((erf(0.0)).abs() < 1e-6);
        assert!((erf(1.0) - 0.8427).abs() < 1e-3);
        assert!((erf(-1.0) + 0.8427).abs() < 1e-3);
        assert!((erf(3.0) - 0.99998).abs() < 1e-4);
    }

    #[test]
    fn wife_curve_full_credit_at_zero() {
        for judge in 4..=9 {
            assert_eq!(wife_curve(judge, Time::ZERO), 1.0);
        }
    }

    #[test]
    fn wife_curve_monotone_decreasing() {
        let judge = 4;
        let mut prev = wife_curve(judge, Time::ZERO);
        for ms in 1..200 {
            let v = wife_curve(judge, Time(ms as f32));
            assert!(v <= prev + 1e-6, "curve rose at {ms}ms");
            prev = v;
        }
    }

    #[test]
    fn wife_curve_symmetric_in_delta_sign() {
        assert_eq!(wife_curve(4, Time(40.0)), wife_curve(4, Time(-40.0)));
    }

    #[test]
    fn wife_curve_bottoms_out_at_miss_weight() {
        assert_eq!(wife_curve(4, Time(500.0)), -2.75);
    }

    #[test]
    fn harder_judges_score_less_at_same_delta() {
        let d = Time(40.0);
        assert!(wife_curve(7, d) < wife_curve(4, d));
    }

    #[test]
    fn serde_round_trip() {
        let spec = PointsSpec::WifeCurve { judge: 4 };
        let json = serde_json::to_string(&spec).unwrap();
        let back: PointsSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
    }
}
