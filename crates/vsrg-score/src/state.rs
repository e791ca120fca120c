use serde::{Deserialize, Serialize};
use vsrg_model::Time;
use vsrg_rule::JudgementId;

/// Live scoring totals for one run.
///
/// Judgement counts are additionally split into early (delta < 0) and late
/// hits for result-screen statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreState {
    pub judgement_counts: Vec<u32>,
    pub early_counts: Vec<u32>,
    pub late_counts: Vec<u32>,

    pub points_scored: f64,
    pub max_points_scored: f64,

    pub current_combo: u32,
    pub best_combo: u32,
    pub combo_breaks: u32,
    /// Combo the run could still have if every remaining opportunity lands.
    pub max_possible_combo: u32,

    /// Presses that matched no note and were not absorbed.
    pub ghost_taps: u32,

    // Running delta statistics over non-missed hits
    delta_sum: f64,
    delta_sum_sq: f64,
    delta_count: u32,
}

impl ScoreState {
    pub fn new(judgement_count: usize) -> Self {
        ScoreState {
            judgement_counts: vec![0; judgement_count],
            early_counts: vec![0; judgement_count],
            late_counts: vec![0; judgement_count],
            points_scored: 0.0,
            max_points_scored: 0.0,
            current_combo: 0,
            best_combo: 0,
            combo_breaks: 0,
            max_possible_combo: 0,
            ghost_taps: 0,
            delta_sum: 0.0,
            delta_sum_sq: 0.0,
            delta_count: 0,
        }
    }

    /// Points ratio in `[0, 1]`; an empty run counts as perfect rather than
    /// dividing by zero.
    pub fn accuracy(&self) -> f64 {
        if self.max_points_scored == 0.0 {
            1.0
        } else {
            (self.points_scored / self.max_points_scored).clamp(0.0, 1.0)
        }
    }

    pub fn add_judgement(&mut self, judgement: JudgementId, delta: Time) {
        self.judgement_counts[judgement] += 1;
        if delta < Time::ZERO {
            self.early_counts[judgement] += 1;
        } else {
            self.late_counts[judgement] += 1;
        }
    }

    pub fn add_delta_sample(&mut self, delta: Time) {
        let ms = f64::from(delta.as_ms());
        self.delta_sum += ms;
        self.delta_sum_sq += ms * ms;
        self.delta_count += 1;
    }

    /// Mean of recorded non-miss deltas, in milliseconds.
    pub fn mean_delta(&self) -> Option<f64> {
        (self.delta_count > 0).then(|| self.delta_sum / f64::from(self.delta_count))
    }

    /// Population standard deviation of recorded non-miss deltas.
    pub fn stdev_delta(&self) -> Option<f64> {
        (self.delta_count > 0).then(|| {
            let n = f64::from(self.delta_count);
            let mean = self.delta_sum / n;
            (self.delta_sum_sq / n - mean * mean).max(0.0).sqrt()
        })
    }

    pub fn total_judgements(&self) -> u32 {
        self.judgement_counts.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_is_one_on_empty_run() {
        let state = ScoreState::new(6);
        assert_eq!(state.accuracy(), 1.0);
    }

    #[test]
    fn accuracy_is_points_ratio() {
        let mut state = ScoreState::new(6);
        state.points_scored = 9.0;
        state.max_points_scored = 10.0;
        assert!((state.accuracy() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn accuracy_clamps_negative_points() {
        let mut state = ScoreState::new(6);
        state.points_scored = -5.0;
        state.max_points_scored = 10.0;
        assert_eq!(state.accuracy(), 0.0);
    }

    #[test]
    fn early_late_split() {
        let mut state = ScoreState::new(6);
        state.add_judgement(0, Time(-5.0));
        state.add_judgement(0, Time(5.0));
        state.add_judgement(1, Time(0.0));
        assert_eq!(state.judgement_counts[0], 2);
        assert_eq!(state.early_counts[0], 1);
        assert_eq!(state.late_counts[0], 1);
        // Zero delta counts as late
        assert_eq!(state.late_counts[1], 1);
        assert_eq!(state.total_judgements(), 3);
    }

    #[test]
    fn delta_statistics() {
        let mut state = ScoreState::new(6);
        assert_eq!(state.mean_delta(), None);
        for ms in [-10.0, 0.0, 10.0] {
            state.add_delta_sample(Time(ms));
        }
        assert!((state.mean_delta().unwrap()).abs() < 1e-9);
        let sd = state.stdev_delta().unwrap();
        assert!((sd - (200.0f64 / 3.0).sqrt()).abs() < 1e-9);
    }
}
