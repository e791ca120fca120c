use serde::{Deserialize, Serialize};
use vsrg_rule::HealthConfig;

/// Health accumulator over `[0, 1]`.
///
/// `has_failed` is sticky; `currently_failed` tracks the live value so that
/// `only_fail_at_end` rulesets can recover before the chart ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthBar {
    value: f32,
    clear_threshold: f32,
    only_fail_at_end: bool,
    has_failed: bool,
}

impl HealthBar {
    pub fn new(config: &HealthConfig) -> Self {
        HealthBar {
            value: config.start.clamp(0.0, 1.0),
            clear_threshold: config.clear_threshold,
            only_fail_at_end: config.only_fail_at_end,
            has_failed: false,
        }
    }

    pub fn apply_delta(&mut self, delta: f32) {
        self.value = (self.value + delta).clamp(0.0, 1.0);
        if self.currently_failed() {
            self.has_failed = true;
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn currently_failed(&self) -> bool {
        self.value <= self.clear_threshold
    }

    pub fn has_failed(&self) -> bool {
        self.has_failed
    }

    pub fn failed(&self) -> bool {
        if self.only_fail_at_end {
            self.currently_failed()
        } else {
            self.has_failed
        }
    }
}
