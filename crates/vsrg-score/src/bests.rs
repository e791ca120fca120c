use serde::{Deserialize, Serialize};
use tracing::debug;

/// How a new attempt compares against the existing frontier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Improvement<V> {
    /// First entry ever recorded.
    New,
    /// Strictly dominates a prior entry on both axes.
    FasterBetter(f32, V),
    /// An existing value is now achieved at a higher rate.
    Faster(f32),
    /// A higher value at an existing (or slower-than-everything) rate.
    Better(V),
    /// The frontier absorbed the attempt without improving.
    None,
}

/// The Pareto frontier of `(value, rate)` attempts, both axes
/// bigger-is-better.
///
/// Entries are kept sorted by rate descending; values are then strictly
/// increasing down the list, so the tail entry holds the best value overall
/// and the head entry the highest rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonalBests<V> {
    entries: Vec<(V, f32)>,
}

impl<V> Default for PersonalBests<V> {
    fn default() -> Self {
        PersonalBests {
            entries: Vec::new(),
        }
    }
}

impl<V: PartialOrd + Copy + std::ops::Sub<Output = V>> PersonalBests<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(value: V, rate: f32) -> Self {
        PersonalBests {
            entries: vec![(value, rate)],
        }
    }

    /// `(value, rate)` pairs, rate descending.
    pub fn entries(&self) -> &[(V, f32)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold a new attempt into the frontier and classify it.
    pub fn update(&mut self, value: V, rate: f32) -> Improvement<V> {
        if self.entries.is_empty() {
            self.entries.push((value, rate));
            return Improvement::New;
        }

        let mut i = 0;
        while i < self.entries.len() && self.entries[i].1 > rate {
            i += 1;
        }

        // Same-rate entry: replace if strictly better.
        if i < self.entries.len() && self.entries[i].1 == rate {
            if value > self.entries[i].0 {
                let old = self.entries[i].0;
                self.entries[i].0 = value;
                self.drop_dominated_after(i, value);
                return Improvement::Better(value - old);
            }
            return Improvement::None;
        }

        // A faster entry with at least this value dominates the attempt.
        if i > 0 && self.entries[i - 1].0 >= value {
            return Improvement::None;
        }

        // Slower entries with values not above ours are dominated; they are
        // contiguous here because values increase down the list.
        let mut dominated_best: Option<(V, f32)> = None;
        while i < self.entries.len() && self.entries[i].0 <= value {
            let (v, r) = self.entries.remove(i);
            // The fastest dominated entry: the first removed
            let rate_of_first = dominated_best.map_or(r, |(_, fr)| fr);
            dominated_best = Some((v, rate_of_first));
        }
        self.entries.insert(i, (value, rate));

        match dominated_best {
            Some((best_value, fastest_rate)) => {
                if value > best_value {
                    Improvement::FasterBetter(rate - fastest_rate, value - best_value)
                } else {
                    Improvement::Faster(rate - fastest_rate)
                }
            }
            None => {
                if i == self.entries.len() - 1 {
                    // Appended past the old tail: a new best value outright
                    Improvement::Better(value - self.entries[i - 1].0)
                } else {
                    // A new fastest-but-lowest-value frontier point
                    Improvement::None
                }
            }
        }
    }

    fn drop_dominated_after(&mut self, index: usize, value: V) {
        while index + 1 < self.entries.len() && self.entries[index + 1].0 <= value {
            self.entries.remove(index + 1);
        }
    }

    /// Greatest value achieved at any rate at least `min_rate`.
    pub fn best_at_or_above(&self, min_rate: f32) -> Option<V> {
        let mut best = None;
        for &(v, r) in &self.entries {
            if r < min_rate {
                break;
            }
            best = Some(v);
        }
        best
    }
}

/// The legacy two-field shape: only the best-value and highest-rate attempts
/// were kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacyBests<V> {
    pub best: (V, f32),
    pub fastest: (V, f32),
}

impl<V: PartialOrd + Copy + std::ops::Sub<Output = V> + std::fmt::Debug> PersonalBests<V> {
    /// Migrate a legacy record by replaying its two points through `update`.
    pub fn from_legacy(legacy: LegacyBests<V>) -> Self {
        debug!(?legacy.best, ?legacy.fastest, "migrating legacy personal bests");
        let mut bests = Self::new();
        bests.update(legacy.best.0, legacy.best.1);
        bests.update(legacy.fastest.0, legacy.fastest.1);
        bests
    }
}
