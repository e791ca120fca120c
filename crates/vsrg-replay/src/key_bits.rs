use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-lane key state as a bit set: bit `k` set means lane `k` is pressed.
///
/// Sixteen bits cover every supported key mode (3..=10 lanes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBits(pub u16);

impl KeyBits {
    pub const EMPTY: KeyBits = KeyBits(0);

    pub fn single(lane: usize) -> Self {
        KeyBits(1 << lane)
    }

    pub fn has(self, lane: usize) -> bool {
        self.0 & (1 << lane) != 0
    }

    #[must_use]
    pub fn with(self, lane: usize) -> Self {
        KeyBits(self.0 | (1 << lane))
    }

    #[must_use]
    pub fn without(self, lane: usize) -> Self {
        KeyBits(self.0 & !(1 << lane))
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Lanes that are down in `self` but were not in `prev`.
    pub fn just_pressed(self, prev: KeyBits) -> KeyBits {
        KeyBits((self.0 ^ prev.0) & self.0)
    }

    /// Lanes that were down in `prev` but are not in `self`.
    pub fn just_released(self, prev: KeyBits) -> KeyBits {
        KeyBits((self.0 ^ prev.0) & prev.0)
    }

    pub fn union(self, other: KeyBits) -> KeyBits {
        KeyBits(self.0 | other.0)
    }

    /// Set lanes in ascending order.
    pub fn lanes(self) -> impl Iterator<Item = usize> {
        (0..16).filter(move |&k| self.has(k))
    }
}

impl fmt::Display for KeyBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010b}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_query() {
        let bits = KeyBits::EMPTY.with(0).with(3);
        assert!(bits.has(0));
        assert!(!bits.has(1));
        assert!(bits.has(3));
        assert_eq!(bits.count(), 2);
        assert!(bits.without(0).without(3).is_empty());
    }

    #[test]
    fn press_edges() {
        let prev = KeyBits::EMPTY.with(1);
        let now = KeyBits::EMPTY.with(1).with(2);
        assert_eq!(now.just_pressed(prev), KeyBits::single(2));
        assert_eq!(now.just_released(prev), KeyBits::EMPTY);
    }

    #[test]
    fn release_edges() {
        let prev = KeyBits::EMPTY.with(0).with(4);
        let now = KeyBits::EMPTY.with(4);
        assert_eq!(now.just_released(prev), KeyBits::single(0));
        assert_eq!(now.just_pressed(prev), KeyBits::EMPTY);
    }

    #[test]
    fn simultaneous_edges_both_directions() {
        let prev = KeyBits::EMPTY.with(0);
        let now = KeyBits::EMPTY.with(1);
        let pressed = now.just_pressed(prev);
        let released = now.just_released(prev);
        assert_eq!(pressed, KeyBits::single(1));
        assert_eq!(released, KeyBits::single(0));
        assert_eq!(pressed.union(released), KeyBits::EMPTY.with(0).with(1));
    }

    #[test]
    fn lanes_iterates_ascending() {
        let bits = KeyBits::EMPTY.with(7).with(2).with(0);
        assert_eq!(bits.lanes().collect::<Vec<_>>(), vec![0, 2, 7]);
    }
}
