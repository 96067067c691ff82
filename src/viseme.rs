//! Viseme catalogue: channel names, categories and dominance priorities.
//!
//! Channels follow the Oculus ordering used by the inference engines this
//! crate is fed from: `sil PP FF TH DD kk CH SS nn RR aa E ih oh ou`.

use crate::error::{LipcookError, Result};
use std::collections::BTreeMap;

/// Number of viseme channels in a frame.
pub const VISEME_COUNT: usize = 15;

/// Channel names, indexed by channel.
pub const VISEME_NAMES: [&str; VISEME_COUNT] = [
    "sil", "PP", "FF", "TH", "DD", "kk", "CH", "SS", "nn", "RR", "aa", "E", "ih", "oh", "ou",
];

/// Broad articulation class of a viseme channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisemeCategory {
    Vowel,
    Consonant,
    Other,
}

use VisemeCategory::{Consonant, Other, Vowel};

const CATEGORIES: [VisemeCategory; VISEME_COUNT] = [
    Other, Consonant, Consonant, Consonant, Consonant, Consonant, Consonant, Consonant, Consonant,
    Consonant, Vowel, Vowel, Vowel, Vowel, Vowel,
];

/// Category of `channel`. Channels outside the catalogue are `Other`.
pub fn category(channel: usize) -> VisemeCategory {
    CATEGORIES.get(channel).copied().unwrap_or(Other)
}

/// Channel index for a viseme name (case-sensitive, `E` and `ih` differ).
pub fn index_of(name: &str) -> Option<usize> {
    VISEME_NAMES.iter().position(|n| *n == name)
}

/// Name of `channel`, if it is in the catalogue.
pub fn name_of(channel: usize) -> Option<&'static str> {
    VISEME_NAMES.get(channel).copied()
}

/// Priority used for channels with no explicit entry.
pub const DEFAULT_PRIORITY: f32 = 1.0;

/// Priorities favour open vowels and strong, visible consonants.
const DEFAULT_PRIORITIES: [(usize, f32); 14] = [
    (10, 1.0), // aa
    (11, 0.6), // E
    (12, 0.5), // ih
    (13, 0.9), // oh
    (14, 1.0), // ou
    (1, 0.9),  // PP
    (2, 0.7),  // FF
    (3, 0.6),  // TH
    (4, 0.7),  // DD
    (5, 0.7),  // kk
    (6, 0.8),  // CH
    (7, 0.6),  // SS
    (8, 0.7),  // nn
    (9, 0.9),  // RR
];

/// Per-channel weights used when picking a block's dominant viseme.
///
/// Immutable once built; a cook run borrows it for its whole lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorityTable {
    weights: BTreeMap<usize, f32>,
}

impl PriorityTable {
    /// Table with no entries: every channel weighs [`DEFAULT_PRIORITY`].
    pub fn uniform() -> Self {
        Self {
            weights: BTreeMap::new(),
        }
    }

    /// Return a copy with `channel` weighted by `weight`.
    pub fn with_weight(mut self, channel: usize, weight: f32) -> Self {
        self.weights.insert(channel, weight);
        self
    }

    /// Apply overrides keyed by viseme name.
    ///
    /// Unknown names and negative or non-finite weights are rejected.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, f32>) -> Result<Self> {
        for (name, &weight) in overrides {
            let channel = index_of(name).ok_or_else(|| LipcookError::ConfigInvalidValue {
                key: format!("priorities.{}", name),
                message: "unknown viseme name".to_string(),
            })?;
            if !weight.is_finite() || weight < 0.0 {
                return Err(LipcookError::ConfigInvalidValue {
                    key: format!("priorities.{}", name),
                    message: format!("weight must be a finite value >= 0, got {}", weight),
                });
            }
            self.weights.insert(channel, weight);
        }
        Ok(self)
    }

    /// Weight of `channel`.
    pub fn weight(&self, channel: usize) -> f32 {
        self.weights
            .get(&channel)
            .copied()
            .unwrap_or(DEFAULT_PRIORITY)
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self {
            weights: DEFAULT_PRIORITIES.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_catalogue() {
        assert_eq!(category(0), VisemeCategory::Other);
        for channel in 1..=9 {
            assert_eq!(category(channel), VisemeCategory::Consonant, "{}", channel);
        }
        for channel in 10..=14 {
            assert_eq!(category(channel), VisemeCategory::Vowel, "{}", channel);
        }
        assert_eq!(category(15), VisemeCategory::Other);
        assert_eq!(category(usize::MAX), VisemeCategory::Other);
    }

    #[test]
    fn names_round_trip_to_indices() {
        for (i, name) in VISEME_NAMES.iter().enumerate() {
            assert_eq!(index_of(name), Some(i));
            assert_eq!(name_of(i), Some(*name));
        }
        assert_eq!(index_of("zz"), None);
        assert_eq!(name_of(VISEME_COUNT), None);
    }

    #[test]
    fn default_priorities_favour_open_vowels() {
        let table = PriorityTable::default();
        assert_eq!(table.weight(10), 1.0);
        assert_eq!(table.weight(14), 1.0);
        assert_eq!(table.weight(12), 0.5);
        assert_eq!(table.weight(7), 0.6);
        // sil has no entry
        assert_eq!(table.weight(0), DEFAULT_PRIORITY);
    }

    #[test]
    fn uniform_table_weighs_everything_equally() {
        let table = PriorityTable::uniform();
        for channel in 0..VISEME_COUNT {
            assert_eq!(table.weight(channel), DEFAULT_PRIORITY);
        }
    }

    #[test]
    fn overrides_replace_by_name() {
        let mut overrides = BTreeMap::new();
        overrides.insert("ih".to_string(), 0.8);
        overrides.insert("sil".to_string(), 0.0);

        let table = PriorityTable::default().with_overrides(&overrides).unwrap();
        assert_eq!(table.weight(12), 0.8);
        assert_eq!(table.weight(0), 0.0);
        assert_eq!(table.weight(10), 1.0);
    }

    #[test]
    fn overrides_reject_unknown_names() {
        let mut overrides = BTreeMap::new();
        overrides.insert("xx".to_string(), 1.0);

        match PriorityTable::default().with_overrides(&overrides) {
            Err(LipcookError::ConfigInvalidValue { key, .. }) => {
                assert_eq!(key, "priorities.xx");
            }
            other => panic!("Expected ConfigInvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn overrides_reject_negative_weights() {
        let mut overrides = BTreeMap::new();
        overrides.insert("aa".to_string(), -0.5);
        assert!(PriorityTable::default().with_overrides(&overrides).is_err());
    }
}
