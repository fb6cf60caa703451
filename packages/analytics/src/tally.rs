//! Weighted counting with a stable top-K.

use std::collections::BTreeMap;

/// Ordered association of keys to accumulated weights.
///
/// Keys keep the position of their first insertion, so [`Self::top_k`]
/// breaks weight ties by first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightedTally {
    entries: Vec<(String, u64)>,
    positions: BTreeMap<String, usize>,
}

impl WeightedTally {
    /// Creates an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `weight` to `key`, inserting it at the end if new.
    pub fn add(&mut self, key: &str, weight: u64) {
        if let Some(&position) = self.positions.get(key) {
            self.entries[position].1 += weight;
        } else {
            self.positions.insert(key.to_string(), self.entries.len());
            self.entries.push((key.to_string(), weight));
        }
    }

    /// Accumulated weight of `key`, or 0.
    #[must_use]
    pub fn weight(&self, key: &str) -> u64 {
        self.positions
            .get(key)
            .map_or(0, |&position| self.entries[position].1)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no key has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `k` heaviest keys with their weights, heaviest first.
    #[must_use]
    pub fn top_k_with_counts(&self, k: usize) -> Vec<(String, u64)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(k);
        ranked
    }

    /// The `k` heaviest keys, heaviest first.
    #[must_use]
    pub fn top_k(&self, k: usize) -> Vec<String> {
        self.top_k_with_counts(k)
            .into_iter()
            .map(|(key, _)| key)
            .collect()
    }
}
