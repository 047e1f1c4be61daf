//! Statistics calculation helpers.
//!
//! Pure counting and rate functions shared by the analyzers:
//! - Percentages with a zero-denominator guard
//! - Deck-based card usage rates
//! - First-seen-order tallies for deterministic tie-breaking

use std::collections::HashMap;
use std::hash::Hash;

use crate::models::DECK_SIZE;

/// `part / whole * 100`, or `0.0` when `whole` is zero.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Win rate as a percentage of games.
pub fn win_rate(wins: u32, games: u32) -> f64 {
    percentage(wins as f64, games as f64)
}

/// Usage rate of a card over a pool of cards drawn from whole decks.
///
/// The denominator is the number of decks, `total_cards / 8`.
pub fn usage_rate(count: u32, total_cards: usize) -> f64 {
    let decks = total_cards as f64 / DECK_SIZE as f64;
    percentage(count as f64, decks)
}

/// Mean of a sum over `n` items, `0.0` for no items.
pub fn average(sum: f64, n: usize) -> f64 {
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

/// A counter that remembers the order keys were first seen.
///
/// Ranking a tally sorts by count descending with a stable sort, so equal
/// counts keep first-seen order.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, u32)>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn get(&self, key: &K) -> u32 {
        self.index.get(key).map_or(0, |&i| self.entries[i].1)
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| *n as usize).sum()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, u32)> {
        self.entries.iter().map(|(k, n)| (k, *n))
    }

    /// Entries sorted by count descending, ties in first-seen order.
    pub fn ranked(self) -> Vec<(K, u32)> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

impl<K: Eq + Hash + Clone> Extend<K> for Tally<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.add(key);
        }
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tally = Self::new();
        tally.extend(iter);
        tally
    }
}
