//! Derived population statistics.

use serde::{Deserialize, Serialize, Serializer};

/// Cards per deck.
pub const DECK_SIZE: usize = 8;

/// Usage of one card across sampled decks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardUsage {
    pub count: u32,
    /// Percentage of decks containing the card.
    pub usage_rate: f64,
}

/// Win rate of one card across sampled battles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardWinRate {
    pub win_rate: f64,
    pub total_games: u32,
}

/// A deck seen in the sample and how many players run it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopularDeck {
    pub cards: Vec<String>,
    pub count: u32,
    pub usage_rate: f64,
}

/// Order-independent identity of a deck: card names sorted and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeckComposition(Vec<String>);

impl DeckComposition {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self(names)
    }

    pub fn cards(&self) -> &[String] {
        &self.0
    }

    pub fn into_cards(self) -> Vec<String> {
        self.0
    }
}

/// A name-keyed mapping that keeps ranking order.
///
/// Serializes as a JSON object whose keys appear in rank order, so clients
/// reading the object in document order see the ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<V> {
    entries: Vec<(String, V)>,
}

impl<V> Ranked<V> {
    pub fn new(entries: Vec<(String, V)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<V> FromIterator<(String, V)> for Ranked<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<V: Serialize> Serialize for Ranked<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(key, value)| (key, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_composition_order_independent() {
        let a = DeckComposition::new(["Zap", "Golem", "Night Witch"]);
        let b = DeckComposition::new(["Night Witch", "Zap", "Golem"]);
        assert_eq!(a, b);
        assert_eq!(a.cards(), ["Golem", "Night Witch", "Zap"]);
    }

    #[test]
    fn test_deck_composition_dedups() {
        let deck = DeckComposition::new(["Zap", "Zap", "Log"]);
        assert_eq!(deck.into_cards(), vec!["Log".to_string(), "Zap".to_string()]);
    }

    #[test]
    fn test_ranked_lookup() {
        let ranked: Ranked<u32> = vec![("b".to_string(), 2), ("a".to_string(), 1)]
            .into_iter()
            .collect();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked.get("a"), Some(&1));
        assert_eq!(ranked.get("c"), None);
        assert_eq!(ranked.names().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_ranked_serializes_in_rank_order() {
        let ranked = Ranked::new(vec![
            ("Zap".to_string(), CardWinRate { win_rate: 75.0, total_games: 4 }),
            ("Arrows".to_string(), CardWinRate { win_rate: 50.0, total_games: 2 }),
        ]);
        let json = serde_json::to_string(&ranked).unwrap();
        assert_eq!(
            json,
            r#"{"Zap":{"win_rate":75.0,"total_games":4},"Arrows":{"win_rate":50.0,"total_games":2}}"#
        );
    }
}
