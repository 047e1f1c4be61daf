//! Player profile and ranking records.

use serde::Deserialize;

use super::battle::RawCard;
use super::lenient::or_default;

/// `GET /players/{tag}` response, reduced to the fields the analyzers read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    #[serde(default, deserialize_with = "or_default")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub trophies: u32,
    /// `None` when the profile carries no usable deck.
    #[serde(default, deserialize_with = "or_default")]
    pub current_deck: Option<Vec<RawCard>>,
}

impl PlayerProfile {
    /// Card names of the current deck, in upstream order.
    pub fn deck_names(&self) -> Option<Vec<String>> {
        self.current_deck
            .as_ref()
            .map(|cards| cards.iter().map(|c| c.name().to_string()).collect())
    }
}

/// One row of a location ranking. Only the tag is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankedPlayer {
    #[serde(default, deserialize_with = "or_default")]
    pub tag: Option<String>,
}

/// `GET /locations/{id}/rankings/players` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerRanking {
    #[serde(default, deserialize_with = "or_default")]
    pub items: Vec<RankedPlayer>,
}

impl PlayerRanking {
    /// Tags of ranked players in ranking order. Rows without a tag are dropped.
    pub fn tags(&self) -> Vec<String> {
        self.items.iter().filter_map(|p| p.tag.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_deck_names() {
        let profile: PlayerProfile = serde_json::from_value(json!({
            "tag": "#ABC",
            "name": "Someone",
            "trophies": 9000,
            "currentDeck": [{"name": "Zap"}, {"name": "Golem"}]
        }))
        .unwrap();

        assert_eq!(profile.trophies, 9000);
        assert_eq!(
            profile.deck_names().unwrap(),
            vec!["Zap".to_string(), "Golem".to_string()]
        );
    }

    #[test]
    fn test_profile_without_deck() {
        let profile: PlayerProfile = serde_json::from_value(json!({"tag": "#ABC"})).unwrap();
        assert!(profile.deck_names().is_none());

        let profile: PlayerProfile =
            serde_json::from_value(json!({"currentDeck": "not a list"})).unwrap();
        assert!(profile.deck_names().is_none());
    }

    #[test]
    fn test_ranking_tags_skip_untagged_rows() {
        let ranking: PlayerRanking = serde_json::from_value(json!({
            "items": [
                {"tag": "#A", "rank": 1},
                {"name": "no tag", "rank": 2},
                {"tag": "#C", "rank": 3}
            ],
            "paging": {"cursors": {}}
        }))
        .unwrap();

        assert_eq!(ranking.items.len(), 3);
        assert_eq!(ranking.tags(), vec!["#A".to_string(), "#C".to_string()]);
    }

    #[test]
    fn test_ranking_ignores_other_row_fields() {
        let ranking: PlayerRanking = serde_json::from_value(json!({
            "items": [{"tag": "#A", "rank": "first", "trophies": null, "clan": {"tag": "#C"}}]
        }))
        .unwrap();

        assert_eq!(ranking.tags(), vec!["#A".to_string()]);
    }

    #[test]
    fn test_ranking_missing_items() {
        let ranking: PlayerRanking = serde_json::from_value(json!({})).unwrap();
        assert!(ranking.items.is_empty());
    }
}
