//! Battle log records, raw and analyzed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient::{self, or_default};

/// Placeholder for names the upstream record does not carry.
pub const UNKNOWN: &str = "Unknown";

/// A `{ "name": ... }` reference such as `gameMode` or `arena`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedRef {
    #[serde(default, deserialize_with = "or_default")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IconUrls {
    #[serde(default, deserialize_with = "or_default")]
    pub medium: Option<String>,
}

/// A card as it appears in a battle side or a player's current deck.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCard {
    #[serde(default, deserialize_with = "or_default")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub level: u32,
    #[serde(default, deserialize_with = "or_default")]
    pub max_level: u32,
    #[serde(default, deserialize_with = "or_default")]
    pub icon_urls: IconUrls,
}

impl RawCard {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN)
    }
}

/// One side of a battle. Only the first element of `team`/`opponent` is used.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParticipant {
    #[serde(default, deserialize_with = "or_default")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub crowns: u32,
    #[serde(default, deserialize_with = "or_default")]
    pub trophy_change: i32,
    #[serde(default, deserialize_with = "or_default")]
    pub cards: Vec<RawCard>,
}

/// An unmodified battle log entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBattle {
    #[serde(default, deserialize_with = "or_default")]
    pub battle_time: Option<String>,
    #[serde(default, deserialize_with = "or_default")]
    pub game_mode: NamedRef,
    #[serde(default, deserialize_with = "or_default")]
    pub arena: NamedRef,
    #[serde(default, deserialize_with = "or_default")]
    pub team: Vec<RawParticipant>,
    #[serde(default, deserialize_with = "or_default")]
    pub opponent: Vec<RawParticipant>,
}

impl RawBattle {
    /// Decode a battle log response. Returns `None` unless the body is an array.
    pub fn parse_log(value: Value) -> Option<Vec<RawBattle>> {
        match value {
            Value::Array(items) => Some(items.into_iter().map(lenient::record).collect()),
            _ => None,
        }
    }

    /// The player's side. An empty `team` reads as a side with all defaults.
    pub fn team_side(&self) -> Option<&RawParticipant> {
        self.team.first()
    }

    pub fn opponent_side(&self) -> Option<&RawParticipant> {
        self.opponent.first()
    }

    pub fn team_crowns(&self) -> u32 {
        self.team_side().map_or(0, |p| p.crowns)
    }

    pub fn opponent_crowns(&self) -> u32 {
        self.opponent_side().map_or(0, |p| p.crowns)
    }

    pub fn outcome(&self) -> BattleOutcome {
        BattleOutcome::from_crowns(self.team_crowns(), self.opponent_crowns())
    }
}

/// Battle result from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Draw,
}

impl BattleOutcome {
    pub fn from_crowns(earned: u32, lost: u32) -> Self {
        match earned.cmp(&lost) {
            std::cmp::Ordering::Greater => BattleOutcome::Victory,
            std::cmp::Ordering::Less => BattleOutcome::Defeat,
            std::cmp::Ordering::Equal => BattleOutcome::Draw,
        }
    }
}

impl std::fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BattleOutcome::Victory => write!(f, "Victory"),
            BattleOutcome::Defeat => write!(f, "Defeat"),
            BattleOutcome::Draw => write!(f, "Draw"),
        }
    }
}

/// Card descriptor inside an analyzed deck snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckCard {
    pub name: String,
    pub level: u32,
    pub max_level: u32,
    pub icon_url: String,
}

impl From<&RawCard> for DeckCard {
    fn from(card: &RawCard) -> Self {
        Self {
            name: card.name().to_string(),
            level: card.level,
            max_level: card.max_level,
            icon_url: card.icon_urls.medium.clone().unwrap_or_default(),
        }
    }
}

/// A battle normalized for display and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedBattle {
    pub battle_time: Option<String>,
    pub game_mode: String,
    pub arena: String,
    pub result: BattleOutcome,
    pub crowns_earned: u32,
    pub crowns_lost: u32,
    pub trophy_change: i32,
    pub player_deck: Vec<DeckCard>,
    pub opponent_deck: Vec<DeckCard>,
}

/// Aggregate numbers over one player's recent battles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BattleStats {
    pub total_battles: u32,
    pub victories: u32,
    pub defeats: u32,
    pub draws: u32,
    pub win_rate: f64,
    pub average_crowns_earned: f64,
    pub average_crowns_lost: f64,
    pub total_trophy_change: i64,
}

/// How often a card appeared in a player's own decks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCount {
    pub name: String,
    pub usage_count: u32,
}
