//! Analytics over upstream data.
//!
//! - **battles**: one player's battle log (outcomes, stats, most-used cards)
//! - **cards**: card usage, popular decks and card win rates across top players
//!
//! Analyzers hold no state between calls; every call fetches fresh data.

pub mod battles;
pub mod cards;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use battles::{BattleAnalyzer, DEFAULT_TOP_CARDS};
pub use cards::{CardAnalyzer, POPULAR_DECK_LIMIT};

/// Why an analysis produced no result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("No battle data available")]
    NoBattleData,

    #[error("No top player data available")]
    NoTopPlayers,

    #[error("No card data collected")]
    NoCardData,

    #[error("No deck data collected")]
    NoDeckData,

    #[error("No battle data collected")]
    NoBattlesCollected,
}

impl AnalysisError {
    pub fn to_payload(&self) -> ErrorPayload {
        ErrorPayload::new(self.to_string())
    }
}

/// `{"error": "<message>"}` body returned in place of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
}

impl ErrorPayload {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_payload_shape() {
        let json = serde_json::to_value(AnalysisError::NoTopPlayers.to_payload()).unwrap();
        assert_eq!(json, serde_json::json!({"error": "No top player data available"}));
    }
}
