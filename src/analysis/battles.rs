//! Per-player battle log interpretation.

use std::sync::Arc;

use tracing::{info, warn};

use crate::calculate::{average, percentage, Tally};
use crate::client::RoyaleClient;
use crate::models::{
    AnalyzedBattle, BattleOutcome, BattleStats, CardCount, DeckCard, RawBattle, UNKNOWN,
};

use super::AnalysisError;

/// Cards returned by `get_most_used_cards` when no count is given.
pub const DEFAULT_TOP_CARDS: usize = 8;

/// Analyzes one player's recent battles.
pub struct BattleAnalyzer {
    client: Arc<RoyaleClient>,
}

impl BattleAnalyzer {
    pub fn new(client: Arc<RoyaleClient>) -> Self {
        Self { client }
    }

    /// Normalize the player's battle log, most recent first.
    pub async fn analyze_recent_battles(
        &self,
        player_tag: &str,
    ) -> Result<Vec<AnalyzedBattle>, AnalysisError> {
        info!("Analyzing battle log for player {}", player_tag);

        let battles = match self.client.get_player_battles(player_tag).await {
            Some(battles) if !battles.is_empty() => battles,
            _ => {
                warn!("No battle data for player {}", player_tag);
                return Err(AnalysisError::NoBattleData);
            }
        };

        Ok(battles.iter().map(analyze_battle).collect())
    }

    pub async fn get_battle_stats(&self, player_tag: &str) -> Result<BattleStats, AnalysisError> {
        let battles = self.analyze_recent_battles(player_tag).await?;
        Ok(battle_stats(&battles))
    }

    pub async fn get_most_used_cards(
        &self,
        player_tag: &str,
        top_n: usize,
    ) -> Result<Vec<CardCount>, AnalysisError> {
        let battles = self.analyze_recent_battles(player_tag).await?;
        Ok(most_used_cards(&battles, top_n))
    }
}

/// Normalize one raw battle. Missing fields fall back to defaults.
pub fn analyze_battle(battle: &RawBattle) -> AnalyzedBattle {
    let team = battle.team_side().cloned().unwrap_or_default();
    let opponent = battle.opponent_side().cloned().unwrap_or_default();

    AnalyzedBattle {
        battle_time: battle.battle_time.clone(),
        game_mode: name_or_unknown(&battle.game_mode.name),
        arena: name_or_unknown(&battle.arena.name),
        result: BattleOutcome::from_crowns(team.crowns, opponent.crowns),
        crowns_earned: team.crowns,
        crowns_lost: opponent.crowns,
        trophy_change: team.trophy_change,
        player_deck: team.cards.iter().map(DeckCard::from).collect(),
        opponent_deck: opponent.cards.iter().map(DeckCard::from).collect(),
    }
}

fn name_or_unknown(name: &Option<String>) -> String {
    name.clone().unwrap_or_else(|| UNKNOWN.to_string())
}

/// Summary numbers over a set of analyzed battles.
pub fn battle_stats(battles: &[AnalyzedBattle]) -> BattleStats {
    let total = battles.len();
    let count = |outcome: BattleOutcome| battles.iter().filter(|b| b.result == outcome).count();
    let victories = count(BattleOutcome::Victory);
    let defeats = count(BattleOutcome::Defeat);

    let crowns_earned: u64 = battles.iter().map(|b| b.crowns_earned as u64).sum();
    let crowns_lost: u64 = battles.iter().map(|b| b.crowns_lost as u64).sum();

    BattleStats {
        total_battles: total as u32,
        victories: victories as u32,
        defeats: defeats as u32,
        draws: (total - victories - defeats) as u32,
        win_rate: percentage(victories as f64, total as f64),
        average_crowns_earned: average(crowns_earned as f64, total),
        average_crowns_lost: average(crowns_lost as f64, total),
        total_trophy_change: battles.iter().map(|b| b.trophy_change as i64).sum(),
    }
}

/// Most frequent cards in the player's own decks, ties in first-seen order.
pub fn most_used_cards(battles: &[AnalyzedBattle], top_n: usize) -> Vec<CardCount> {
    let tally: Tally<&str> = battles
        .iter()
        .flat_map(|b| b.player_deck.iter().map(|c| c.name.as_str()))
        .collect();

    tally
        .ranked()
        .into_iter()
        .take(top_n)
        .map(|(name, usage_count)| CardCount {
            name: name.to_string(),
            usage_count,
        })
        .collect()
}
