//! Population-level card statistics over a ranked player sample.
//!
//! Each operation fetches the ranking once and then one record per ranked
//! player, sequentially. A player whose fetch fails is skipped; only an empty
//! ranking or an empty overall sample is an error.

use std::sync::Arc;

use tracing::{info, warn};

use crate::calculate::{percentage, usage_rate, win_rate, Tally};
use crate::client::RoyaleClient;
use crate::models::{
    BattleOutcome, CardUsage, CardWinRate, DeckComposition, PopularDeck, RawBattle, Ranked,
    DECK_SIZE,
};

use super::AnalysisError;

/// Number of distinct decks returned by `get_popular_decks`.
pub const POPULAR_DECK_LIMIT: usize = 10;

/// Aggregates card and deck statistics across top players.
pub struct CardAnalyzer {
    client: Arc<RoyaleClient>,
}

impl CardAnalyzer {
    pub fn new(client: Arc<RoyaleClient>) -> Self {
        Self { client }
    }

    /// Usage rate of every card seen in the current decks of the top players.
    pub async fn get_card_usage(&self, num_players: u32) -> Result<Ranked<CardUsage>, AnalysisError> {
        info!("Fetching top {} players for card usage", num_players);
        let tags = self.top_player_tags(num_players).await?;
        let decks = self.collect_decks(&tags).await;

        let usage = card_usage(&decks).ok_or_else(|| {
            warn!("No card data collected");
            AnalysisError::NoCardData
        })?;

        info!("Analyzed {} unique cards", usage.len());
        Ok(usage)
    }

    /// The most common decks among the top players.
    pub async fn get_popular_decks(&self, num_players: u32) -> Result<Vec<PopularDeck>, AnalysisError> {
        info!("Fetching top {} players for popular decks", num_players);
        let tags = self.top_player_tags(num_players).await?;
        let decks = self.collect_decks(&tags).await;

        if decks.is_empty() {
            warn!("No deck data collected");
            return Err(AnalysisError::NoDeckData);
        }

        let popular = popular_decks(&decks, POPULAR_DECK_LIMIT);
        info!("Analyzed {} popular decks", popular.len());
        Ok(popular)
    }

    /// Win rate of every card the top players used in their recent battles.
    pub async fn get_card_win_rates(
        &self,
        num_players: u32,
    ) -> Result<Ranked<CardWinRate>, AnalysisError> {
        info!("Fetching top {} players for card win rates", num_players);
        let tags = self.top_player_tags(num_players).await?;

        let mut record = WinRateTally::default();
        for tag in &tags {
            info!("Fetching battle log for player {}", tag);
            match self.client.get_player_battles(tag).await {
                Some(battles) => record.extend(&battles),
                None => warn!("No battle log for player {}, skipping", tag),
            }
        }

        if record.is_empty() {
            warn!("No battle data collected");
            return Err(AnalysisError::NoBattlesCollected);
        }

        let rates = record.win_rates();
        info!("Analyzed win rates for {} cards", rates.len());
        Ok(rates)
    }

    async fn top_player_tags(&self, num_players: u32) -> Result<Vec<String>, AnalysisError> {
        let tags = self
            .client
            .get_global_top_players(num_players)
            .await
            .map(|ranking| ranking.tags())
            .unwrap_or_default();

        if tags.is_empty() {
            warn!("No top player data available");
            return Err(AnalysisError::NoTopPlayers);
        }

        info!("Found {} top players", tags.len());
        Ok(tags)
    }

    /// Current deck card names per player. Players without a full deck are
    /// skipped.
    async fn collect_decks(&self, tags: &[String]) -> Vec<Vec<String>> {
        let mut decks = Vec::with_capacity(tags.len());
        for tag in tags {
            info!("Fetching deck for player {}", tag);
            match self
                .client
                .get_player(tag)
                .await
                .and_then(|profile| profile.deck_names())
            {
                Some(deck) if is_full_deck(&deck) => decks.push(deck),
                Some(deck) => warn!(
                    "Deck for player {} has {} cards, expected {}; skipping",
                    tag,
                    deck.len(),
                    DECK_SIZE
                ),
                None => warn!("No deck data for player {}", tag),
            }
        }
        decks
    }
}

fn is_full_deck(deck: &[String]) -> bool {
    deck.len() == DECK_SIZE
}

/// Card usage over whole decks, `None` if the pool holds no cards.
///
/// Decks that are not exactly eight cards are ignored. Ordered by usage rate
/// descending, ties in first-seen order.
pub fn card_usage(decks: &[Vec<String>]) -> Option<Ranked<CardUsage>> {
    let tally: Tally<&str> = decks
        .iter()
        .filter(|deck| is_full_deck(deck))
        .flatten()
        .map(String::as_str)
        .collect();
    if tally.is_empty() {
        return None;
    }

    let total_cards = tally.total();
    let mut entries: Vec<(String, CardUsage)> = tally
        .iter()
        .map(|(name, count)| {
            let usage = CardUsage {
                count,
                usage_rate: usage_rate(count, total_cards),
            };
            (name.to_string(), usage)
        })
        .collect();
    entries.sort_by(|a, b| b.1.usage_rate.total_cmp(&a.1.usage_rate));

    Some(Ranked::new(entries))
}

/// Identical decks counted regardless of card order; top `limit` by count.
///
/// Decks that are not exactly eight cards are ignored.
pub fn popular_decks(decks: &[Vec<String>], limit: usize) -> Vec<PopularDeck> {
    let tally: Tally<DeckComposition> = decks
        .iter()
        .filter(|deck| is_full_deck(deck))
        .map(|deck| DeckComposition::new(deck.iter().cloned()))
        .collect();
    let total_decks = tally.total();

    tally
        .ranked()
        .into_iter()
        .take(limit)
        .map(|(deck, count)| PopularDeck {
            cards: deck.into_cards(),
            count,
            usage_rate: percentage(count as f64, total_decks as f64),
        })
        .collect()
}

/// Per-card wins and games over a set of battles.
///
/// Every card in the player's own deck gets a game; it also gets a win when
/// the player took strictly more crowns. Draws count as losses.
#[derive(Debug, Default)]
pub struct WinRateTally {
    games: Tally<String>,
    wins: Tally<String>,
}

impl WinRateTally {
    pub fn add_battle(&mut self, battle: &RawBattle) {
        let Some(team) = battle.team_side() else {
            return;
        };
        let won = battle.outcome() == BattleOutcome::Victory;

        for card in &team.cards {
            let name = card.name().to_string();
            if won {
                self.wins.add(name.clone());
            }
            self.games.add(name);
        }
    }

    pub fn extend(&mut self, battles: &[RawBattle]) {
        for battle in battles {
            self.add_battle(battle);
        }
    }

    /// True when no card has a recorded game.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Win rates ordered descending, ties in first-seen order.
    pub fn win_rates(&self) -> Ranked<CardWinRate> {
        let mut entries: Vec<(String, CardWinRate)> = self
            .games
            .iter()
            .map(|(name, games)| {
                let rate = CardWinRate {
                    win_rate: win_rate(self.wins.get(name), games),
                    total_games: games,
                };
                (name.clone(), rate)
            })
            .collect();
        entries.sort_by(|a, b| b.1.win_rate.total_cmp(&a.1.win_rate));
        Ranked::new(entries)
    }
}
