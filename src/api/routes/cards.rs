use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::client::DEFAULT_RANKING_LIMIT;
use crate::models::{CardUsage, CardWinRate, PopularDeck, Ranked};

/// Largest ranking sample a request may ask for.
const MAX_SAMPLE_PLAYERS: u32 = 1000;

#[derive(Debug, Default, Deserialize)]
pub struct SampleParams {
    pub players: Option<u32>,
}

impl SampleParams {
    pub fn num_players(&self) -> u32 {
        self.players
            .unwrap_or(DEFAULT_RANKING_LIMIT)
            .clamp(1, MAX_SAMPLE_PLAYERS)
    }
}

pub async fn card_usage(
    State(state): State<AppState>,
    Query(params): Query<SampleParams>,
) -> Result<Json<Ranked<CardUsage>>, ApiError> {
    let usage = state.cards.get_card_usage(params.num_players()).await?;
    Ok(Json(usage))
}

pub async fn popular_decks(
    State(state): State<AppState>,
    Query(params): Query<SampleParams>,
) -> Result<Json<Vec<PopularDeck>>, ApiError> {
    let decks = state.cards.get_popular_decks(params.num_players()).await?;
    Ok(Json(decks))
}

pub async fn card_win_rates(
    State(state): State<AppState>,
    Query(params): Query<SampleParams>,
) -> Result<Json<Ranked<CardWinRate>>, ApiError> {
    let rates = state.cards.get_card_win_rates(params.num_players()).await?;
    Ok(Json(rates))
}

/// Upstream card catalog, passed through unchanged.
pub async fn card_catalog(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state
        .client
        .get_cards()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No card catalog available".to_string()))
}
