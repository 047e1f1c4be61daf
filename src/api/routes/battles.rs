use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::analysis::DEFAULT_TOP_CARDS;
use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{AnalyzedBattle, BattleStats, CardCount};

/// Upper bound for `top_n` in most-used-cards requests.
const MAX_TOP_CARDS: usize = 100;

#[derive(Debug, Deserialize)]
pub struct PlayerRequest {
    pub player_tag: Option<String>,
    pub top_n: Option<usize>,
}

impl PlayerRequest {
    fn tag(&self) -> Result<&str, ApiError> {
        self.player_tag
            .as_deref()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .ok_or_else(|| ApiError::BadRequest("player_tag is required".to_string()))
    }
}

fn parse_body(body: Result<Json<PlayerRequest>, JsonRejection>) -> Result<PlayerRequest, ApiError> {
    body.map(|Json(req)| req)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

pub async fn battle_replay(
    State(state): State<AppState>,
    body: Result<Json<PlayerRequest>, JsonRejection>,
) -> Result<Json<Vec<AnalyzedBattle>>, ApiError> {
    let req = parse_body(body)?;
    let tag = req.tag()?;
    tracing::info!("Battle replay requested for {}", tag);

    let battles = state.battles.analyze_recent_battles(tag).await?;
    Ok(Json(battles))
}

pub async fn battle_stats(
    State(state): State<AppState>,
    body: Result<Json<PlayerRequest>, JsonRejection>,
) -> Result<Json<BattleStats>, ApiError> {
    let req = parse_body(body)?;
    let stats = state.battles.get_battle_stats(req.tag()?).await?;
    Ok(Json(stats))
}

pub async fn most_used_cards(
    State(state): State<AppState>,
    body: Result<Json<PlayerRequest>, JsonRejection>,
) -> Result<Json<Vec<CardCount>>, ApiError> {
    let req = parse_body(body)?;
    let top_n = req.top_n.unwrap_or(DEFAULT_TOP_CARDS).clamp(1, MAX_TOP_CARDS);
    let cards = state.battles.get_most_used_cards(req.tag()?, top_n).await?;
    Ok(Json(cards))
}
