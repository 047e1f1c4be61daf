use std::sync::Arc;

use crate::analysis::{BattleAnalyzer, CardAnalyzer};
use crate::client::RoyaleClient;

/// Shared handler state. All analyzers share one client, and so one pacing
/// state, across concurrent requests.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<RoyaleClient>,
    pub battles: Arc<BattleAnalyzer>,
    pub cards: Arc<CardAnalyzer>,
}

impl AppState {
    pub fn new(client: Arc<RoyaleClient>) -> Self {
        Self {
            battles: Arc::new(BattleAnalyzer::new(client.clone())),
            cards: Arc::new(CardAnalyzer::new(client.clone())),
            client,
        }
    }
}
