//! Rate-limited Clash Royale API client.
//!
//! Every upstream call goes through [`RoyaleClient::request`], which paces the
//! call with the shared [`RateLimiter`] and collapses any failure (transport
//! error, non-2xx status, malformed body) into `None` after logging it.
//! Callers treat `None` the same as "not found".

pub mod rate_limit;
pub mod transport;

#[cfg(test)]
pub mod mock;

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::config::ApiConfig;
use crate::models::{PlayerProfile, PlayerRanking, RawBattle};

pub use rate_limit::RateLimiter;
pub use transport::{HttpTransport, Transport};

pub const DEFAULT_BASE_URL: &str = "https://api.clashroyale.com/v1";

/// Location used for rankings when none is given.
pub const GLOBAL_LOCATION: &str = "global";

/// Ranking size used when none is given.
pub const DEFAULT_RANKING_LIMIT: u32 = 200;

/// Errors that can occur talking to the upstream API.
///
/// These never leave the client; they are logged and turned into `None`.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Rate limited by upstream, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response shape from {0}")]
    UnexpectedShape(String),
}

/// A request path relative to the API base, plus query parameters.
///
/// Path segments are percent-encoded when resolved, so tags such as `#2PP`
/// become `%232PP`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}

impl Endpoint {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn player(tag: &str) -> Self {
        Self::new(["players", tag])
    }

    pub fn player_battles(tag: &str) -> Self {
        Self::new(["players", tag, "battlelog"])
    }

    pub fn top_players(location_id: &str, limit: u32) -> Self {
        Self::new(["locations", location_id, "rankings", "players"]).with_query("limit", limit)
    }

    pub fn clan(tag: &str) -> Self {
        Self::new(["clans", tag])
    }

    pub fn current_river_race(tag: &str) -> Self {
        Self::new(["clans", tag, "currentriverrace"])
    }

    pub fn cards() -> Self {
        Self::new(["cards"])
    }

    /// Append this endpoint to `base`, encoding each path segment.
    pub fn resolve(&self, base: &Url) -> Result<Url, ClientError> {
        let mut url = base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(base.to_string()))?
            .pop_if_empty()
            .extend(&self.segments);

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        Ok(url)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{}{}={}", sep, key, value)?;
        }
        Ok(())
    }
}

/// Single point of contact with the upstream API.
pub struct RoyaleClient {
    base_url: Url,
    limiter: RateLimiter,
    transport: Arc<dyn Transport>,
}

impl RoyaleClient {
    /// Build an HTTP client from configuration and a bearer token.
    pub fn from_config(config: &ApiConfig, api_key: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.base_url, e)))?;
        let transport = HttpTransport::new(api_key, config.timeout())?;

        Ok(Self::with_transport(
            base_url,
            RateLimiter::new(config.min_interval()),
            Arc::new(transport),
        ))
    }

    pub fn with_transport(
        base_url: Url,
        limiter: RateLimiter,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url,
            limiter,
            transport,
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Issue one paced GET. Any failure is logged and reported as `None`.
    pub async fn request(&self, endpoint: &Endpoint) -> Option<Value> {
        let url = match endpoint.resolve(&self.base_url) {
            Ok(url) => url,
            Err(e) => {
                error!("API request to {} failed: {}", endpoint, e);
                return None;
            }
        };

        self.limiter.acquire().await;
        debug!(transport = self.transport.name(), "Request URL: {}", url);

        match self.transport.get_json(&url).await {
            Ok(value) => Some(value),
            Err(e) => {
                error!("API request to {} failed: {}", endpoint, e);
                None
            }
        }
    }

    pub async fn get_player(&self, tag: &str) -> Option<PlayerProfile> {
        let endpoint = Endpoint::player(tag);
        let value = self.request(&endpoint).await?;
        decode_object(&endpoint, value)
    }

    pub async fn get_player_battles(&self, tag: &str) -> Option<Vec<RawBattle>> {
        let endpoint = Endpoint::player_battles(tag);
        let value = self.request(&endpoint).await?;
        let battles = RawBattle::parse_log(value);
        if battles.is_none() {
            error!("{}", ClientError::UnexpectedShape(endpoint.to_string()));
        }
        battles
    }

    pub async fn get_top_players(&self, location_id: &str, limit: u32) -> Option<PlayerRanking> {
        let endpoint = Endpoint::top_players(location_id, limit);
        let value = self.request(&endpoint).await?;
        decode_object(&endpoint, value)
    }

    /// Global ranking, the location the analyzers sample from.
    pub async fn get_global_top_players(&self, limit: u32) -> Option<PlayerRanking> {
        self.get_top_players(GLOBAL_LOCATION, limit).await
    }

    pub async fn get_clan(&self, tag: &str) -> Option<Value> {
        self.request(&Endpoint::clan(tag)).await
    }

    pub async fn get_current_river_race(&self, tag: &str) -> Option<Value> {
        self.request(&Endpoint::current_river_race(tag)).await
    }

    pub async fn get_cards(&self) -> Option<Value> {
        self.request(&Endpoint::cards()).await
    }
}

/// Decode an object response leniently; anything but an object is malformed.
fn decode_object<T: DeserializeOwned>(endpoint: &Endpoint, value: Value) -> Option<T> {
    if !value.is_object() {
        error!("{}", ClientError::UnexpectedShape(endpoint.to_string()));
        return None;
    }
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            error!("API response from {} could not be decoded: {}", endpoint, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{paced_client, scripted_client, ScriptedTransport};
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn base() -> Url {
        Url::parse(DEFAULT_BASE_URL).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_tag() {
        let url = Endpoint::player("#2PP").resolve(&base()).unwrap();
        assert_eq!(url.as_str(), "https://api.clashroyale.com/v1/players/%232PP");
    }

    #[test]
    fn test_endpoint_battlelog_and_clan_paths() {
        let url = Endpoint::player_battles("#ABC").resolve(&base()).unwrap();
        assert_eq!(url.path(), "/v1/players/%23ABC/battlelog");

        let url = Endpoint::current_river_race("#CLAN").resolve(&base()).unwrap();
        assert_eq!(url.path(), "/v1/clans/%23CLAN/currentriverrace");

        let url = Endpoint::clan("#CLAN").resolve(&base()).unwrap();
        assert_eq!(url.path(), "/v1/clans/%23CLAN");
    }

    #[test]
    fn test_endpoint_tag_cannot_escape_segment() {
        let url = Endpoint::player("#A/../cards?x").resolve(&base()).unwrap();
        assert_eq!(url.path(), "/v1/players/%23A%2F..%2Fcards%3Fx");
        assert!(url.query().is_none());
    }

    #[test]
    fn test_endpoint_rankings_query() {
        let url = Endpoint::top_players("global", 200).resolve(&base()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.clashroyale.com/v1/locations/global/rankings/players?limit=200"
        );
    }

    #[test]
    fn test_endpoint_trailing_slash_base() {
        let base = Url::parse("https://proxy.example/v1/").unwrap();
        let url = Endpoint::cards().resolve(&base).unwrap();
        assert_eq!(url.as_str(), "https://proxy.example/v1/cards");
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(Endpoint::player("#X").to_string(), "/players/#X");
        assert_eq!(
            Endpoint::top_players("global", 5).to_string(),
            "/locations/global/rankings/players?limit=5"
        );
    }

    #[test]
    fn test_from_config() {
        let client = RoyaleClient::from_config(&ApiConfig::default(), "token").unwrap();
        assert_eq!(client.limiter().min_interval(), Duration::from_millis(200));

        let bad = ApiConfig {
            base_url: "::nope".to_string(),
            ..Default::default()
        };
        assert!(RoyaleClient::from_config(&bad, "token").is_err());
    }

    #[tokio::test]
    async fn test_request_returns_json() {
        let (client, transport) =
            scripted_client(ScriptedTransport::new().with_json("/cards", json!({"items": []})));

        let cards = client.get_cards().await.unwrap();
        assert_eq!(cards, json!({"items": []}));
        assert_eq!(transport.requested_paths(), vec!["/cards".to_string()]);
    }

    #[tokio::test]
    async fn test_raw_player_lookup() {
        let profile = json!({"tag": "#2PP", "name": "Someone", "trophies": 7000});
        let (client, transport) =
            scripted_client(ScriptedTransport::new().with_json("/players/%232PP", profile.clone()));

        assert_eq!(client.request(&Endpoint::player("#2PP")).await, Some(profile));
        assert!(client.request(&Endpoint::player("#OTHER")).await.is_none());
        assert_eq!(transport.requested_paths()[0], "/players/%232PP");
    }

    #[tokio::test]
    async fn test_failures_become_none() {
        let (client, _) =
            scripted_client(ScriptedTransport::new().with_status("/clans/%23C", 403));

        assert!(client.get_clan("#C").await.is_none());
        // Unscripted path: 404
        assert!(client.get_current_river_race("#C").await.is_none());
        assert!(client.get_player("#NOBODY").await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_shapes_become_none() {
        let (client, _) = scripted_client(
            ScriptedTransport::new()
                .with_json("/players/%23P/battlelog", json!({"not": "a list"}))
                .with_json("/players/%23P", json!(["not", "an", "object"])),
        );

        assert!(client.get_player_battles("#P").await.is_none());
        assert!(client.get_player("#P").await.is_none());
    }

    #[tokio::test]
    async fn test_typed_operations_decode() {
        let (client, transport) = scripted_client(
            ScriptedTransport::new()
                .with_json(
                    "/locations/global/rankings/players?limit=2",
                    json!({"items": [{"tag": "#A"}, {"tag": "#B"}]}),
                )
                .with_json("/players/%23A", json!({"tag": "#A", "currentDeck": []}))
                .with_json("/players/%23A/battlelog", json!([{}, {}])),
        );

        let ranking = client.get_global_top_players(2).await.unwrap();
        assert_eq!(ranking.tags(), vec!["#A".to_string(), "#B".to_string()]);

        let profile = client.get_player("#A").await.unwrap();
        assert_eq!(profile.deck_names(), Some(vec![]));

        let battles = client.get_player_battles("#A").await.unwrap();
        assert_eq!(battles.len(), 2);

        assert_eq!(transport.requested_paths().len(), 3);
    }

    #[tokio::test]
    async fn test_requests_are_paced() {
        let interval = Duration::from_millis(50);
        let (client, transport) = paced_client(ScriptedTransport::new(), interval);

        let start = tokio::time::Instant::now();
        for _ in 0..4 {
            client.get_cards().await;
        }

        // Failed calls are paced too
        assert_eq!(transport.request_instants().len(), 4);
        assert!(start.elapsed() >= interval * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_client_paces_concurrent_callers() {
        let interval = Duration::from_millis(40);
        let (client, transport) = paced_client(ScriptedTransport::new(), interval);

        let start = tokio::time::Instant::now();
        let handles: Vec<_> = (0..5)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move { client.get_player(&format!("#P{}", i)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(start.elapsed() >= interval * 4);

        // Every upstream call reached the transport at least one interval apart
        let mut sent = transport.request_instants();
        assert_eq!(sent.len(), 5);
        sent.sort();
        for pair in sent.windows(2) {
            assert!(pair[1] - pair[0] >= interval);
        }
    }
}
