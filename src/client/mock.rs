//! Scripted transport for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;
use url::Url;

use super::rate_limit::RateLimiter;
use super::transport::Transport;
use super::{ClientError, RoyaleClient, DEFAULT_BASE_URL};

/// Serves canned JSON keyed by request path (relative to the API base) and
/// records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: HashMap<String, Result<Value, u16>>,
    requests: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `path` (e.g. `/players/%23ABC`) with `body`.
    pub fn with_json(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), Ok(body));
        self
    }

    /// Respond to `path` with an HTTP error status.
    pub fn with_status(mut self, path: &str, status: u16) -> Self {
        self.responses.insert(path.to_string(), Err(status));
        self
    }

    /// Requested paths, in request order.
    pub fn requested_paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(path, _)| path.clone())
            .collect()
    }

    pub fn request_instants(&self) -> Vec<Instant> {
        self.requests.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }

    fn key(url: &Url) -> String {
        let path = url.path().strip_prefix("/v1").unwrap_or(url.path());
        match url.query() {
            Some(query) => format!("{}?{}", path, query),
            None => path.to_string(),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn get_json(&self, url: &Url) -> Result<Value, ClientError> {
        let key = Self::key(url);
        self.requests
            .lock()
            .unwrap()
            .push((key.clone(), Instant::now()));

        match self.responses.get(&key) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(ClientError::HttpStatus {
                status: *status,
                message: "scripted failure".to_string(),
            }),
            None => Err(ClientError::HttpStatus {
                status: 404,
                message: format!("no scripted response for {}", key),
            }),
        }
    }
}

/// Build an unpaced client over `transport`, keeping a handle for assertions.
pub fn scripted_client(transport: ScriptedTransport) -> (Arc<RoyaleClient>, Arc<ScriptedTransport>) {
    paced_client(transport, Duration::ZERO)
}

pub fn paced_client(
    transport: ScriptedTransport,
    min_interval: Duration,
) -> (Arc<RoyaleClient>, Arc<ScriptedTransport>) {
    let transport = Arc::new(transport);
    let client = RoyaleClient::with_transport(
        Url::parse(DEFAULT_BASE_URL).unwrap(),
        RateLimiter::new(min_interval),
        transport.clone(),
    );
    (Arc::new(client), transport)
}
