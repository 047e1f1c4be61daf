//! # Royale Meta
//!
//! Clash Royale meta dashboard backend: card usage, popular decks, card win
//! rates and per-player battle summaries computed from the official API.
//!
//! ## Architecture
//!
//! - **client**: Rate-limited upstream API client
//! - **analysis**: Battle and card analyzers
//! - **calculate**: Counting and rate helpers
//! - **models**: Upstream records and derived payloads
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod analysis;
pub mod api;
pub mod calculate;
pub mod client;
pub mod config;
pub mod models;

pub use models::*;
