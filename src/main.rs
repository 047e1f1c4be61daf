use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use royale_meta::analysis::{
    AnalysisError, BattleAnalyzer, CardAnalyzer, ErrorPayload, DEFAULT_TOP_CARDS,
};
use royale_meta::api::state::AppState;
use royale_meta::client::{Endpoint, RoyaleClient, DEFAULT_RANKING_LIMIT};
use royale_meta::config::AppConfig;

#[derive(Parser)]
#[command(name = "royale-meta")]
#[command(about = "Clash Royale meta dashboard and analytics")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (defaults to the config file value)
        #[arg(long)]
        host: Option<String>,

        /// Port number (defaults to the config file value)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Card usage rates across top players' current decks
    CardUsage {
        /// Number of ranked players to sample
        #[arg(long, default_value_t = DEFAULT_RANKING_LIMIT)]
        players: u32,
    },

    /// Most common decks among top players
    PopularDecks {
        #[arg(long, default_value_t = DEFAULT_RANKING_LIMIT)]
        players: u32,
    },

    /// Card win rates from top players' battle logs
    CardWinRates {
        #[arg(long, default_value_t = DEFAULT_RANKING_LIMIT)]
        players: u32,
    },

    /// Analyzed recent battles for a player
    Battles {
        /// Player tag, e.g. "#2PP"
        tag: String,
    },

    /// Win rate, crowns and trophy summary for a player
    BattleStats { tag: String },

    /// A player's most used cards
    MostUsedCards {
        tag: String,

        /// Number of cards to show
        #[arg(long, default_value_t = DEFAULT_TOP_CARDS)]
        top: usize,
    },

    /// Player profile; also checks the API key and IP allowlist
    Player { tag: String },

    /// Upstream card catalog
    Cards,

    /// Clan information
    Clan { tag: String },

    /// A clan's current river race
    RiverRace { tag: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    // Initialize tracing
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting royale-meta v{}", env!("CARGO_PKG_VERSION"));

    let api_key = config.api.api_key();
    if api_key.is_empty() {
        tracing::warn!(
            "{} is not set; upstream requests will be rejected",
            config.api.api_key_env
        );
    }
    let client = Arc::new(RoyaleClient::from_config(&config.api, &api_key)?);

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let cors = royale_meta::api::cors_layer(&config.server.cors_origin)?;
            let app = royale_meta::api::build_router(AppState::new(client)).layer(cors);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Dashboard API: http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::CardUsage { players } => {
            let analyzer = CardAnalyzer::new(client);
            print_result(analyzer.get_card_usage(players).await)?;
        }
        Commands::PopularDecks { players } => {
            let analyzer = CardAnalyzer::new(client);
            print_result(analyzer.get_popular_decks(players).await)?;
        }
        Commands::CardWinRates { players } => {
            let analyzer = CardAnalyzer::new(client);
            print_result(analyzer.get_card_win_rates(players).await)?;
        }
        Commands::Battles { tag } => {
            let analyzer = BattleAnalyzer::new(client);
            print_result(analyzer.analyze_recent_battles(&tag).await)?;
        }
        Commands::BattleStats { tag } => {
            let analyzer = BattleAnalyzer::new(client);
            print_result(analyzer.get_battle_stats(&tag).await)?;
        }
        Commands::MostUsedCards { tag, top } => {
            let analyzer = BattleAnalyzer::new(client);
            print_result(analyzer.get_most_used_cards(&tag, top).await)?;
        }
        Commands::Player { tag } => {
            print_lookup(
                client.request(&Endpoint::player(&tag)).await,
                "No player data available; check the API key and allowed IPs",
            )?;
        }
        Commands::Cards => {
            print_lookup(client.get_cards().await, "No card catalog available")?;
        }
        Commands::Clan { tag } => {
            print_lookup(client.get_clan(&tag).await, "No clan data available")?;
        }
        Commands::RiverRace { tag } => {
            print_lookup(
                client.get_current_river_race(&tag).await,
                "No river race data available",
            )?;
        }
    }

    Ok(())
}

/// Print a result as pretty JSON, or its `{"error"}` payload and exit non-zero.
fn print_result<T: Serialize>(result: Result<T, AnalysisError>) -> Result<()> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            println!("{}", serde_json::to_string_pretty(&e.to_payload())?);
            std::process::exit(1);
        }
    }
}

fn print_lookup(value: Option<serde_json::Value>, missing: &str) -> Result<()> {
    match value {
        Some(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&ErrorPayload::new(missing))?);
            std::process::exit(1);
        }
    }
}
