//! Bracket Engine MCP Server - Binary Entry Point
//!
//! Reads configuration from the environment, opens the configured store,
//! seeds the roster if a roster file is given, and serves the tools over
//! stdio.

use std::error::Error;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use bracket_engine::config::{EngineConfig, StorageKind};
use bracket_engine::images::{ImageProvider, NoImages, UrlTemplateImages};
use bracket_engine::protocol::ServerInfo;
use bracket_engine::server::McpServer;
use bracket_engine::storage::{JsonlStore, MemoryStore, Store};
use bracket_engine::tools::register_all_tools;
use bracket_engine::{EngineError, TournamentEngine};

fn main() -> Result<(), Box<dyn Error>> {
    // Stdout carries the protocol, so logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .init();

    let config = EngineConfig::from_env()?;
    info!(
        storage = ?config.storage,
        path = %config.data_path.display(),
        seeded = config.rng_seed.is_some(),
        "Configuration loaded"
    );

    let images: Arc<dyn ImageProvider> = match &config.image_url_template {
        Some(template) => Arc::new(UrlTemplateImages::new(template.clone())),
        None => Arc::new(NoImages),
    };

    match config.storage {
        StorageKind::Jsonl => serve(JsonlStore::open(&config.data_path)?, &config, images),
        StorageKind::Memory => serve(MemoryStore::new(), &config, images),
    }
}

fn serve<S: Store + 'static>(
    store: S,
    config: &EngineConfig,
    images: Arc<dyn ImageProvider>,
) -> Result<(), Box<dyn Error>> {
    let engine = match config.rng_seed {
        Some(seed) => TournamentEngine::with_seed(store, seed),
        None => TournamentEngine::new(store),
    };

    let roster = config.load_roster()?;
    if !roster.is_empty() {
        let created = engine.seed_roster(roster)?;
        info!(created = created.len(), total = engine.contestants().len(), "Roster file applied");
    }

    // An undersized roster still serves the roster tools
    match engine.ensure_active_tournament() {
        Ok(tournament) => info!(
            tournament_id = %tournament.id,
            round = tournament.current_round,
            match_number = tournament.current_match,
            "Active tournament ready"
        ),
        Err(err @ EngineError::InsufficientRoster { .. }) => {
            warn!(error = %err, "No active tournament; add contestants to start one")
        }
        Err(err) => return Err(err.into()),
    }

    let mut server = McpServer::with_info(ServerInfo::default());
    register_all_tools(&mut server, Arc::new(engine), images);
    server.run()?;
    Ok(())
}
