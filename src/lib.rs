//! Bracket Engine
//!
//! A recurring 64-contestant single-elimination tournament engine. Human
//! decisions on one match at a time drive the bracket forward, move ranking
//! points between the two participants, award placement points, and reseed
//! the next tournament the moment a final is decided.
//!
//! # Features
//!
//! - **One engine, any store**: `TournamentEngine<S: Store>` over an
//!   in-memory or JSONL-backed arena
//! - **All-or-nothing decisions**: a decision and the round, finals or
//!   successor tournament it triggers commit in one transaction
//! - **Reproducible draws**: field selection and shuffles use an injected
//!   `StdRng`
//! - **14 MCP Tools** over JSON-RPC on stdio
//!
//! # Modules
//!
//! - `types`: records, ids, views and `EngineError`
//! - `economy`: ranking-points exchange and placement table
//! - `storage`: `Repository`/`Store` contracts and the two stores
//! - `engine`: the tournament engine
//! - `images`: image collaborator boundary
//! - `config`: environment configuration
//! - `protocol`, `server`, `tools`: the MCP surface
//! - `utils`: atomic file replacement
//!
//! # Example
//!
//! ```no_run
//! use bracket_engine::storage::MemoryStore;
//! use bracket_engine::types::NewContestant;
//! use bracket_engine::TournamentEngine;
//!
//! let engine = TournamentEngine::with_seed(MemoryStore::new(), 42);
//! engine
//!     .seed_roster((1..=64).map(|i| NewContestant::new(format!("Player {i}"))).collect())
//!     .unwrap();
//!
//! let tournament = engine.initialize_tournament().unwrap();
//! let current = engine.current_match().unwrap();
//! engine.select_winner(current.id, current.contestant1_id).unwrap();
//! assert_eq!(engine.tournament_progress(tournament.id).unwrap().completed_matches, 1);
//! ```

pub mod config;
pub mod economy;
pub mod engine;
pub mod images;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod tools;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use engine::{PerformerHistory, TournamentEngine};
pub use protocol::{McpTool, ServerInfo, Tool};
pub use server::McpServer;
pub use storage::{JsonlStore, MemoryStore, Repository, Store};
pub use types::{
    Contestant, ContestantId, EngineError, EngineResult, Match, MatchId, Tournament, TournamentId,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
