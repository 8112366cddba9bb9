//! Runtime configuration from environment variables
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `BRACKET_DATA_PATH` | `bracket.jsonl` | JSONL data file, relative to the working directory |
//! | `BRACKET_STORAGE` | `jsonl` | `jsonl` or `memory` |
//! | `BRACKET_RNG_SEED` | unset | `u64` seed for reproducible draws |
//! | `BRACKET_ROSTER_FILE` | unset | names to seed an empty roster with |
//! | `BRACKET_IMAGE_URL_TEMPLATE` | unset | URL with `{id}` / `{name}` placeholders |
//!
//! Only the binary reads the environment; the engine is handed its store
//! and seed.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::types::NewContestant;

pub const DATA_PATH_VAR: &str = "BRACKET_DATA_PATH";
pub const STORAGE_VAR: &str = "BRACKET_STORAGE";
pub const RNG_SEED_VAR: &str = "BRACKET_RNG_SEED";
pub const ROSTER_FILE_VAR: &str = "BRACKET_ROSTER_FILE";
pub const IMAGE_TEMPLATE_VAR: &str = "BRACKET_IMAGE_URL_TEMPLATE";

const DEFAULT_DATA_FILE: &str = "bracket.jsonl";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has unsupported value '{value}'")]
    InvalidValue { var: &'static str, value: String },

    #[error("cannot read roster file {path}: {source}")]
    RosterFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Which store backs the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Jsonl,
    Memory,
}

impl FromStr for StorageKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jsonl" | "file" => Ok(StorageKind::Jsonl),
            "memory" | "mem" => Ok(StorageKind::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub data_path: PathBuf,
    pub storage: StorageKind,
    pub rng_seed: Option<u64>,
    pub roster_file: Option<PathBuf>,
    pub image_url_template: Option<String>,
}

impl EngineConfig {
    /// Read the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_lookup(|var| env::var(var).ok(), &cwd)
    }

    /// Build from any variable source, resolving relative paths against `cwd`
    pub fn from_lookup<F>(lookup: F, cwd: &Path) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let resolve = |raw: String| {
            let path = PathBuf::from(raw.trim());
            if path.is_absolute() {
                path
            } else {
                cwd.join(path)
            }
        };

        let data_path = resolve(set(DATA_PATH_VAR).unwrap_or_else(|| DEFAULT_DATA_FILE.to_string()));

        let storage = match set(STORAGE_VAR) {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                var: STORAGE_VAR,
                value,
            })?,
            None => StorageKind::default(),
        };

        let rng_seed = match set(RNG_SEED_VAR) {
            Some(value) => Some(value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: RNG_SEED_VAR,
                value,
            })?),
            None => None,
        };

        Ok(Self {
            data_path,
            storage,
            rng_seed,
            roster_file: set(ROSTER_FILE_VAR).map(resolve),
            image_url_template: set(IMAGE_TEMPLATE_VAR),
        })
    }

    /// Roster entries from `roster_file`, empty when none is configured
    pub fn load_roster(&self) -> Result<Vec<NewContestant>, ConfigError> {
        let Some(path) = &self.roster_file else {
            return Ok(Vec::new());
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::RosterFile {
            path: path.clone(),
            source,
        })?;
        Ok(parse_roster(&text))
    }
}

/// Parse one contestant per line
///
/// Blank lines and `#` comments are skipped; `name|nationality` sets the
/// nationality tag.
pub fn parse_roster(text: &str) -> Vec<NewContestant> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (name, nationality) = match line.split_once('|') {
                Some((name, nationality)) => (name.trim(), Some(nationality.trim())),
                None => (line, None),
            };
            if name.is_empty() {
                return None;
            }
            let entry = NewContestant::new(name);
            Some(match nationality.filter(|n| !n.is_empty()) {
                Some(n) => entry.with_nationality(n),
                None => entry,
            })
        })
        .collect()
}
