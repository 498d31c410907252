//! Configuration and data directory management.
//!
//! The database lives in the platform-standard data directory
//! (`~/.local/share/listengen/` on Linux) unless overridden on the command
//! line or via `LISTENGEN_DB`. Run defaults (roster size, attempts per
//! user, seed) can be pinned in an optional `config.json` next to it;
//! command-line flags always win.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the default database file path, creating the data directory if
/// needed.
pub fn get_db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("userData.db"))
}

/// Returns the listengen data directory, creating it if needed.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context(
        "could not determine the system data directory; this platform lacks a standard location",
    )?;

    let dir = data_dir.join("listengen");
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create data directory at {}", dir.display()))?;
    Ok(dir)
}

/// The database path to use: the CLI override if given, else the default.
pub fn resolve_db_path(cli: Option<PathBuf>) -> Result<PathBuf> {
    match cli {
        Some(path) => Ok(path),
        None => get_db_path(),
    }
}

/// Run defaults, loadable from `config.json` in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunConfig {
    /// Number of synthetic users to generate.
    pub users: u32,
    /// Follow attempts per user in the follow stage.
    pub follows_per_user: u32,
    /// Pinned RNG seed. Absent means a fresh seed per run (logged, so the
    /// run stays reproducible after the fact).
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self { users: 2000, follows_per_user: 10, seed: None }
    }
}

impl RunConfig {
    /// Load from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("config file {} is not valid JSON", path.display()))
    }

    /// Load `config.json` from the data directory if present, else defaults.
    pub fn load_default() -> Result<Self> {
        let path = get_data_dir()?.join("config.json");
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}
