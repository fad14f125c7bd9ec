//! CLI subcommand implementations.

pub mod init;
pub mod report;
pub mod run;
pub mod sync;

use std::path::Path;

use anyhow::{Context, Result};
use cftracker_lib::{PacedClient, TrackerConfig};

/// Paced client against `base_url`, or the production API when unset.
pub fn paced_client(base_url: Option<&str>) -> PacedClient {
    match base_url {
        Some(url) => PacedClient::with_base_url(url),
        None => PacedClient::new(),
    }
}

/// Loads and validates the config. Called before any network traffic.
pub fn load_config(path: &Path) -> Result<TrackerConfig> {
    TrackerConfig::load(path)
        .with_context(|| format!("failed to load config from {}", path.display()))
}
