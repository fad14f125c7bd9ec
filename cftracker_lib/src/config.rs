//! Tracker configuration: the athlete, the two benchmark cohorts and the
//! analysis thresholds.
//!
//! The configuration is loaded once per run from a TOML file, validated, and
//! then passed by reference to every component.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Template written by `cftracker init`.
pub const CONFIG_TEMPLATE: &str = r#"# Handle whose history is tracked.
athlete = ""

# Benchmarks at the athlete's level, compared by rank.
same_level = []

# Benchmarks one level above, compared by problems solved.
higher_level = []

# A contest rank at or below this counts as a good result.
good_rank = 1000

# Tolerance in minutes before a solve counts as slower than the cohort mean.
time_margin_minutes = 10
"#;

/// Raw file layout. Handle lists may be given as TOML arrays or as a single
/// comma-separated string.
#[derive(Deserialize, Debug)]
struct ConfigFile {
    athlete: String,
    #[serde(default)]
    same_level: HandleList,
    #[serde(default)]
    higher_level: HandleList,
    good_rank: i64,
    time_margin_minutes: i64,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum HandleList {
    List(Vec<String>),
    Csv(String),
}

impl Default for HandleList {
    fn default() -> Self {
        HandleList::List(Vec::new())
    }
}

impl HandleList {
    fn into_handles(self) -> Vec<String> {
        let raw: Vec<String> = match self {
            HandleList::List(v) => v,
            HandleList::Csv(s) => s.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect()
    }
}

/// Validated, immutable tracker configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerConfig {
    pub athlete: String,
    pub same_level: Vec<String>,
    pub higher_level: Vec<String>,
    pub good_rank: i64,
    pub time_margin_minutes: i64,
}

impl TrackerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let config = Self {
            athlete: file.athlete.trim().to_string(),
            same_level: file.same_level.into_handles(),
            higher_level: file.higher_level.into_handles(),
            good_rank: file.good_rank,
            time_margin_minutes: file.time_margin_minutes,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.athlete.is_empty() {
            return Err(ConfigError::Invalid("athlete handle must not be empty".into()));
        }
        if self.athlete.contains(';') {
            return Err(ConfigError::Invalid(format!(
                "athlete handle contains ';': {}",
                self.athlete
            )));
        }
        if self.good_rank < 1 {
            return Err(ConfigError::Invalid(format!(
                "good_rank must be positive, got {}",
                self.good_rank
            )));
        }
        if self.time_margin_minutes < 0 {
            return Err(ConfigError::Invalid(format!(
                "time_margin_minutes must not be negative, got {}",
                self.time_margin_minutes
            )));
        }
        Ok(())
    }

    /// Athlete followed by every benchmark handle, without duplicates.
    pub fn roster(&self) -> Vec<String> {
        let mut roster: Vec<String> = Vec::new();
        for handle in std::iter::once(&self.athlete)
            .chain(&self.same_level)
            .chain(&self.higher_level)
        {
            if !roster.contains(handle) {
                roster.push(handle.clone());
            }
        }
        roster
    }

    /// Both cohorts combined, used for solve speed comparison.
    pub fn all_benchmarks(&self) -> Vec<String> {
        self.same_level
            .iter()
            .chain(&self.higher_level)
            .cloned()
            .collect()
    }

    pub fn time_margin_seconds(&self) -> i64 {
        self.time_margin_minutes * 60
    }
}
