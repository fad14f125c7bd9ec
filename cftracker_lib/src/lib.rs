//! Library layer for the Codeforces contest tracker: paced API access,
//! SQLite storage, incremental sync and comparative analytics.
//!
//! Wraps the `codeforces_api` crate with a fixed post-call cooldown, keeps
//! contests, problems and participations in an append-only store, and turns
//! the stored history into one analysed row per participation.

pub mod analytics;
pub mod client;
pub mod config;
pub mod db;
pub mod discover;
pub mod report;
pub mod sync;

pub use codeforces_api;
pub use codeforces_api::types;

pub use client::PacedClient;
pub use config::{ConfigError, TrackerConfig};
pub use db::{Db, DbError};
pub use discover::{discover_pending, SyncTask};
pub use report::{Report, ReportRow};
pub use sync::{BatchProcessor, SyncSummary, TaskOutcome};
