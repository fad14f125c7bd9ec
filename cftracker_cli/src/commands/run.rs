//! The `run` subcommand: one sync batch followed by the report.

use std::path::PathBuf;

use anyhow::{bail, Result};
use cftracker_lib::sync::DEFAULT_BATCH_LIMIT;
use cftracker_lib::Db;
use clap::Args;

use super::report::print_report;
use super::sync::sync_batch;
use super::{load_config, paced_client};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct RunArgs {
    /// SQLite database path
    #[arg(long, default_value = "cftracker.db")]
    pub db: PathBuf,

    /// Tracker config file
    #[arg(long, default_value = "cftracker.toml")]
    pub config: PathBuf,

    /// Maximum number of participations fetched before reporting
    #[arg(long, default_value_t = DEFAULT_BATCH_LIMIT)]
    pub batch_size: usize,
}

pub async fn run(args: &RunArgs, base_url: Option<&str>, format: &OutputFormat) -> Result<()> {
    if args.batch_size == 0 {
        bail!("--batch-size must be at least 1");
    }
    let config = load_config(&args.config)?;
    let mut db = Db::open(&args.db)?;
    db.init()?;

    let client = paced_client(base_url);
    sync_batch(&client, &mut db, &config, args.batch_size).await?;
    print_report(&db, &client, &config, format).await
}
