//! The `report` subcommand: analyse the stored history of the athlete.

use std::path::PathBuf;

use anyhow::Result;
use cftracker_lib::{report, Db, PacedClient, TrackerConfig};
use clap::Args;

use super::{load_config, paced_client};
use crate::output::{print_report_csv, print_report_json, print_report_table, OutputFormat};

/// Arguments for the `report` subcommand.
#[derive(Args)]
pub struct ReportArgs {
    /// SQLite database path
    #[arg(long, default_value = "cftracker.db")]
    pub db: PathBuf,

    /// Tracker config file
    #[arg(long, default_value = "cftracker.toml")]
    pub config: PathBuf,
}

pub async fn run(args: &ReportArgs, base_url: Option<&str>, format: &OutputFormat) -> Result<()> {
    let config = load_config(&args.config)?;
    let db = Db::open(&args.db)?;
    db.init()?;
    let client = paced_client(base_url);
    print_report(&db, &client, &config, format).await
}

pub async fn print_report(
    db: &Db,
    client: &PacedClient,
    config: &TrackerConfig,
    format: &OutputFormat,
) -> Result<()> {
    if let Some(at) = db.get_meta("last_sync_at")? {
        eprintln!("Last sync: {}", at);
    }
    let report = report::generate(db, client, config).await?;
    if report.rows.is_empty() {
        eprintln!("No stored participations for {}; run `cftracker sync` first", config.athlete);
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_report_table(&report),
        OutputFormat::Json => print_report_json(&report),
        OutputFormat::Csv => print_report_csv(&report)?,
    }
    Ok(())
}
