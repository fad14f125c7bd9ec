//! The `sync` subcommand: discover pending participations and store one batch.

use std::path::PathBuf;

use anyhow::{bail, Result};
use cftracker_lib::sync::DEFAULT_BATCH_LIMIT;
use cftracker_lib::{
    discover_pending, BatchProcessor, Db, PacedClient, SyncSummary, TaskOutcome, TrackerConfig,
};
use chrono::Utc;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use super::{load_config, paced_client};

/// Arguments for the `sync` subcommand.
#[derive(Args)]
pub struct SyncArgs {
    /// SQLite database path
    #[arg(long, default_value = "cftracker.db")]
    pub db: PathBuf,

    /// Tracker config file
    #[arg(long, default_value = "cftracker.toml")]
    pub config: PathBuf,

    /// Maximum number of participations fetched in this run
    #[arg(long, default_value_t = DEFAULT_BATCH_LIMIT)]
    pub batch_size: usize,
}

pub async fn run(args: &SyncArgs, base_url: Option<&str>) -> Result<()> {
    if args.batch_size == 0 {
        bail!("--batch-size must be at least 1");
    }
    let config = load_config(&args.config)?;
    let mut db = Db::open(&args.db)?;
    db.init()?;

    eprintln!("Syncing {} into {}", config.athlete, args.db.display());
    let client = paced_client(base_url);
    sync_batch(&client, &mut db, &config, args.batch_size).await?;
    Ok(())
}

/// Runs discovery and one capped batch, reporting progress on stderr.
pub async fn sync_batch(
    client: &PacedClient,
    db: &mut Db,
    config: &TrackerConfig,
    batch_size: usize,
) -> Result<SyncSummary> {
    let roster = config.roster();
    let stored = db.participation_ids()?;
    let tasks = discover_pending(client, &config.athlete, &stored).await;

    let pb = ProgressBar::new(tasks.len().min(batch_size) as u64);
    pb.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>4}/{len:4} {msg}",
    )?);

    let summary = {
        let mut processor = BatchProcessor::new(client, db, &roster)?;
        processor
            .run(&tasks, batch_size, |task, outcome| {
                if *outcome == TaskOutcome::Skipped {
                    pb.println(format!(
                        "Contest {} ({}) skipped, will retry next run",
                        task.contest_id, task.participant_type
                    ));
                }
                pb.set_message(format!("contest {}", task.contest_id));
                pb.inc(1);
            })
            .await?
    };
    pb.finish_and_clear();

    db.set_meta("last_sync_at", &Utc::now().to_rfc3339())?;

    eprintln!(
        "Sync complete: {} contests and {} participations added, {} skipped, {} still pending",
        summary.contests_added,
        summary.participations_added,
        summary.skipped,
        summary.remaining()
    );
    Ok(summary)
}
