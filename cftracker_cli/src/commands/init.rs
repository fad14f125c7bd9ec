//! The `init` subcommand: create the schema and a starter config.

use std::path::PathBuf;

use anyhow::Result;
use cftracker_lib::config::CONFIG_TEMPLATE;
use cftracker_lib::Db;
use clap::Args;

#[derive(Args)]
pub struct InitArgs {
    /// SQLite database path
    #[arg(long, default_value = "cftracker.db")]
    pub db: PathBuf,

    /// Config file to create if it does not exist
    #[arg(long, default_value = "cftracker.toml")]
    pub config: PathBuf,
}

pub fn run(args: &InitArgs) -> Result<()> {
    let db = Db::open(&args.db)?;
    db.init()?;
    eprintln!("Database ready at {}", args.db.display());

    if args.config.exists() {
        eprintln!("Config {} already exists, left untouched", args.config.display());
    } else {
        std::fs::write(&args.config, CONFIG_TEMPLATE)?;
        eprintln!(
            "Wrote {}; set `athlete` and the benchmark lists before syncing",
            args.config.display()
        );
    }
    Ok(())
}
