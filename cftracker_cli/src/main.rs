mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "cftracker")]
#[command(about = "Track Codeforces contest history and compare it against benchmark handles")]
struct Cli {
    /// Output format: table, json or csv
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema and a starter config file
    Init(commands::init::InitArgs),
    /// Fetch standings for a batch of participations not stored yet
    Sync(commands::sync::SyncArgs),
    /// Print the analysed contest history of the athlete
    Report(commands::report::ReportArgs),
    /// Sync one batch, then print the report
    Run(commands::run::RunArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cftracker=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        _ => OutputFormat::Table,
    };

    let base_url = std::env::var("CODEFORCES_BASE_URL").ok();

    match &cli.command {
        Commands::Init(args) => commands::init::run(args)?,
        Commands::Sync(args) => commands::sync::run(args, base_url.as_deref()).await?,
        Commands::Report(args) => {
            commands::report::run(args, base_url.as_deref(), &format).await?
        }
        Commands::Run(args) => commands::run::run(args, base_url.as_deref(), &format).await?,
    }

    Ok(())
}
