//! ViralSynth CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use viralsynth::cli::{commands, Cli, Commands};
use viralsynth::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            format!("viralsynth={}", settings.log_level(cli.verbose))
        })))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Ensure the data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Init => {
            commands::run_init(&settings, &config_path)?;
        }

        Commands::Ingest { file, niche } => {
            commands::run_ingest(file, niche.as_deref(), settings).await?;
        }

        Commands::Mine { niche, dry_run } => {
            commands::run_mine(niche, *dry_run, settings).await?;
        }

        Commands::Patterns { niche, limit } => {
            commands::run_patterns(niche.as_deref(), *limit, settings).await?;
        }

        Commands::Trending { niche, limit, date } => {
            commands::run_trending(niche.as_deref(), *limit, date.as_deref(), settings).await?;
        }

        Commands::Rank { niches, days, limit, date } => {
            commands::run_rank(niches, *days, *limit, date.as_deref(), settings).await?;
        }

        Commands::Choose { niche, pattern_ids, json } => {
            commands::run_choose(niche.as_deref(), pattern_ids, *json, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, &config_path)?;
        }
    }

    Ok(())
}
