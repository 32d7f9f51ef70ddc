//! Init command - first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::SqliteRecordStore;
use console::style;

/// Run the init command for first-time setup.
///
/// Creates the data directory, the SQLite schema and a default config file
/// when none exists. Safe to run again.
pub fn run_init(settings: &Settings, config_path: &std::path::Path) -> anyhow::Result<()> {
    Output::header("ViralSynth Setup");
    println!();

    println!("{}", style("Step 1: Setting up directories").bold().cyan());
    let data_dir = settings.data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        Output::success(&format!("Created data directory: {}", data_dir.display()));
    } else {
        Output::info(&format!("Data directory exists: {}", data_dir.display()));
    }
    println!();

    println!("{}", style("Step 2: Record store").bold().cyan());
    if settings.store.provider == "sqlite" {
        let db_path = settings.sqlite_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        SqliteRecordStore::new(&db_path)?;
        Output::success(&format!("Database ready: {}", db_path.display()));
    } else {
        Output::info(&format!(
            "Store provider '{}' needs no setup",
            settings.store.provider
        ));
    }
    println!();

    println!("{}", style("Step 3: Configuration file").bold().cyan());
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else {
        settings.save_to(&config_path.to_path_buf())?;
        Output::success(&format!("Created config file: {}", config_path.display()));
    }
    println!();

    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Load analyzed videos", style("viralsynth ingest <file>").cyan());
    println!("  {} Mine patterns for a niche", style("viralsynth mine -n <niche>").cyan());
    println!("  {} Snapshot trending audio", style("viralsynth rank").cyan());
    println!("  {} Pick a pattern and audio", style("viralsynth choose -n <niche>").cyan());

    Ok(())
}
