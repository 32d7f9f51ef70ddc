//! Mine command - extract and group patterns for a niche.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the mine command.
pub async fn run_mine(niche: &str, dry_run: bool, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner(&format!("Mining patterns for {}...", niche));
    let patterns = if dry_run {
        orchestrator.mine(niche).await
    } else {
        orchestrator.mine_and_store(niche).await
    };
    spinner.finish_and_clear();
    let patterns = patterns?;

    if patterns.is_empty() {
        Output::warning(&format!("No videos found for niche '{}'", niche));
        return Ok(());
    }

    Output::header(&format!("Patterns for {} ({})", niche, patterns.len()));
    for pattern in &patterns {
        Output::pattern(pattern);
    }
    println!();

    if dry_run {
        Output::info("Dry run, nothing stored");
    } else if patterns.iter().any(|p| p.id.is_none()) {
        Output::warning("Patterns could not be stored, see log for details");
    } else {
        Output::success(&format!("Stored {} patterns", patterns.len()));
    }
    Ok(())
}
