//! Patterns command - list stored patterns.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the patterns command.
pub async fn run_patterns(niche: Option<&str>, limit: Option<usize>, settings: Settings) -> Result<()> {
    let limit = limit.unwrap_or(settings.patterns.list_limit);
    let orchestrator = Orchestrator::new(settings)?;
    let patterns = orchestrator.list_patterns(niche, limit).await?;

    if patterns.is_empty() {
        Output::info("No patterns stored yet.");
        Output::info("Run 'viralsynth mine -n <niche>' to mine some.");
        return Ok(());
    }

    Output::header(&format!("Stored Patterns ({})", patterns.len()));
    for pattern in &patterns {
        Output::pattern(pattern);
    }
    println!();
    Ok(())
}
