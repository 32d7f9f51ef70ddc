//! Ingest command - load analyzed video records.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::{Result as SynthResult, SynthError};
use crate::models::VideoRecord;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(file: &str, niche: Option<&str>, settings: Settings) -> Result<()> {
    let path = Settings::expand_path(file);
    let content = std::fs::read_to_string(&path)?;
    let records = parse_records(&content)?;

    if records.is_empty() {
        Output::warning(&format!("No records in {}", path.display()));
        return Ok(());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let spinner = Output::spinner(&format!("Storing {} records...", records.len()));
    let ids = orchestrator.ingest(records, niche).await;
    spinner.finish_and_clear();

    let ids = ids?;
    Output::success(&format!("Ingested {} video records", ids.len()));
    Ok(())
}

/// Parse a JSON array of records, or one JSON record per line.
pub fn parse_records(content: &str) -> SynthResult<Vec<VideoRecord>> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .map_err(|e| SynthError::InvalidInput(format!("line {}: {}", i + 1, e)))
        })
        .collect()
}
