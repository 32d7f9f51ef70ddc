//! Trending command - show trending audio.

use crate::cli::{parse_date, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::ranking::niche_label;
use anyhow::Result;

/// Run the trending command.
///
/// With a date, reads that day's stored snapshot; otherwise ranks the
/// current records.
pub async fn run_trending(
    niche: Option<&str>,
    limit: Option<usize>,
    date: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let limit = limit.unwrap_or(settings.ranking.limit);
    let orchestrator = Orchestrator::new(settings)?;

    let (title, audios) = match date {
        Some(date) => {
            let date = parse_date(date)?;
            let audios = orchestrator.snapshot_audio(date, niche, limit).await?;
            (format!("Trending audio on {} ({})", date, niche_label(niche)), audios)
        }
        None => {
            let audios = orchestrator.trending_audio(niche, limit).await?;
            (format!("Trending audio ({})", niche_label(niche)), audios)
        }
    };

    if audios.is_empty() {
        Output::info("No trending audio found.");
        return Ok(());
    }

    Output::header(&title);
    for (i, audio) in audios.iter().enumerate() {
        Output::audio(i + 1, audio);
    }
    println!();
    Ok(())
}
