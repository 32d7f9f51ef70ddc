//! Rank command - snapshot daily trending audio.

use crate::cli::{parse_date, Output};
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::ranking::SnapshotSummary;
use anyhow::Result;
use console::style;

/// Run the rank command.
///
/// Niches given on the command line replace the configured ones; with
/// neither, the ranking spans all niches.
pub async fn run_rank(
    niches: &[String],
    days: Option<u32>,
    limit: Option<usize>,
    date: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let today = match date {
        Some(date) => parse_date(date)?,
        None => chrono::Local::now().date_naive(),
    };
    let days = days.unwrap_or(settings.ranking.days).max(1);
    let limit = limit.unwrap_or(settings.ranking.limit);
    let niches = if niches.is_empty() {
        settings.ranking.niches.clone()
    } else {
        niches.to_vec()
    };

    let orchestrator = Orchestrator::new(settings)?;
    let spinner = Output::spinner(&format!("Ranking {} day(s) ending {}...", days, today));
    let summary = orchestrator
        .ranking_job()
        .run(Some(niches.as_slice()), days, today, limit)
        .await;
    spinner.finish_and_clear();

    print_summary(&summary);

    if summary.is_complete() {
        Output::success("Ranking snapshots stored");
        Ok(())
    } else {
        anyhow::bail!("{} ranking snapshot(s) failed", summary.failures.len())
    }
}

fn print_summary(summary: &SnapshotSummary) {
    Output::header("Ranking Summary");
    for (date, per_niche) in &summary.rankings {
        println!("{}:", style(date).bold());
        for (niche, audio_ids) in per_niche {
            if audio_ids.is_empty() {
                println!("  {}: {}", niche, style("<no results>").dim());
            } else {
                println!("  {}: {}", niche, audio_ids.join(", "));
            }
        }
    }

    if !summary.failures.is_empty() {
        println!();
        for failure in &summary.failures {
            Output::error(&format!(
                "{} / {}: {}",
                failure.ranking_date, failure.niche, failure.error
            ));
        }
    }
    println!();
}
