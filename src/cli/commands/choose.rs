//! Choose command - pick the best pattern and audio.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the choose command.
pub async fn run_choose(
    niche: Option<&str>,
    pattern_ids: &[i64],
    json: bool,
    settings: Settings,
) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let pattern_ids = (!pattern_ids.is_empty()).then(|| pattern_ids.to_vec());
    let decision = orchestrator.choose_assets(niche, pattern_ids).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
        return Ok(());
    }

    let why = &decision.justification;
    Output::header("Chosen Pattern");
    Output::pattern(&decision.pattern);
    Output::kv("score", &format!("{:.3}", why.pattern.score));
    Output::kv("why", &why.pattern.explanation);

    Output::header("Chosen Audio");
    Output::audio(1, &decision.audio);
    Output::kv("score", &format!("{:.3}", why.audio.score));
    Output::kv("why", &why.audio.explanation);
    println!();
    Ok(())
}
