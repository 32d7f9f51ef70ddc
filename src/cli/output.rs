//! CLI output formatting utilities.

use crate::models::{Pattern, TrendingAudio};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a mined or stored pattern.
    pub fn pattern(pattern: &Pattern) {
        let id = pattern
            .id
            .map(|id| format!("#{}", id))
            .unwrap_or_else(|| "unsaved".to_string());
        println!(
            "\n{} {} ({}, prevalence {:.2}, engagement {:.1})",
            style(">>").green(),
            style(preview(&pattern.hook, 80)).bold(),
            style(id).dim(),
            pattern.prevalence,
            pattern.engagement_score
        );
        if !pattern.core_value_loop.is_empty() {
            println!("   core: {}", preview(&pattern.core_value_loop, 120));
        }
        if !pattern.cta.is_empty() {
            println!("   cta: {}", preview(&pattern.cta, 80));
        }
        println!(
            "   {} {} / {}",
            style("arc").dim(),
            pattern.narrative_arc,
            pattern.visual_formula
        );
    }

    /// Print one ranked audio track.
    pub fn audio(rank: usize, audio: &TrendingAudio) {
        println!(
            "  {} {} ({} uses, avg engagement {:.1})",
            style(format!("{:>2}.", rank)).cyan(),
            style(&audio.audio_id).bold(),
            audio.count,
            audio.avg_engagement
        );
        if let Some(url) = &audio.url {
            println!("      {}", style(url).dim());
        }
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(template);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Single-line preview of `content`, cut at `max_chars` characters.
fn preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let cut: String = content.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
