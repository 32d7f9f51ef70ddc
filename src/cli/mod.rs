//! CLI module for ViralSynth.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// ViralSynth - pattern mining and trending audio for short-form video
///
/// Groups analyzed videos into recurring structural patterns, ranks trending
/// audio per niche and picks the best pattern and audio for new content.
#[derive(Parser, Debug)]
#[command(name = "viralsynth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory, database and default configuration
    Init,

    /// Load analyzed video records from a JSON or JSON-lines file
    Ingest {
        /// Path to the records file
        file: String,

        /// Niche to assign to records that have none
        #[arg(short, long)]
        niche: Option<String>,
    },

    /// Mine structural patterns for a niche
    Mine {
        /// Niche to mine
        #[arg(short, long)]
        niche: String,

        /// Print the patterns without storing them
        #[arg(long)]
        dry_run: bool,
    },

    /// List stored patterns, most prevalent first
    Patterns {
        /// Only patterns of this niche
        #[arg(short, long)]
        niche: Option<String>,

        /// Maximum number of patterns
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show trending audio, live or from a stored daily snapshot
    Trending {
        /// Only videos of this niche
        #[arg(short, long)]
        niche: Option<String>,

        /// Maximum number of audio tracks
        #[arg(short, long)]
        limit: Option<usize>,

        /// Read the snapshot of this date (YYYY-MM-DD) instead of computing
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Compute and store daily trending audio rankings
    Rank {
        /// Niche to rank; repeat for several (default: configured niches, else all)
        #[arg(short, long = "niche")]
        niches: Vec<String>,

        /// Number of days (including the end date) to rank
        #[arg(long)]
        days: Option<u32>,

        /// Number of audio tracks per niche and day
        #[arg(short, long)]
        limit: Option<usize>,

        /// Last date of the window (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Pick the best pattern and audio for new content
    Choose {
        /// Niche to choose for
        #[arg(short, long)]
        niche: Option<String>,

        /// Consider only these stored pattern ids
        #[arg(short, long = "pattern-id")]
        pattern_ids: Vec<i64>,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

/// Parse a `YYYY-MM-DD` date argument.
pub fn parse_date(value: &str) -> crate::error::Result<chrono::NaiveDate> {
    Ok(chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")?)
}
