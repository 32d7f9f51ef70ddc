//! ViralSynth - Pattern Mining and Trending Audio
//!
//! A local-first engine that learns what makes short-form videos perform and
//! turns it into a concrete recommendation for the next one.
//!
//! # Overview
//!
//! ViralSynth allows you to:
//! - Extract hook, value loop, call to action and visual style from analyzed videos
//! - Group videos by structure into patterns with prevalence and engagement
//! - Rank trending audio per niche and keep dated daily snapshots
//! - Pick the best pattern and audio with a deterministic, explained score
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `models` - Video records, patterns, trending audio and snapshots
//! - `patterns` - Component extraction and pattern aggregation
//! - `ranking` - Audio aggregation and the daily snapshot job
//! - `chooser` - Weighted pattern and audio selection
//! - `store` - Record store abstraction (SQLite, in-memory)
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use viralsynth::config::Settings;
//! use viralsynth::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let patterns = orchestrator.mine_and_store("fitness").await?;
//!     println!("Mined {} patterns", patterns.len());
//!
//!     let decision = orchestrator.choose_assets(Some("fitness"), None).await;
//!     println!("Use audio {}", decision.audio.audio_id);
//!
//!     Ok(())
//! }
//! ```

pub mod chooser;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod patterns;
pub mod ranking;
pub mod store;

pub use error::{Result, SynthError};
