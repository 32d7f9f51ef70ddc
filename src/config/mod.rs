//! Configuration module for ViralSynth.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{GeneralSettings, PatternSettings, RankingSettings, Settings, StoreSettings};
