//! Configuration settings for ViralSynth.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::warn;

/// Environment variable overriding the trending audio limit.
pub const ENV_TRENDING_AUDIO_LIMIT: &str = "TRENDING_AUDIO_LIMIT";

/// Environment variable overriding how many patterns the chooser considers.
pub const ENV_PATTERN_CHOOSE_LIMIT: &str = "PATTERN_CHOOSE_LIMIT";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub store: StoreSettings,
    pub ranking: RankingSettings,
    pub patterns: PatternSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error) used when no `-v` is given.
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.viralsynth".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Record store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Store provider (sqlite, memory).
    pub provider: String,
    /// Path to SQLite database (for sqlite provider).
    pub sqlite_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            provider: "sqlite".to_string(),
            sqlite_path: "~/.viralsynth/viralsynth.db".to_string(),
        }
    }
}

/// Trending audio ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingSettings {
    /// Number of audio tracks kept per ranking.
    pub limit: usize,
    /// Number of days (including today) the ranking job covers.
    pub days: u32,
    /// Niches ranked by the job. Empty ranks across all niches.
    pub niches: Vec<String>,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            limit: 10,
            days: 7,
            niches: Vec::new(),
        }
    }
}

/// Pattern listing and choice settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSettings {
    /// Number of top patterns by engagement the chooser considers.
    pub choose_limit: usize,
    /// Default number of patterns listed.
    pub list_limit: usize,
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            choose_limit: 5,
            list_limit: 10,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied on top of the file.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply limit overrides from the environment.
    ///
    /// Unparsable values are ignored with a warning.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(limit) = parse_override(&lookup, ENV_TRENDING_AUDIO_LIMIT) {
            self.ranking.limit = limit;
        }
        if let Some(limit) = parse_override(&lookup, ENV_PATTERN_CHOOSE_LIMIT) {
            self.patterns.choose_limit = limit;
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::SynthError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("viralsynth")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Log level for a `-v` count: the configured level without flags,
    /// otherwise info, debug and trace.
    pub fn log_level(&self, verbose: u8) -> &str {
        match verbose {
            0 => match self.general.log_level.trim() {
                "" => "warn",
                level => level,
            },
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.store.sqlite_path)
    }
}

fn parse_override(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a non-negative integer", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.ranking.limit, 10);
        assert_eq!(settings.ranking.days, 7);
        assert_eq!(settings.patterns.choose_limit, 5);
        assert_eq!(settings.store.provider, "sqlite");
        assert_eq!(settings.log_level(0), "warn");
    }

    #[test]
    fn test_log_level_follows_config_then_verbosity() {
        let mut settings = Settings::default();
        settings.general.log_level = "info".to_string();
        assert_eq!(settings.log_level(0), "info");
        assert_eq!(settings.log_level(1), "info");
        assert_eq!(settings.log_level(2), "debug");
        assert_eq!(settings.log_level(5), "trace");

        settings.general.log_level = "  ".to_string();
        assert_eq!(settings.log_level(0), "warn");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [ranking]
            niches = ["tech", "fitness"]
            "#,
        )
        .unwrap();
        assert_eq!(settings.ranking.niches, vec!["tech", "fitness"]);
        assert_eq!(settings.ranking.limit, 10);
        assert_eq!(settings.patterns.list_limit, 10);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_TRENDING_AUDIO_LIMIT, "25"),
            (ENV_PATTERN_CHOOSE_LIMIT, "many"),
        ]);
        let mut settings = Settings::default();
        settings.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));
        assert_eq!(settings.ranking.limit, 25);
        assert_eq!(settings.patterns.choose_limit, 5);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.ranking.days = 3;
        settings.store.provider = "memory".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.ranking.days, 3);
        assert_eq!(loaded.store.provider, "memory");
    }
}
