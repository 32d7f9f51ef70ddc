//! Pipeline orchestrator for ViralSynth.
//!
//! Connects the record store to pattern mining, audio ranking and the
//! chooser. All analysis runs on records already fetched into memory.

use crate::chooser::{choose, ChooserDecision};
use crate::config::Settings;
use crate::error::Result;
use crate::models::{Pattern, TrendingAudio, VideoRecord};
use crate::patterns::mine_patterns;
use crate::ranking::{rank_audio, RankingJob};
use crate::store::{open_store, PatternOrder, PatternQuery, RecordStore, VideoFilter};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The main orchestrator for the ViralSynth pipeline.
pub struct Orchestrator {
    settings: Settings,
    store: Arc<dyn RecordStore>,
}

impl Orchestrator {
    /// Create an orchestrator with the store named in the settings.
    pub fn new(settings: Settings) -> Result<Self> {
        let store = open_store(&settings)?;
        Ok(Self { settings, store })
    }

    /// Create an orchestrator over an existing store.
    pub fn with_store(settings: Settings, store: Arc<dyn RecordStore>) -> Self {
        Self { settings, store }
    }

    /// Get a reference to the record store.
    pub fn store(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A ranking job over this orchestrator's store.
    pub fn ranking_job(&self) -> RankingJob {
        RankingJob::new(self.store.clone())
    }

    /// Store ingested video records, filling in `niche` where missing.
    #[instrument(skip(self, records))]
    pub async fn ingest(&self, mut records: Vec<VideoRecord>, niche: Option<&str>) -> Result<Vec<i64>> {
        if let Some(niche) = niche {
            for record in records.iter_mut().filter(|r| r.niche.is_none()) {
                record.niche = Some(niche.to_string());
            }
        }
        let ids = self.store.insert_videos(&records).await?;
        info!("Ingested {} video records", ids.len());
        Ok(ids)
    }

    /// Mine patterns for a niche without persisting them.
    #[instrument(skip(self))]
    pub async fn mine(&self, niche: &str) -> Result<Vec<Pattern>> {
        let records = self.store.videos(&VideoFilter::niche(Some(niche))).await?;
        Ok(mine_patterns(&records, niche))
    }

    /// Mine patterns for a niche and persist them.
    ///
    /// A failed write is logged and the mined patterns are still returned,
    /// without ids.
    #[instrument(skip(self))]
    pub async fn mine_and_store(&self, niche: &str) -> Result<Vec<Pattern>> {
        let mut patterns = self.mine(niche).await?;
        if patterns.is_empty() {
            info!("No records for niche {}, nothing to store", niche);
            return Ok(patterns);
        }

        match self.store.insert_patterns(&patterns).await {
            Ok(ids) => {
                for (pattern, id) in patterns.iter_mut().zip(ids) {
                    pattern.id = Some(id);
                }
            }
            Err(e) => warn!("Failed to store patterns for {}: {}", niche, e),
        }
        Ok(patterns)
    }

    /// Stored patterns, most prevalent first.
    pub async fn list_patterns(&self, niche: Option<&str>, limit: usize) -> Result<Vec<Pattern>> {
        self.store
            .patterns(&PatternQuery {
                niche: niche.map(str::to_string),
                ids: None,
                order: PatternOrder::Prevalence,
                limit: Some(limit),
            })
            .await
    }

    /// Live trending audio computed from the current records.
    #[instrument(skip(self))]
    pub async fn trending_audio(&self, niche: Option<&str>, limit: usize) -> Result<Vec<TrendingAudio>> {
        let records = self.store.videos(&VideoFilter::niche(niche)).await?;
        Ok(rank_audio(&records, limit))
    }

    /// Trending audio from the snapshot of `ranking_date`.
    pub async fn snapshot_audio(
        &self,
        ranking_date: NaiveDate,
        niche: Option<&str>,
        limit: usize,
    ) -> Result<Vec<TrendingAudio>> {
        self.ranking_job()
            .read_snapshot(ranking_date, niche, limit)
            .await
    }

    /// Load candidates from the store and pick the best pattern and audio.
    ///
    /// Explicit `pattern_ids` win over the niche's top patterns by
    /// engagement. Store failures leave the candidate list empty so the
    /// chooser falls back instead of failing.
    #[instrument(skip(self))]
    pub async fn choose_assets(&self, niche: Option<&str>, pattern_ids: Option<Vec<i64>>) -> ChooserDecision {
        let query = match pattern_ids {
            Some(ids) if !ids.is_empty() => PatternQuery {
                ids: Some(ids),
                ..Default::default()
            },
            _ => PatternQuery {
                niche: niche.map(str::to_string),
                ids: None,
                order: PatternOrder::Engagement,
                limit: Some(self.settings.patterns.choose_limit),
            },
        };

        let patterns = match self.store.patterns(&query).await {
            Ok(patterns) => patterns,
            Err(e) => {
                warn!("Failed to load candidate patterns: {}", e);
                Vec::new()
            }
        };

        let audios = match self.trending_audio(niche, self.settings.ranking.limit).await {
            Ok(audios) => audios,
            Err(e) => {
                warn!("Failed to rank candidate audio: {}", e);
                Vec::new()
            }
        };

        info!(
            "Choosing among {} patterns and {} audio tracks",
            patterns.len(),
            audios.len()
        );
        choose(niche, &patterns, &audios)
    }
}
