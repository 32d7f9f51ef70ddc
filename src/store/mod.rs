//! Record store abstraction for ViralSynth.
//!
//! Provides a trait-based interface over the persistence backend that
//! supplies video records and keeps mined patterns and ranking snapshots.

mod memory;
mod sqlite;

pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;

use crate::config::Settings;
use crate::error::{Result, SynthError};
use crate::models::{Pattern, RankingSnapshot, VideoRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// Columns that identify a ranking snapshot row; upserts conflict on these.
pub const RANKING_CONFLICT_KEY: &str = "ranking_date, niche, audio_id";

/// Selection of video records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoFilter {
    /// Only records of this niche.
    pub niche: Option<String>,
    /// Only records with these ids. Takes precedence over `niche`.
    pub ids: Option<Vec<i64>>,
}

impl VideoFilter {
    /// Every stored record.
    pub fn all() -> Self {
        Self::default()
    }

    /// Records of one niche, or all records when `niche` is `None`.
    pub fn niche(niche: Option<&str>) -> Self {
        Self {
            niche: niche.map(str::to_string),
            ids: None,
        }
    }

    /// Records with the given ids.
    pub fn ids(ids: Vec<i64>) -> Self {
        Self {
            niche: None,
            ids: Some(ids),
        }
    }

    /// Check whether a record passes this filter.
    pub fn matches(&self, record: &VideoRecord) -> bool {
        if let Some(ids) = &self.ids {
            return record.id.is_some_and(|id| ids.contains(&id));
        }
        match &self.niche {
            Some(niche) => record.niche.as_deref() == Some(niche.as_str()),
            None => true,
        }
    }
}

/// Sort order for stored patterns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PatternOrder {
    /// Most prevalent first.
    #[default]
    Prevalence,
    /// Highest engagement first.
    Engagement,
}

/// Query over stored patterns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternQuery {
    pub niche: Option<String>,
    /// Explicit pattern ids. When set, niche and limit are ignored.
    pub ids: Option<Vec<i64>>,
    pub order: PatternOrder,
    pub limit: Option<usize>,
}

/// Trait for record store implementations.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Store video records, returning their assigned ids in input order.
    async fn insert_videos(&self, records: &[VideoRecord]) -> Result<Vec<i64>>;

    /// Fetch video records in insertion order.
    async fn videos(&self, filter: &VideoFilter) -> Result<Vec<VideoRecord>>;

    /// Store freshly mined patterns, returning their assigned ids in input order.
    async fn insert_patterns(&self, patterns: &[Pattern]) -> Result<Vec<i64>>;

    /// Fetch stored patterns.
    async fn patterns(&self, query: &PatternQuery) -> Result<Vec<Pattern>>;

    /// Replace the persisted ranking of one date and niche scope.
    ///
    /// Rows are upserted on [`RANKING_CONFLICT_KEY`] and rows of the scope
    /// whose audio id is not among `rows` are deleted, all atomically.
    /// Every row must belong to the scope.
    async fn replace_rankings(
        &self,
        ranking_date: NaiveDate,
        niche: &str,
        rows: &[RankingSnapshot],
    ) -> Result<usize>;

    /// Fetch the persisted ranking of one date and niche scope, ordered by rank.
    async fn rankings(
        &self,
        ranking_date: NaiveDate,
        niche: &str,
        limit: usize,
    ) -> Result<Vec<RankingSnapshot>>;
}

/// Reject rows outside the (date, niche) scope being replaced.
fn check_scope(ranking_date: NaiveDate, niche: &str, rows: &[RankingSnapshot]) -> Result<()> {
    match rows
        .iter()
        .find(|r| r.ranking_date != ranking_date || r.niche != niche)
    {
        Some(row) => Err(SynthError::InvalidInput(format!(
            "ranking row {} / {} / {} outside scope {} / {}",
            row.ranking_date, row.niche, row.audio_id, ranking_date, niche
        ))),
        None => Ok(()),
    }
}

/// Open the store configured in `settings`.
pub fn open_store(settings: &Settings) -> Result<Arc<dyn RecordStore>> {
    match settings.store.provider.to_lowercase().as_str() {
        "sqlite" => Ok(Arc::new(SqliteRecordStore::new(&settings.sqlite_path())?)),
        "memory" => Ok(Arc::new(MemoryRecordStore::new())),
        other => Err(SynthError::Config(format!(
            "Unknown store provider: {}",
            other
        ))),
    }
}
