//! In-memory record store implementation.
//!
//! Useful for testing and one-off analyses.

use super::{check_scope, PatternOrder, PatternQuery, RecordStore, VideoFilter};
use crate::error::{Result, SynthError};
use crate::models::{Pattern, RankingSnapshot, VideoRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::RwLock;

#[derive(Default)]
struct Tables {
    videos: Vec<VideoRecord>,
    patterns: Vec<Pattern>,
    rankings: Vec<RankingSnapshot>,
    next_video_id: i64,
    next_pattern_id: i64,
}

/// In-memory record store.
pub struct MemoryRecordStore {
    tables: RwLock<Tables>,
}

impl MemoryRecordStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    /// Create a store preloaded with video records.
    pub fn with_videos(records: Vec<VideoRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut tables) = store.tables.write() {
            for mut record in records {
                tables.next_video_id += 1;
                record.id.get_or_insert(tables.next_video_id);
                tables.videos.push(record);
            }
        }
        store
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|e| SynthError::Store(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|e| SynthError::Store(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert_videos(&self, records: &[VideoRecord]) -> Result<Vec<i64>> {
        let mut tables = self.write()?;
        let mut ids = Vec::with_capacity(records.len());
        for record in records {
            tables.next_video_id += 1;
            let id = tables.next_video_id;
            let mut stored = record.clone();
            stored.id = Some(id);
            tables.videos.push(stored);
            ids.push(id);
        }
        Ok(ids)
    }

    async fn videos(&self, filter: &VideoFilter) -> Result<Vec<VideoRecord>> {
        let tables = self.read()?;
        Ok(tables
            .videos
            .iter()
            .filter(|v| filter.matches(v))
            .cloned()
            .collect())
    }

    async fn insert_patterns(&self, patterns: &[Pattern]) -> Result<Vec<i64>> {
        let mut tables = self.write()?;
        let mut ids = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            tables.next_pattern_id += 1;
            let id = tables.next_pattern_id;
            let mut stored = pattern.clone();
            stored.id = Some(id);
            tables.patterns.push(stored);
            ids.push(id);
        }
        Ok(ids)
    }

    async fn patterns(&self, query: &PatternQuery) -> Result<Vec<Pattern>> {
        let tables = self.read()?;

        if let Some(ids) = &query.ids {
            return Ok(tables
                .patterns
                .iter()
                .filter(|p| p.id.is_some_and(|id| ids.contains(&id)))
                .cloned()
                .collect());
        }

        let mut result: Vec<Pattern> = tables
            .patterns
            .iter()
            .filter(|p| query.niche.as_deref().map_or(true, |n| p.niche == n))
            .cloned()
            .collect();

        // stable sort keeps insertion order among equal scores
        match query.order {
            PatternOrder::Prevalence => result.sort_by(|a, b| {
                b.prevalence
                    .partial_cmp(&a.prevalence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            PatternOrder::Engagement => result.sort_by(|a, b| {
                b.engagement_score
                    .partial_cmp(&a.engagement_score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
        }
        if let Some(limit) = query.limit {
            result.truncate(limit);
        }
        Ok(result)
    }

    async fn replace_rankings(
        &self,
        ranking_date: NaiveDate,
        niche: &str,
        rows: &[RankingSnapshot],
    ) -> Result<usize> {
        check_scope(ranking_date, niche, rows)?;
        let mut tables = self.write()?;
        tables.rankings.retain(|r| {
            r.ranking_date != ranking_date
                || r.niche != niche
                || rows.iter().any(|row| row.audio_id == r.audio_id)
        });
        for row in rows {
            let existing = tables.rankings.iter().position(|r| {
                r.ranking_date == row.ranking_date && r.niche == row.niche && r.audio_id == row.audio_id
            });
            match existing {
                Some(idx) => tables.rankings[idx] = row.clone(),
                None => tables.rankings.push(row.clone()),
            }
        }
        Ok(rows.len())
    }

    async fn rankings(
        &self,
        ranking_date: NaiveDate,
        niche: &str,
        limit: usize,
    ) -> Result<Vec<RankingSnapshot>> {
        let tables = self.read()?;
        let mut result: Vec<RankingSnapshot> = tables
            .rankings
            .iter()
            .filter(|r| r.ranking_date == ranking_date && r.niche == niche)
            .cloned()
            .collect();
        result.sort_by_key(|r| r.rank);
        result.truncate(limit);
        Ok(result)
    }
}
