//! Daily ranking snapshot job.
//!
//! Computes trending audio per niche scope and stores the result as dated
//! snapshot rows, replacing whatever an earlier run stored for the same date
//! and niche. Running the job twice on the same records leaves the persisted
//! rows unchanged.

use super::{niche_label, rank_audio, scope_label};
use crate::error::Result;
use crate::models::{RankingSnapshot, TrendingAudio};
use crate::store::{RecordStore, VideoFilter};
use chrono::{Days, NaiveDate};
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A (date, niche) pair that could not be ranked or persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotFailure {
    pub ranking_date: NaiveDate,
    pub niche: String,
    pub error: String,
}

/// Outcome of a snapshot run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotSummary {
    /// Ranked audio ids per date and niche label.
    pub rankings: BTreeMap<NaiveDate, BTreeMap<String, Vec<String>>>,
    /// Pairs that failed; they do not stop the rest of the run.
    pub failures: Vec<SnapshotFailure>,
}

impl SnapshotSummary {
    /// Fold another summary into this one.
    pub fn merge(&mut self, other: SnapshotSummary) {
        for (date, per_niche) in other.rankings {
            self.rankings.entry(date).or_default().extend(per_niche);
        }
        self.failures.extend(other.failures);
    }

    /// Whether every pair was ranked and persisted.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// The ranking snapshot job.
pub struct RankingJob {
    store: Arc<dyn RecordStore>,
}

impl RankingJob {
    /// Create a job writing to `store`.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Snapshot the ranking of every niche scope for one date.
    ///
    /// `None` or an empty list ranks across all niches at once. Scopes are
    /// processed concurrently; each owns a disjoint key space.
    #[instrument(skip(self, niches))]
    pub async fn snapshot(
        &self,
        niches: Option<&[String]>,
        ranking_date: NaiveDate,
        limit: usize,
    ) -> SnapshotSummary {
        let scopes = scopes(niches);
        let results = join_all(
            scopes
                .iter()
                .map(|scope| self.snapshot_scope(ranking_date, scope.as_deref(), limit)),
        )
        .await;

        let mut summary = SnapshotSummary::default();
        let per_niche = summary.rankings.entry(ranking_date).or_default();

        for (scope, result) in scopes.iter().zip(results) {
            let label = niche_label(scope.as_deref()).to_string();
            match result {
                Ok(audio_ids) => {
                    per_niche.insert(label, audio_ids);
                }
                Err(e) => {
                    warn!("Ranking failed for {} / {}: {}", ranking_date, label, e);
                    summary.failures.push(SnapshotFailure {
                        ranking_date,
                        niche: label,
                        error: e.to_string(),
                    });
                }
            }
        }

        summary
    }

    /// Snapshot `days` consecutive dates ending at `today`.
    pub async fn run(
        &self,
        niches: Option<&[String]>,
        days: u32,
        today: NaiveDate,
        limit: usize,
    ) -> SnapshotSummary {
        let mut summary = SnapshotSummary::default();
        for offset in 0..days {
            let Some(ranking_date) = today.checked_sub_days(Days::new(offset as u64)) else {
                break;
            };
            summary.merge(self.snapshot(niches, ranking_date, limit).await);
        }

        info!(
            "Ranking run finished: {} dates, {} failures",
            summary.rankings.len(),
            summary.failures.len()
        );
        summary
    }

    /// Read a persisted snapshot ordered by rank, without recomputing.
    #[instrument(skip(self))]
    pub async fn read_snapshot(
        &self,
        ranking_date: NaiveDate,
        niche: Option<&str>,
        limit: usize,
    ) -> Result<Vec<TrendingAudio>> {
        let rows = self
            .store
            .rankings(ranking_date, scope_label(niche)?, limit)
            .await?;
        Ok(rows.into_iter().map(RankingSnapshot::into_audio).collect())
    }

    /// Rank one niche scope and replace its stored rows.
    async fn snapshot_scope(
        &self,
        ranking_date: NaiveDate,
        niche: Option<&str>,
        limit: usize,
    ) -> Result<Vec<String>> {
        let label = scope_label(niche)?;
        let records = self.store.videos(&VideoFilter::niche(niche)).await?;
        let ranked = rank_audio(&records, limit);

        let rows: Vec<RankingSnapshot> = ranked
            .iter()
            .enumerate()
            .map(|(idx, audio)| RankingSnapshot::from_audio(ranking_date, label, audio, idx as u32 + 1))
            .collect();
        self.store.replace_rankings(ranking_date, label, &rows).await?;

        info!("Ranked {} audio tracks for {} / {}", rows.len(), ranking_date, label);
        Ok(ranked.into_iter().map(|a| a.audio_id).collect())
    }
}

/// Distinct niche scopes in input order; `None` stands for all niches.
fn scopes(niches: Option<&[String]>) -> Vec<Option<String>> {
    let mut scopes: Vec<Option<String>> = Vec::new();
    for niche in niches.unwrap_or_default() {
        let scope = Some(niche.clone());
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }
    if scopes.is_empty() {
        scopes.push(None);
    }
    scopes
}
