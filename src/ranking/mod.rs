//! Trending audio ranking.
//!
//! Aggregates audio usage across video records and persists dated,
//! per-niche ranking snapshots.

mod aggregator;
mod job;

pub use aggregator::rank_audio;
pub use job::{RankingJob, SnapshotFailure, SnapshotSummary};

use crate::error::{Result, SynthError};

/// Niche label used for rankings computed across every niche.
pub const ALL_NICHES: &str = "all";

/// Storage label of a niche scope.
pub fn niche_label(niche: Option<&str>) -> &str {
    niche.unwrap_or(ALL_NICHES)
}

/// Storage label of a niche scope, refusing a real niche that would collide
/// with the all-niches label.
pub fn scope_label(niche: Option<&str>) -> Result<&str> {
    match niche {
        Some(name) if name == ALL_NICHES => Err(SynthError::InvalidInput(format!(
            "niche name '{}' is reserved for rankings across all niches",
            ALL_NICHES
        ))),
        _ => Ok(niche_label(niche)),
    }
}
