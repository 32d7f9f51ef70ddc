//! Shared entity definitions.
//!
//! Video records come in from the record store; patterns, trending audio and
//! ranking snapshots are produced by the analysis modules and written back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An analyzed short-form video as handed over by the record store.
///
/// Every field except the engagement counters is optional so that partially
/// enriched records still flow through the analysis without failing a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoRecord {
    /// Store-assigned row id.
    pub id: Option<i64>,
    /// Source URL of the video.
    pub url: Option<String>,
    /// Niche the video was ingested under.
    pub niche: Option<String>,
    /// Transcribed audio text.
    pub transcript: Option<String>,
    /// Visual style classification such as "cinematic" or "lofi".
    pub visual_style: Option<String>,
    /// Text detected on screen.
    pub onscreen_text: Option<String>,
    /// Identifier of the video's audio track.
    pub audio_id: Option<String>,
    /// URL of the audio track.
    pub audio_url: Option<String>,
    /// Content hash of the audio track.
    pub audio_hash: Option<String>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
}

impl VideoRecord {
    /// Likes plus comments, missing counters count as zero. Saturates at `u64::MAX`.
    pub fn engagement(&self) -> u64 {
        self.likes.unwrap_or(0).saturating_add(self.comments.unwrap_or(0))
    }

    /// Transcript text, empty when absent.
    pub fn transcript_text(&self) -> &str {
        self.transcript.as_deref().unwrap_or("")
    }

    /// Audio id if present and non-empty.
    pub fn audio_key(&self) -> Option<&str> {
        self.audio_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A recurring structural pattern mined from a batch of videos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pattern {
    /// Store-assigned id, absent until persisted.
    pub id: Option<i64>,
    pub hook: String,
    pub core_value_loop: String,
    pub narrative_arc: String,
    pub visual_formula: String,
    pub cta: String,
    pub niche: String,
    /// Share of the analyzed batch using this pattern, in `[0, 1]`.
    pub prevalence: f64,
    /// Mean engagement of the videos in this pattern.
    pub engagement_score: f64,
}

/// Usage and engagement statistics of one audio track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendingAudio {
    pub audio_id: String,
    pub audio_hash: String,
    /// Number of videos using this audio.
    pub count: u64,
    pub avg_engagement: f64,
    pub url: Option<String>,
    /// First niche seen for this audio.
    pub niche: Option<String>,
}

/// A dated, ranked projection of a trending audio computation.
///
/// Rows are unique on `(ranking_date, niche, audio_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSnapshot {
    pub ranking_date: NaiveDate,
    /// Niche scope the ranking was computed for (`all` for every niche).
    pub niche: String,
    pub audio_id: String,
    pub audio_hash: String,
    pub url: Option<String>,
    pub count: u64,
    pub avg_engagement: f64,
    /// 1-based position in the ranking.
    pub rank: u32,
}

impl RankingSnapshot {
    /// Build the snapshot row for an audio at a given rank.
    pub fn from_audio(ranking_date: NaiveDate, niche: &str, audio: &TrendingAudio, rank: u32) -> Self {
        Self {
            ranking_date,
            niche: niche.to_string(),
            audio_id: audio.audio_id.clone(),
            audio_hash: audio.audio_hash.clone(),
            url: audio.url.clone(),
            count: audio.count,
            avg_engagement: audio.avg_engagement,
            rank,
        }
    }

    /// Convert a persisted row back into the trending audio shape.
    pub fn into_audio(self) -> TrendingAudio {
        let niche = if self.niche == crate::ranking::ALL_NICHES {
            None
        } else {
            Some(self.niche)
        };
        TrendingAudio {
            audio_id: self.audio_id,
            audio_hash: self.audio_hash,
            count: self.count,
            avg_engagement: self.avg_engagement,
            url: self.url,
            niche,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_treats_missing_as_zero() {
        let rec = VideoRecord {
            likes: Some(12),
            comments: None,
            ..Default::default()
        };
        assert_eq!(rec.engagement(), 12);
        assert_eq!(VideoRecord::default().engagement(), 0);
    }

    #[test]
    fn test_engagement_saturates() {
        let rec = VideoRecord {
            likes: Some(u64::MAX),
            comments: Some(1),
            ..Default::default()
        };
        assert_eq!(rec.engagement(), u64::MAX);
    }

    #[test]
    fn test_audio_key_skips_empty_ids() {
        let mut rec = VideoRecord {
            audio_id: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(rec.audio_key(), None);
        rec.audio_id = Some("a1".to_string());
        assert_eq!(rec.audio_key(), Some("a1"));
    }

    #[test]
    fn test_record_deserializes_with_nulls_and_missing_fields() {
        let rec: VideoRecord =
            serde_json::from_str(r#"{"transcript": null, "likes": 3, "niche": "tech"}"#).unwrap();
        assert_eq!(rec.transcript_text(), "");
        assert_eq!(rec.engagement(), 3);
        assert_eq!(rec.niche.as_deref(), Some("tech"));
    }

    #[test]
    fn test_snapshot_for_all_niches_has_no_niche() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let audio = TrendingAudio {
            audio_id: "a1".to_string(),
            count: 2,
            niche: Some("tech".to_string()),
            ..Default::default()
        };
        let row = RankingSnapshot::from_audio(date, crate::ranking::ALL_NICHES, &audio, 1);
        assert_eq!(row.into_audio().niche, None);
    }
}
