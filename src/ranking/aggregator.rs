//! Trending audio aggregation.

use crate::models::{TrendingAudio, VideoRecord};
use std::collections::HashMap;
use tracing::debug;

/// Running totals for one audio id.
struct AudioTally {
    audio_id: String,
    count: u64,
    engagement: f64,
    url: Option<String>,
    audio_hash: Option<String>,
    niche: Option<String>,
}

/// Rank audio tracks by how many records use them.
///
/// Records without an audio id are skipped. The url and hash of the first
/// record using an audio id stick, as does the first niche present. Ties in
/// usage keep the order in which the audio ids were first encountered.
/// The full record set is re-scanned on every call.
pub fn rank_audio(records: &[VideoRecord], limit: usize) -> Vec<TrendingAudio> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tallies: Vec<AudioTally> = Vec::new();

    for record in records {
        let Some(audio_id) = record.audio_key() else {
            continue;
        };

        let slot = *index.entry(audio_id).or_insert_with(|| {
            tallies.push(AudioTally {
                audio_id: audio_id.to_string(),
                count: 0,
                engagement: 0.0,
                url: record.audio_url.clone().or_else(|| record.url.clone()),
                audio_hash: record.audio_hash.clone(),
                niche: None,
            });
            tallies.len() - 1
        });

        let tally = &mut tallies[slot];
        tally.count += 1;
        tally.engagement += record.engagement() as f64;
        if tally.niche.is_none() {
            tally.niche = record.niche.clone();
        }
    }

    debug!("Aggregated {} distinct audio ids", tallies.len());

    // sort_by is stable, so equal counts keep first-seen order
    tallies.sort_by(|a, b| b.count.cmp(&a.count));
    tallies.truncate(limit);

    tallies
        .into_iter()
        .map(|tally| {
            let avg_engagement = if tally.count > 0 {
                tally.engagement / tally.count as f64
            } else {
                0.0
            };
            TrendingAudio {
                audio_id: tally.audio_id,
                audio_hash: tally.audio_hash.unwrap_or_default(),
                count: tally.count,
                avg_engagement,
                url: tally.url,
                niche: tally.niche,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(audio_id: &str, likes: u64) -> VideoRecord {
        VideoRecord {
            audio_id: Some(audio_id.to_string()),
            audio_url: Some(format!("u-{}", audio_id)),
            audio_hash: Some(format!("h-{}", audio_id)),
            niche: Some("tech".to_string()),
            likes: Some(likes),
            comments: Some(0),
            ..Default::default()
        }
    }

    #[test]
    fn test_rank_by_usage() {
        let records = vec![record("a1", 10), record("a1", 5), record("a2", 1)];
        let ranked = rank_audio(&records, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].audio_id, "a1");
        assert_eq!(ranked[0].count, 2);
        assert!((ranked[0].avg_engagement - 7.5).abs() < 1e-9);
        assert_eq!(ranked[0].url.as_deref(), Some("u-a1"));
        assert_eq!(ranked[0].audio_hash, "h-a1");
        assert_eq!(ranked[0].niche.as_deref(), Some("tech"));
        assert_eq!(ranked[1].audio_id, "a2");
        assert_eq!(ranked[1].count, 1);
        assert!((ranked[1].avg_engagement - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_huge_counters_do_not_overflow() {
        let mut big = record("a1", u64::MAX);
        big.comments = Some(1);
        let records = vec![big, record("a1", u64::MAX)];

        let ranked = rank_audio(&records, 10);
        assert_eq!(ranked[0].count, 2);
        assert!((ranked[0].avg_engagement - u64::MAX as f64).abs() / (u64::MAX as f64) < 1e-9);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let records = vec![
            record("b", 1),
            record("a", 100),
            record("c", 3),
            record("c", 3),
        ];
        let ids: Vec<String> = rank_audio(&records, 10)
            .into_iter()
            .map(|a| a.audio_id)
            .collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_skips_missing_audio_ids() {
        let mut no_audio = record("", 50);
        no_audio.audio_id = None;
        let records = vec![record("", 50), no_audio, record("a1", 2)];
        let ranked = rank_audio(&records, 10);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].audio_id, "a1");
    }

    #[test]
    fn test_first_seen_metadata_wins() {
        let mut first = record("a1", 1);
        first.audio_hash = None;
        first.audio_url = None;
        first.url = Some("video-url".to_string());
        first.niche = None;
        let mut second = record("a1", 1);
        second.niche = Some("fitness".to_string());
        let mut third = record("a1", 1);
        third.audio_url = Some("other".to_string());
        third.niche = Some("cooking".to_string());

        let ranked = rank_audio(&[first, second, third], 1);
        assert_eq!(ranked[0].url.as_deref(), Some("video-url"));
        assert_eq!(ranked[0].audio_hash, "");
        assert_eq!(ranked[0].niche.as_deref(), Some("fitness"));
    }

    #[test]
    fn test_limit_and_empty_input() {
        let records = vec![record("a1", 1), record("a2", 1), record("a3", 1)];
        assert_eq!(rank_audio(&records, 2).len(), 2);
        assert!(rank_audio(&records, 0).is_empty());
        assert!(rank_audio(&[], 5).is_empty());
    }
}
