//! Grouping of video records into patterns.

use super::{extract_components, PatternComponents};
use crate::models::{Pattern, VideoRecord};
use std::collections::HashMap;
use tracing::debug;

/// Running totals for one component group.
struct Group {
    components: PatternComponents,
    count: u64,
    engagement: f64,
}

/// Group records by identical components and compute per-group statistics.
///
/// Patterns are returned in the order their components were first seen.
/// An empty batch yields no patterns.
pub fn mine_patterns(records: &[VideoRecord], niche: &str) -> Vec<Pattern> {
    let total = records.len();
    let mut index: HashMap<PatternComponents, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for record in records {
        let components = extract_components(record);
        let slot = match index.get(&components) {
            Some(&slot) => slot,
            None => {
                index.insert(components.clone(), groups.len());
                groups.push(Group {
                    components,
                    count: 0,
                    engagement: 0.0,
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[slot];
        group.count += 1;
        group.engagement += record.engagement() as f64;
    }

    debug!("Mined {} patterns from {} records", groups.len(), total);

    groups
        .into_iter()
        .map(|group| {
            let prevalence = if total > 0 {
                group.count as f64 / total as f64
            } else {
                0.0
            };
            let engagement_score = if group.count > 0 {
                group.engagement / group.count as f64
            } else {
                0.0
            };
            let PatternComponents {
                hook,
                core_value_loop,
                narrative_arc,
                visual_formula,
                cta,
            } = group.components;

            Pattern {
                id: None,
                hook,
                core_value_loop,
                narrative_arc,
                visual_formula,
                cta,
                niche: niche.to_string(),
                prevalence,
                engagement_score,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{ARC_INFORMATIONAL, ARC_STORY};

    fn record(transcript: &str, visual: &str, likes: u64, comments: u64) -> VideoRecord {
        VideoRecord {
            transcript: Some(transcript.to_string()),
            visual_style: Some(visual.to_string()),
            likes: Some(likes),
            comments: Some(comments),
            ..Default::default()
        }
    }

    fn sample() -> Vec<VideoRecord> {
        vec![
            record(
                "Try this growth hack. Step one post daily. Follow for more tips.",
                "lofi",
                10,
                5,
            ),
            record(
                "Try this growth hack. Step one post daily. Follow for more tips.",
                "lofi",
                20,
                10,
            ),
            record(
                "Here is my story. I failed once. Now I teach others. Subscribe for more.",
                "cinematic",
                5,
                0,
            ),
        ]
    }

    #[test]
    fn test_groups_and_stats() {
        let patterns = mine_patterns(&sample(), "marketing");
        assert_eq!(patterns.len(), 2);

        let p1 = patterns
            .iter()
            .find(|p| p.hook == "Try this growth hack")
            .unwrap();
        assert!((p1.prevalence - 2.0 / 3.0).abs() < 1e-9);
        assert!((p1.engagement_score - 22.5).abs() < 1e-9);
        assert_eq!(p1.narrative_arc, ARC_INFORMATIONAL);
        assert_eq!(p1.visual_formula, "lofi");
        assert_eq!(p1.niche, "marketing");
        assert_eq!(p1.id, None);

        let p2 = patterns
            .iter()
            .find(|p| p.hook == "Here is my story")
            .unwrap();
        assert!((p2.prevalence - 1.0 / 3.0).abs() < 1e-9);
        assert!((p2.engagement_score - 5.0).abs() < 1e-9);
        assert_eq!(p2.narrative_arc, ARC_STORY);
        assert_eq!(p2.core_value_loop, "I failed once Now I teach others");
    }

    #[test]
    fn test_first_seen_order() {
        let mut records = sample();
        records.rotate_left(2);
        let patterns = mine_patterns(&records, "marketing");
        assert_eq!(patterns[0].hook, "Here is my story");
        assert_eq!(patterns[1].hook, "Try this growth hack");
    }

    #[test]
    fn test_prevalence_sums_to_one() {
        let mut records = sample();
        records.push(record("Once upon a time.", "", 0, 0));
        records.push(VideoRecord::default());
        records.push(record("Different hook. Same visual.", "lofi", 1, 1));

        let patterns = mine_patterns(&records, "mixed");
        let sum: f64 = patterns.iter().map(|p| p.prevalence).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_visual_style_splits_groups() {
        let records = vec![
            record("Same words. Here.", "lofi", 1, 0),
            record("Same words. Here.", "cinematic", 1, 0),
        ];
        assert_eq!(mine_patterns(&records, "x").len(), 2);
    }

    #[test]
    fn test_missing_engagement_counts_as_zero() {
        let records = vec![
            VideoRecord {
                transcript: Some("Hook.".to_string()),
                likes: Some(4),
                ..Default::default()
            },
            VideoRecord {
                transcript: Some("Hook.".to_string()),
                ..Default::default()
            },
        ];
        let patterns = mine_patterns(&records, "x");
        assert_eq!(patterns.len(), 1);
        assert!((patterns[0].engagement_score - 2.0).abs() < 1e-9);
        assert!((patterns[0].prevalence - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_huge_counters_do_not_overflow() {
        let records = vec![
            record("Hook.", "lofi", u64::MAX, 1),
            record("Hook.", "lofi", u64::MAX, 0),
        ];
        let patterns = mine_patterns(&records, "x");
        assert_eq!(patterns.len(), 1);
        assert!(patterns[0].engagement_score.is_finite());
        assert!(patterns[0].engagement_score > 1e19);
    }

    #[test]
    fn test_empty_input() {
        assert!(mine_patterns(&[], "fitness").is_empty());
    }
}
