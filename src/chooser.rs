//! Deterministic chooser for the best pattern and audio.
//!
//! Scores candidates with fixed linear weights and explains the pick. The
//! same inputs always produce the same decision.

use crate::models::{Pattern, TrendingAudio};
use serde::Serialize;

const PATTERN_PREVALENCE_WEIGHT: f64 = 0.6;
const PATTERN_ENGAGEMENT_WEIGHT: f64 = 0.4;
const AUDIO_USAGE_WEIGHT: f64 = 0.4;
const AUDIO_ENGAGEMENT_WEIGHT: f64 = 0.6;

/// Audio id of the stand-in used when no audio candidates exist.
pub const FALLBACK_AUDIO_ID: &str = "fallback-audio";

const PATTERN_EXPLANATION: &str =
    "Weighted prevalence (60%) and engagement (40%) produced the top pattern";
const AUDIO_EXPLANATION: &str = "Weighted usage (40%) and engagement (60%) yielded the top audio";

/// Why a pattern was picked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternReason {
    pub pattern_id: Option<i64>,
    pub hook: String,
    pub prevalence: f64,
    pub engagement_score: f64,
    pub score: f64,
    pub explanation: String,
}

/// Why an audio track was picked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioReason {
    pub audio_id: String,
    pub usage_count: u64,
    pub avg_engagement: f64,
    pub score: f64,
    pub explanation: String,
}

/// Machine-readable justification of a decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Justification {
    pub pattern: PatternReason,
    pub audio: AudioReason,
}

/// The chosen pattern and audio with the reasons for both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChooserDecision {
    pub pattern: Pattern,
    pub audio: TrendingAudio,
    pub justification: Justification,
}

/// Zero for NaN and infinities.
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Weighted score of a pattern.
pub fn pattern_score(pattern: &Pattern) -> f64 {
    finite_or_zero(pattern.prevalence) * PATTERN_PREVALENCE_WEIGHT
        + finite_or_zero(pattern.engagement_score) * PATTERN_ENGAGEMENT_WEIGHT
}

/// Weighted score of an audio track.
pub fn audio_score(audio: &TrendingAudio) -> f64 {
    audio.count as f64 * AUDIO_USAGE_WEIGHT
        + finite_or_zero(audio.avg_engagement) * AUDIO_ENGAGEMENT_WEIGHT
}

/// Stand-in pattern used when there are no candidates.
pub fn fallback_pattern(niche: Option<&str>) -> Pattern {
    Pattern {
        id: None,
        hook: format!(
            "High-performing hook for {} creators",
            niche.unwrap_or("general")
        ),
        core_value_loop: "Deliver three rapid-fire insights with proof points.".to_string(),
        narrative_arc: "Start with a bold claim, validate with evidence, close with CTA.".to_string(),
        visual_formula: "Talking head with dynamic text overlays".to_string(),
        cta: "Follow for more breakdowns".to_string(),
        niche: niche.unwrap_or_default().to_string(),
        prevalence: 0.0,
        engagement_score: 0.0,
    }
}

/// Stand-in audio used when there are no candidates.
pub fn fallback_audio(niche: Option<&str>) -> TrendingAudio {
    TrendingAudio {
        audio_id: FALLBACK_AUDIO_ID.to_string(),
        audio_hash: String::new(),
        count: 0,
        avg_engagement: 0.0,
        url: None,
        niche: niche.map(str::to_string),
    }
}

/// First candidate with the highest score.
fn best<'a, T>(candidates: &'a [T], score: impl Fn(&T) -> f64) -> Option<(&'a T, f64)> {
    let mut best: Option<(&T, f64)> = None;
    for candidate in candidates {
        let s = score(candidate);
        match best {
            Some((_, top)) if s <= top => {}
            _ => best = Some((candidate, s)),
        }
    }
    best
}

/// Pick the best pattern and the best audio.
///
/// Empty candidate lists are replaced by a single fallback before scoring,
/// so this never fails.
pub fn choose(niche: Option<&str>, patterns: &[Pattern], audios: &[TrendingAudio]) -> ChooserDecision {
    let fallback_patterns;
    let patterns = if patterns.is_empty() {
        fallback_patterns = [fallback_pattern(niche)];
        &fallback_patterns[..]
    } else {
        patterns
    };

    let fallback_audios;
    let audios = if audios.is_empty() {
        fallback_audios = [fallback_audio(niche)];
        &fallback_audios[..]
    } else {
        audios
    };

    // both slices are non-empty here
    let (pattern, p_score) = best(patterns, pattern_score).unwrap_or((&patterns[0], 0.0));
    let (audio, a_score) = best(audios, audio_score).unwrap_or((&audios[0], 0.0));

    let justification = Justification {
        pattern: PatternReason {
            pattern_id: pattern.id,
            hook: pattern.hook.clone(),
            prevalence: finite_or_zero(pattern.prevalence),
            engagement_score: finite_or_zero(pattern.engagement_score),
            score: p_score,
            explanation: PATTERN_EXPLANATION.to_string(),
        },
        audio: AudioReason {
            audio_id: audio.audio_id.clone(),
            usage_count: audio.count,
            avg_engagement: finite_or_zero(audio.avg_engagement),
            score: a_score,
            explanation: AUDIO_EXPLANATION.to_string(),
        },
    };

    ChooserDecision {
        pattern: pattern.clone(),
        audio: audio.clone(),
        justification,
    }
}
