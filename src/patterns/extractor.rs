//! Component extraction for a single video record.

use super::{PatternComponents, ARC_INFORMATIONAL, ARC_STORY, UNSPECIFIED_VISUAL};
use crate::models::VideoRecord;

/// Words that mark a transcript as story driven.
const STORY_MARKERS: [&str; 3] = ["story", "journey", "once"];

/// Split text into sentences on `.` after collapsing newlines.
///
/// Sentences are trimmed and empty ones dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.replace('\n', " ")
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Extract the pattern components of one record.
///
/// The hook is the first sentence, the call to action the last one (only
/// when there are at least two) and the core value loop everything in
/// between (only when there are at least three).
pub fn extract_components(record: &VideoRecord) -> PatternComponents {
    let transcript = record.transcript_text();
    let sentences = split_sentences(transcript);
    let n = sentences.len();

    let hook = sentences.first().cloned().unwrap_or_default();
    let cta = if n > 1 {
        sentences[n - 1].clone()
    } else {
        String::new()
    };
    let core_value_loop = if n > 2 {
        sentences[1..n - 1].join(" ")
    } else {
        String::new()
    };

    let lowered = transcript.to_lowercase();
    let narrative_arc = if STORY_MARKERS.iter().any(|w| lowered.contains(w)) {
        ARC_STORY
    } else {
        ARC_INFORMATIONAL
    };

    let visual_formula = record
        .visual_style
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(UNSPECIFIED_VISUAL);

    PatternComponents {
        hook,
        core_value_loop,
        narrative_arc: narrative_arc.to_string(),
        visual_formula: visual_formula.to_string(),
        cta,
    }
}
