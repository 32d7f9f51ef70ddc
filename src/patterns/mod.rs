//! Pattern mining.
//!
//! Turns transcripts into structural components (hook, core value loop,
//! narrative arc, visual formula, call to action) and groups videos that
//! share the exact same components into [`Pattern`](crate::models::Pattern)s.

mod extractor;
mod miner;

pub use extractor::{extract_components, split_sentences};
pub use miner::mine_patterns;

use serde::{Deserialize, Serialize};

/// Narrative arc label for transcripts that read like a story.
pub const ARC_STORY: &str = "story";

/// Narrative arc label for everything else.
pub const ARC_INFORMATIONAL: &str = "informational";

/// Visual formula used when a video has no visual style.
pub const UNSPECIFIED_VISUAL: &str = "unspecified";

/// Structural components of one video, used as the grouping key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatternComponents {
    pub hook: String,
    pub core_value_loop: String,
    pub narrative_arc: String,
    pub visual_formula: String,
    pub cta: String,
}
