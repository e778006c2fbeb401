//! Vocabulary record types shared across the tutor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reserved theme label for records that did not come from a themed batch.
pub const LOOKUP_THEME: &str = "lookup";

/// The six canonical CEFR proficiency tiers.
pub const CEFR_LEVELS: [&str; 6] = ["A1", "A2", "B1", "B2", "C1", "C2"];

/// Normalize a raw CEFR field.
///
/// The value is upper-cased and kept only when it is one of the six canonical
/// levels; anything else becomes the empty string.
#[must_use]
pub fn normalize_cefr(raw: &str) -> String {
    let upper = raw.trim().to_uppercase();
    if CEFR_LEVELS.contains(&upper.as_str()) {
        upper
    } else {
        String::new()
    }
}

/// One validated vocabulary entry.
///
/// Created by the parser from one line of generated text and immutable
/// thereafter; corrections are new records, never in-place edits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabRecord {
    /// Theme the record belongs to, or [`LOOKUP_THEME`] for single lookups.
    pub theme: String,
    /// The word or short phrase itself. Never empty.
    pub word: String,
    /// Part of speech abbreviation (`n.` / `v.` / `adj.` / ...).
    pub pos: String,
    /// Core Traditional Chinese gloss.
    pub zh: String,
    /// English example sentence.
    pub example: String,
    /// Traditional Chinese translation of the example.
    pub example_zh: String,
    /// CEFR level, one of [`CEFR_LEVELS`] or empty.
    pub cefr: String,
}

/// A missed quiz question, persisted for later review.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WrongAnswer {
    /// Key of the user who answered.
    pub user_key: String,
    /// The word that was asked.
    pub word: String,
    /// Gloss shown as the question prompt.
    pub zh: String,
    /// Option label the user picked.
    pub chosen: String,
    /// All option labels shown, in display order.
    pub options: Vec<String>,
    /// Kind of quiz the question came from.
    pub quiz_type: String,
    /// When the answer was submitted.
    pub answered_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cefr_canonical_levels_pass_through() {
        assert_eq!(normalize_cefr("b1"), "B1");
        assert_eq!(normalize_cefr(" C2 "), "C2");
    }

    #[test]
    fn cefr_garbage_becomes_empty() {
        assert_eq!(normalize_cefr("Z9"), "");
        assert_eq!(normalize_cefr("beginner"), "");
        assert_eq!(normalize_cefr(""), "");
    }
}
