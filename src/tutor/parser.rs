//! Defensive parsing of generated vocabulary text.
//!
//! The generative backend is not contractually reliable: it may prepend
//! commentary, omit fields, vary the delimiter count, or invent labels. This
//! module is the one place hardened against that drift. Fallback tiers:
//! declared line position, then content-based sniffing, then per-line
//! skip-on-failure. Partial success is returned as-is; only zero extracted
//! records is an error.

use tracing::warn;

use crate::tutor::core::config::ParserConfig;
use crate::tutor::core::errors::{TutorError, TutorResult};
use crate::tutor::core::record::{LOOKUP_THEME, VocabRecord, normalize_cefr};

/// Field delimiter inside a generated data line.
const FIELD_DELIMITER: char = '|';

/// Status token marking a recognized English word in lookup output.
const STATUS_REAL: &str = "REAL";

/// Outcome of parsing a single-word lookup response.
#[derive(Clone, Debug)]
pub enum LookupOutcome {
    /// A validated record for a recognized word.
    Entry(VocabRecord),
    /// The backend judged the query not to be a real word; nothing to persist.
    NotAWord,
}

/// Substitute the requested theme only when it matches the controlled set.
///
/// Anything outside the configured topic list collapses to the reserved
/// [`LOOKUP_THEME`] label instead of leaking a model-invented category.
#[must_use]
pub fn normalize_theme(requested: &str, controlled_themes: &[String]) -> String {
    if controlled_themes.iter().any(|t| t == requested) {
        requested.to_string()
    } else {
        LOOKUP_THEME.to_string()
    }
}

/// Parse a multi-record batch of generated text into vocabulary records.
///
/// Every non-empty line is a candidate data row; rows that do not split into
/// at least `config.min_fields` fields are logged and skipped rather than
/// aborting the batch. The result is truncated to `count` records.
///
/// # Errors
/// Returns [`TutorError::Parse`] carrying the raw text only when zero records
/// could be extracted from a request for one or more.
pub fn parse_vocab_lines(
    raw: &str,
    config: &ParserConfig,
    controlled_themes: &[String],
    requested_theme: &str,
    count: usize,
) -> TutorResult<Vec<VocabRecord>> {
    let theme = normalize_theme(requested_theme, controlled_themes);
    let mut records = Vec::new();

    for line in data_lines(raw) {
        if records.len() >= count {
            break;
        }

        let fields = split_fields(line);
        if fields.len() < config.min_fields {
            warn!(line, fields = fields.len(), "skipping line with too few fields");
            continue;
        }

        let word = field_at(&fields, 0);
        if word.is_empty() {
            warn!(line, "skipping line with empty word field");
            continue;
        }

        records.push(VocabRecord {
            theme: theme.clone(),
            word,
            pos: field_at(&fields, 1),
            zh: field_at(&fields, 2),
            example: field_at(&fields, 3),
            example_zh: field_at(&fields, 4),
            cefr: normalize_cefr(&field_at(&fields, 5)),
        });
    }

    if records.is_empty() && count >= 1 {
        return Err(TutorError::Parse {
            raw: raw.to_string(),
        });
    }

    Ok(records)
}

/// Parse a single-word lookup response.
///
/// With the status-token prompt variant the data line reads
/// `status | word | pos | zh | example | example_zh | cefr`; a non-`REAL`
/// status yields [`LookupOutcome::NotAWord`]. Without a status token the
/// first line that sniffs as a data line is used directly, tolerating any
/// greeting or preamble the backend emits despite instructions.
///
/// # Errors
/// Returns [`TutorError::Parse`] carrying the raw text when no line sniffs as
/// a data line at all.
pub fn parse_lookup_line(
    raw: &str,
    config: &ParserConfig,
    fallback_word: &str,
) -> TutorResult<LookupOutcome> {
    let min_fields = if config.lookup_emits_status {
        config.lookup_min_fields
    } else {
        config.min_fields
    };

    // Data-line sniffing: never assume line 0 is the data line.
    let fields = data_lines(raw)
        .into_iter()
        .map(split_fields)
        .find(|fields| fields.len() >= min_fields)
        .ok_or_else(|| TutorError::Parse {
            raw: raw.to_string(),
        })?;

    let offset = if config.lookup_emits_status {
        let status = field_at(&fields, 0).to_uppercase();
        if status != STATUS_REAL {
            return Ok(LookupOutcome::NotAWord);
        }
        1
    } else {
        0
    };

    let mut word = field_at(&fields, offset);
    if word.is_empty() {
        word = fallback_word.trim().to_lowercase();
    }

    Ok(LookupOutcome::Entry(VocabRecord {
        theme: LOOKUP_THEME.to_string(),
        word,
        pos: field_at(&fields, offset + 1),
        zh: field_at(&fields, offset + 2),
        example: field_at(&fields, offset + 3),
        example_zh: field_at(&fields, offset + 4),
        cefr: normalize_cefr(&field_at(&fields, offset + 5)),
    }))
}

/// Non-empty, trimmed lines of the raw text.
fn data_lines(raw: &str) -> Vec<&str> {
    raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

/// Split a line on the pipe delimiter, trimming every field.
fn split_fields(line: &str) -> Vec<String> {
    line.split(FIELD_DELIMITER)
        .map(|f| f.trim().to_string())
        .collect()
}

fn field_at(fields: &[String], index: usize) -> String {
    fields.get(index).cloned().unwrap_or_default()
}
