//! Configuration for the tutor core.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::tutor::core::errors::{TutorError, TutorResult};

/// Top-level configuration for the tutor service.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Theme rotation settings.
    pub rotation: RotationConfig,
    /// Generated-text parser settings.
    pub parser: ParserConfig,
    /// Quiz settings.
    pub quiz: QuizConfig,
    /// Outbound reply settings.
    pub reply: ReplyConfig,
    /// Generative backend settings.
    pub llm: LlmConfig,
}

impl TutorConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> TutorResult<()> {
        if self.rotation.themes.is_empty() {
            return Err(TutorError::InvalidConfig(
                "rotation.themes must not be empty".to_string(),
            ));
        }

        for (i, a) in self.rotation.themes.iter().enumerate() {
            if a.trim().is_empty() {
                return Err(TutorError::InvalidConfig(format!(
                    "rotation.themes[{i}] is blank"
                )));
            }
            if self.rotation.themes[..i].contains(a) {
                return Err(TutorError::InvalidConfig(format!(
                    "rotation.themes contains duplicate {a:?}"
                )));
            }
        }

        crate::tutor::rotation::parse_date(&self.rotation.anchor_date)?;

        if self.rotation.daily_count == 0 {
            return Err(TutorError::InvalidConfig(
                "rotation.daily_count must be > 0".to_string(),
            ));
        }

        if self.parser.min_fields == 0 {
            return Err(TutorError::InvalidConfig(
                "parser.min_fields must be > 0".to_string(),
            ));
        }

        if self.parser.lookup_min_fields <= self.parser.min_fields {
            return Err(TutorError::InvalidConfig(
                "parser.lookup_min_fields must exceed parser.min_fields".to_string(),
            ));
        }

        if self.quiz.question_count == 0 {
            return Err(TutorError::InvalidConfig(
                "quiz.question_count must be > 0".to_string(),
            ));
        }

        if self.reply.max_chars == 0 {
            return Err(TutorError::InvalidConfig(
                "reply.max_chars must be > 0".to_string(),
            ));
        }

        if let Some(base_url) = &self.llm.base_url {
            Url::parse(base_url)?;
        }

        Ok(())
    }
}

/// Theme rotation settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Ordered list of themes to rotate through, one per day.
    pub themes: Vec<String>,
    /// Date (`YYYY-MM-DD`) that maps to `themes[0]`.
    pub anchor_date: String,
    /// Offset from UTC, in minutes, used to decide what "today" is.
    pub utc_offset_minutes: i32,
    /// Number of words in the daily list.
    pub daily_count: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            themes: [
                "daily life",
                "travel",
                "school",
                "work",
                "health",
                "small talk",
                "food",
                "email",
                "presentation",
                "customer service",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
            anchor_date: "2025-11-01".to_string(),
            // Taiwan time
            utc_offset_minutes: 8 * 60,
            daily_count: 5,
        }
    }
}

/// Generated-text parser settings.
///
/// The canonical data line is `word | pos | zh | example | example_zh | cefr`;
/// the lookup variant prepends a status token. These values document the
/// contract the external prompt template must honor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Minimum fields a line must split into to count as a data line.
    pub min_fields: usize,
    /// Minimum fields for a lookup line carrying the status token.
    pub lookup_min_fields: usize,
    /// Whether the lookup prompt variant emits a leading status token.
    pub lookup_emits_status: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            min_fields: 5,
            lookup_min_fields: 7,
            lookup_emits_status: true,
        }
    }
}

/// Quiz settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Questions per session, capped at 5 by the engine.
    pub question_count: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self { question_count: 5 }
    }
}

/// Outbound reply settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplyConfig {
    /// Maximum reply length in characters before truncation.
    pub max_chars: usize,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self { max_chars: 4900 }
    }
}

/// Generative backend settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name to request.
    pub model: String,
    /// Optional custom base URL.
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-flash-latest".to_string(),
            base_url: None,
            timeout_seconds: 30,
        }
    }
}
