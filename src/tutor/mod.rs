//! Vocabulary tutor core.
//!
//! Organized into:
//! - `core`: Configuration, errors, and record types
//! - `rotation`: Pure date-anchored theme rotation
//! - `parser`: Defensive parsing of generated vocabulary text
//! - `prompts`: Prompt templates for the generative backend
//! - `quiz`: Per-user multiple-choice quiz sessions
//! - `service`: Dialogue routing and the daily/lookup/quiz flows

pub mod core;
pub mod parser;
pub mod prompts;
pub mod quiz;
pub mod rotation;
pub mod service;

// Re-export commonly used types for convenience
pub use self::core::{
    CEFR_LEVELS, LOOKUP_THEME, LlmConfig, ParserConfig, QuizConfig, ReplyConfig, RotationConfig,
    TutorConfig, TutorError, TutorResult, VocabRecord, WrongAnswer, normalize_cefr,
};
pub use parser::{LookupOutcome, normalize_theme, parse_lookup_line, parse_vocab_lines};
pub use prompts::{lookup_prompt, vocab_prompt};
pub use quiz::{
    AnswerOutcome, MIN_POOL, NumberedQuestion, OPTION_COUNT, QuizEngine, QuizQuestion, QuizStep,
    QuizSummary,
};
pub use rotation::{DATE_FORMAT, parse_date, theme_for_date, today_date_string};
pub use service::TutorService;
