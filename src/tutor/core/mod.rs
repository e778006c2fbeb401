//! Core types for the tutor: configuration, errors, and records.

pub mod config;
pub mod errors;
pub mod record;

pub use config::{
    LlmConfig, ParserConfig, QuizConfig, ReplyConfig, RotationConfig, TutorConfig,
};
pub use errors::{TutorError, TutorResult};
pub use record::{CEFR_LEVELS, LOOKUP_THEME, VocabRecord, WrongAnswer, normalize_cefr};
