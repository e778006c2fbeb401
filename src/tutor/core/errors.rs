//! Error types for the tutor core.

use thiserror::Error;

/// Tutor error type covering configuration, parsing, quiz state, and
/// collaborator transport failures.
#[derive(Debug, Error)]
pub enum TutorError {
    /// Invalid static configuration. Fatal at startup.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Zero usable records could be extracted from generated text.
    #[error("no usable records in generated text")]
    Parse {
        /// The raw backend output, kept for logging and fallback replies.
        raw: String,
    },
    /// Quiz start requested with too few distinct candidate records.
    #[error("candidate pool too small: have {have}, need {need}")]
    InsufficientPool {
        /// Distinct candidates available.
        have: usize,
        /// Minimum required to build a question set.
        need: usize,
    },
    /// Answer submitted by a user with no session in the table.
    #[error("no active quiz session for this user")]
    NoActiveSession,
    /// Answer text does not map to one of the option positions.
    #[error("unrecognized answer: {0:?}")]
    InvalidAnswer(String),
    /// The generative backend returned an unusable response envelope.
    #[error("backend response error: {0}")]
    Backend(String),
    /// The row store rejected a call.
    #[error("store error: {0}")]
    Store(String),
    /// HTTP transport error from a collaborator.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias for tutor operations.
pub type TutorResult<T> = Result<T, TutorError>;
