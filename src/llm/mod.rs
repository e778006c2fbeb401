//! Generative-text backend abstraction and clients.

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::tutor::core::errors::TutorResult;

/// Opaque prompt-in, text-out contract with the generative backend.
///
/// Implementations may block on network I/O and may return empty or malformed
/// text; there is no schema guarantee. The parser exists because of this.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for a prompt.
    ///
    /// # Errors
    /// Returns an error on transport failure or an unusable response
    /// envelope; the caller surfaces it without retrying.
    async fn generate(&self, prompt: &str) -> TutorResult<String>;
}
