//! Chat-based English vocabulary tutor: daily themed word lists, single-word
//! lookups through a generative backend, and multi-turn quizzes, behind a
//! small webhook server.

// Strict lint policy: no unsafe, no undocumented public items, no panicking
// shortcuts in production code.
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(unused_must_use)]
#![forbid(unsafe_op_in_unsafe_fn)]
#![deny(clippy::all)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::print_stdout)]

/// Generative-text backend abstraction and the Gemini client.
pub mod llm;
/// HTTP server and webhook routes.
pub mod server;
/// Entry helpers to start the tutor server.
pub mod start_tutor;
/// Vocabulary row store contract and implementations.
pub mod store;
/// Tutor core: rotation, parsing, quiz sessions, and dialogue routing.
pub mod tutor;
