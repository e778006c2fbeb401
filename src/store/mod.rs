//! Vocabulary row-store adapter contract and implementations.
//!
//! The store is an append-only row collection with read-by-filter. Calls may
//! fail with transport errors; the tutor core surfaces those to its caller
//! instead of retrying internally.

pub mod memory;
pub mod sheets;

pub use memory::InMemoryStore;
pub use sheets::{SheetsConfig, SheetsStore};

use async_trait::async_trait;

use crate::tutor::core::errors::TutorResult;
use crate::tutor::core::record::{VocabRecord, WrongAnswer};

/// Filter for reading stored records.
#[derive(Clone, Debug, Default)]
pub struct RecordFilter {
    /// Keep only records with this exact theme.
    pub theme: Option<String>,
    /// Keep only records created on this `YYYY-MM-DD` day.
    pub date: Option<String>,
}

/// Append-only vocabulary row store.
#[async_trait]
pub trait VocabStore: Send + Sync {
    /// Append records, tagging each row with `source`.
    ///
    /// # Errors
    /// Returns an error when the store transport fails.
    async fn append_records(&self, records: &[VocabRecord], source: &str) -> TutorResult<()>;

    /// Read up to `limit` records matching the filter, in insertion order.
    ///
    /// # Errors
    /// Returns an error when the store transport fails.
    async fn read_records(&self, filter: &RecordFilter, limit: usize)
    -> TutorResult<Vec<VocabRecord>>;

    /// Whether a word is already stored, case-insensitively.
    ///
    /// # Errors
    /// Returns an error when the store transport fails.
    async fn word_exists(&self, word: &str) -> TutorResult<bool>;

    /// Read every stored record.
    ///
    /// # Errors
    /// Returns an error when the store transport fails.
    async fn read_all(&self) -> TutorResult<Vec<VocabRecord>>;

    /// Append missed quiz questions for later review.
    ///
    /// # Errors
    /// Returns an error when the store transport fails.
    async fn append_wrong_answers(&self, items: &[WrongAnswer]) -> TutorResult<()>;
}
