//! In-memory vocabulary store for tests and token-less local runs.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::store::{RecordFilter, VocabStore};
use crate::tutor::core::errors::TutorResult;
use crate::tutor::core::record::{VocabRecord, WrongAnswer};
use crate::tutor::rotation::today_date_string;

struct StoredRow {
    record: VocabRecord,
    created_day: String,
}

/// Append-only store backed by a process-local vector.
///
/// Rows are stamped with the calendar day under the store's UTC offset, the
/// same day string the daily flow filters by.
#[derive(Default)]
pub struct InMemoryStore {
    rows: RwLock<Vec<StoredRow>>,
    wrong: RwLock<Vec<WrongAnswer>>,
    utc_offset_minutes: i32,
}

impl InMemoryStore {
    /// Create an empty store stamping rows with the UTC day.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store stamping rows with the day under the given
    /// UTC offset.
    #[must_use]
    pub fn with_offset(utc_offset_minutes: i32) -> Self {
        Self {
            utc_offset_minutes,
            ..Self::default()
        }
    }

    /// Number of missed-question rows recorded so far.
    pub async fn wrong_answer_count(&self) -> usize {
        self.wrong.read().await.len()
    }
}

fn matches(row: &StoredRow, filter: &RecordFilter) -> bool {
    if let Some(theme) = &filter.theme {
        if &row.record.theme != theme {
            return false;
        }
    }
    if let Some(date) = &filter.date {
        if &row.created_day != date {
            return false;
        }
    }
    true
}

#[async_trait]
impl VocabStore for InMemoryStore {
    async fn append_records(&self, records: &[VocabRecord], _source: &str) -> TutorResult<()> {
        let day = today_date_string(self.utc_offset_minutes);
        let mut rows = self.rows.write().await;
        rows.extend(records.iter().map(|record| StoredRow {
            record: record.clone(),
            created_day: day.clone(),
        }));
        Ok(())
    }

    async fn read_records(
        &self,
        filter: &RecordFilter,
        limit: usize,
    ) -> TutorResult<Vec<VocabRecord>> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .filter(|row| matches(row, filter))
            .take(limit)
            .map(|row| row.record.clone())
            .collect())
    }

    async fn word_exists(&self, word: &str) -> TutorResult<bool> {
        let needle = word.trim().to_lowercase();
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .any(|row| row.record.word.trim().to_lowercase() == needle))
    }

    async fn read_all(&self) -> TutorResult<Vec<VocabRecord>> {
        let rows = self.rows.read().await;
        Ok(rows.iter().map(|row| row.record.clone()).collect())
    }

    async fn append_wrong_answers(&self, items: &[WrongAnswer]) -> TutorResult<()> {
        let mut wrong = self.wrong.write().await;
        wrong.extend(items.iter().cloned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(theme: &str, word: &str) -> VocabRecord {
        VocabRecord {
            theme: theme.to_string(),
            word: word.to_string(),
            pos: "n.".to_string(),
            zh: String::new(),
            example: String::new(),
            example_zh: String::new(),
            cefr: String::new(),
        }
    }

    #[tokio::test]
    async fn filters_by_theme_and_today() {
        let store = InMemoryStore::new();
        let records = vec![record("travel", "visa"), record("work", "deadline")];
        assert!(store.append_records(&records, "daily").await.is_ok());

        let filter = RecordFilter {
            theme: Some("travel".to_string()),
            date: Some(today_date_string(0)),
        };
        let found = store.read_records(&filter, 10).await.unwrap_or_default();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].word, "visa");

        let other_day = RecordFilter {
            theme: Some("travel".to_string()),
            date: Some("1999-01-01".to_string()),
        };
        let found = store.read_records(&other_day, 10).await.unwrap_or_default();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn rows_are_stamped_with_the_offset_adjusted_day() {
        // With a +08:00 store the stored day must match the +08:00 "today"
        // string even when it differs from the UTC day.
        let store = InMemoryStore::with_offset(480);
        assert!(
            store
                .append_records(&[record("travel", "visa")], "daily")
                .await
                .is_ok()
        );

        let filter = RecordFilter {
            theme: None,
            date: Some(today_date_string(480)),
        };
        let found = store.read_records(&filter, 10).await.unwrap_or_default();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn word_existence_is_case_insensitive() {
        let store = InMemoryStore::new();
        let records = vec![record("lookup", "Ember")];
        assert!(store.append_records(&records, "lookup").await.is_ok());
        assert!(store.word_exists("ember").await.unwrap_or(false));
        assert!(store.word_exists(" EMBER ").await.unwrap_or(false));
        assert!(!store.word_exists("cinder").await.unwrap_or(true));
    }

    #[tokio::test]
    async fn read_limit_is_honored() {
        let store = InMemoryStore::new();
        let records: Vec<VocabRecord> =
            (0..8).map(|i| record("travel", &format!("w{i}"))).collect();
        assert!(store.append_records(&records, "daily").await.is_ok());
        let found = store
            .read_records(&RecordFilter::default(), 3)
            .await
            .unwrap_or_default();
        assert_eq!(found.len(), 3);
    }
}
