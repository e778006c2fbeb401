//! Google Sheets row store over the `values` REST endpoints.
//!
//! Row layout on the vocabulary sheet, columns A-I:
//! `theme | word | pos | zh | example | example_zh | cefr | source | created_at`.
//! Missed quiz questions land on a second sheet. Authentication is a bearer
//! token supplied by the environment; this module does no token refresh.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use crate::store::{RecordFilter, VocabStore};
use crate::tutor::core::errors::TutorResult;
use crate::tutor::core::record::{VocabRecord, WrongAnswer, normalize_cefr};

/// Default Sheets API base URL.
const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// Settings for the Sheets-backed store.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Spreadsheet identifier.
    pub spreadsheet_id: String,
    /// Sheet holding vocabulary rows.
    pub vocab_sheet: String,
    /// Sheet holding missed quiz questions.
    pub wrong_sheet: String,
    /// Optional custom base URL.
    pub base_url: Option<String>,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
    /// UTC offset for the `created_at` stamp, so the row's day prefix matches
    /// the local day the daily flow filters by.
    pub utc_offset_minutes: i32,
}

impl SheetsConfig {
    /// Config for a spreadsheet with the default sheet names.
    #[must_use]
    pub fn new(spreadsheet_id: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            vocab_sheet: "Vocabulary".to_string(),
            wrong_sheet: "WrongAnswers".to_string(),
            base_url: None,
            timeout_seconds: 30,
            utc_offset_minutes: 0,
        }
    }
}

/// Vocabulary store backed by a Google spreadsheet.
pub struct SheetsStore {
    http: reqwest::Client,
    config: SheetsConfig,
    token: String,
}

impl SheetsStore {
    /// Create a store from config and a bearer token.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: SheetsConfig, token: impl Into<String>) -> TutorResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            config,
            token: token.into(),
        })
    }

    fn values_url(&self, range: &str, append: bool) -> String {
        let base = self
            .config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        let suffix = if append { ":append" } else { "" };
        format!(
            "{base}/v4/spreadsheets/{}/values/{range}{suffix}",
            self.config.spreadsheet_id
        )
    }

    async fn append_values(&self, range: &str, values: Vec<Vec<String>>) -> TutorResult<()> {
        let count = values.len();
        self.http
            .post(self.values_url(range, true))
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": values }))
            .send()
            .await?
            .error_for_status()?;
        info!(range, count, "appended rows to spreadsheet");
        Ok(())
    }

    async fn get_values(&self, range: &str) -> TutorResult<Vec<Vec<String>>> {
        let response = self
            .http
            .get(self.values_url(range, false))
            .bearer_auth(&self.token)
            .send()
            .await?
            .error_for_status()?
            .json::<ValueRange>()
            .await?;

        Ok(response
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    fn vocab_range(&self) -> String {
        format!("{}!A2:I", self.config.vocab_sheet)
    }
}

/// RFC 3339 timestamp whose day prefix is the calendar day under the given
/// UTC offset.
fn created_at_stamp(utc_offset_minutes: i32) -> String {
    let offset =
        FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60)).unwrap_or_else(|| Utc.fix());
    Utc::now().with_timezone(&offset).to_rfc3339()
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}

fn row_to_record(row: &[String]) -> Option<VocabRecord> {
    let word = cell(row, 1);
    if word.trim().is_empty() {
        return None;
    }
    Some(VocabRecord {
        theme: cell(row, 0),
        word,
        pos: cell(row, 2),
        zh: cell(row, 3),
        example: cell(row, 4),
        example_zh: cell(row, 5),
        cefr: normalize_cefr(&cell(row, 6)),
    })
}

fn row_matches(row: &[String], filter: &RecordFilter) -> bool {
    if let Some(theme) = &filter.theme {
        if &cell(row, 0) != theme {
            return false;
        }
    }
    if let Some(date) = &filter.date {
        // Cells are hand-editable; `get` stays on char boundaries and turns
        // any malformed timestamp into a non-match instead of a panic.
        let created = cell(row, 8);
        if created.get(..10) != Some(date.as_str()) {
            return false;
        }
    }
    true
}

#[async_trait]
impl VocabStore for SheetsStore {
    async fn append_records(&self, records: &[VocabRecord], source: &str) -> TutorResult<()> {
        if records.is_empty() {
            return Ok(());
        }
        let now = created_at_stamp(self.config.utc_offset_minutes);
        let values = records
            .iter()
            .map(|r| {
                vec![
                    r.theme.clone(),
                    r.word.clone(),
                    r.pos.clone(),
                    r.zh.clone(),
                    r.example.clone(),
                    r.example_zh.clone(),
                    r.cefr.clone(),
                    source.to_string(),
                    now.clone(),
                ]
            })
            .collect();
        self.append_values(&self.vocab_range(), values).await
    }

    async fn read_records(
        &self,
        filter: &RecordFilter,
        limit: usize,
    ) -> TutorResult<Vec<VocabRecord>> {
        let rows = self.get_values(&self.vocab_range()).await?;
        Ok(rows
            .iter()
            .filter(|row| row_matches(row, filter))
            .filter_map(|row| row_to_record(row))
            .take(limit)
            .collect())
    }

    async fn word_exists(&self, word: &str) -> TutorResult<bool> {
        let range = format!("{}!B:B", self.config.vocab_sheet);
        let rows = self.get_values(&range).await?;
        let needle = word.trim().to_lowercase();
        // Row 0 is the header.
        Ok(rows.iter().skip(1).any(|row| {
            row.first()
                .is_some_and(|w| w.trim().to_lowercase() == needle)
        }))
    }

    async fn read_all(&self) -> TutorResult<Vec<VocabRecord>> {
        let rows = self.get_values(&self.vocab_range()).await?;
        Ok(rows.iter().filter_map(|row| row_to_record(row)).collect())
    }

    async fn append_wrong_answers(&self, items: &[WrongAnswer]) -> TutorResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let range = format!("{}!A2:G", self.config.wrong_sheet);
        let values = items
            .iter()
            .map(|item| {
                vec![
                    item.user_key.clone(),
                    item.word.clone(),
                    item.zh.clone(),
                    item.chosen.clone(),
                    item.options.join(" | "),
                    item.quiz_type.clone(),
                    item.answered_at.to_rfc3339(),
                ]
            })
            .collect();
        self.append_values(&range, values).await
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn rows_without_a_word_are_dropped() {
        assert!(row_to_record(&row(&["travel", ""])).is_none());
        assert!(row_to_record(&row(&["travel"])).is_none());
        let record = row_to_record(&row(&[
            "travel",
            "visa",
            "n.",
            "簽證",
            "I need a visa.",
            "我需要簽證。",
            "b1",
            "daily",
            "2025-11-27T01:02:03Z",
        ]));
        assert!(record.is_some_and(|r| r.word == "visa" && r.cefr == "B1"));
    }

    #[test]
    fn date_filter_compares_the_day_prefix() {
        let stored = row(&[
            "travel",
            "visa",
            "n.",
            "簽證",
            "",
            "",
            "B1",
            "daily",
            "2025-11-27T09:00:00Z",
        ]);
        let filter = RecordFilter {
            theme: Some("travel".to_string()),
            date: Some("2025-11-27".to_string()),
        };
        assert!(row_matches(&stored, &filter));

        let other = RecordFilter {
            theme: Some("travel".to_string()),
            date: Some("2025-11-28".to_string()),
        };
        assert!(!row_matches(&stored, &other));

        let wrong_theme = RecordFilter {
            theme: Some("work".to_string()),
            date: None,
        };
        assert!(!row_matches(&stored, &wrong_theme));
    }

    #[test]
    fn short_created_at_never_matches_a_date_filter() {
        let stored = row(&["travel", "visa", "n.", "", "", "", "", "daily", "bad"]);
        let filter = RecordFilter {
            theme: None,
            date: Some("2025-11-27".to_string()),
        };
        assert!(!row_matches(&stored, &filter));
    }

    #[test]
    fn created_at_day_prefix_is_the_offset_adjusted_day() {
        let stamp = created_at_stamp(480);
        assert_eq!(
            stamp.get(..10),
            Some(crate::tutor::rotation::today_date_string(480).as_str())
        );
        assert!(stamp.ends_with("+08:00"));
    }

    #[test]
    fn multibyte_created_at_never_matches_a_date_filter() {
        // A hand-edited cell with full-width digits has a multi-byte char
        // inside the first ten bytes.
        let stored = row(&["travel", "visa", "n.", "", "", "", "", "daily", "２０２５-11-27"]);
        let filter = RecordFilter {
            theme: None,
            date: Some("2025-11-27".to_string()),
        };
        assert!(!row_matches(&stored, &filter));
    }
}
