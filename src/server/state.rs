//! Application state shared across all request handlers.

use std::sync::Arc;

use tracing::{info, warn};

use crate::llm::GeminiClient;
use crate::store::{InMemoryStore, SheetsConfig, SheetsStore, VocabStore};
use crate::tutor::core::config::TutorConfig;
use crate::tutor::core::errors::{TutorError, TutorResult};
use crate::tutor::service::TutorService;

/// Environment variable holding the Gemini API key.
const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Environment variable holding the spreadsheet identifier.
const SHEET_ID_ENV: &str = "VOCAB_SHEET_ID";
/// Environment variable holding the Sheets bearer token.
const SHEET_TOKEN_ENV: &str = "GOOGLE_SHEETS_TOKEN";

/// Shared application state.
pub struct AppState {
    /// The tutor service handling every incoming message.
    pub service: TutorService,
}

impl AppState {
    /// Create application state from the environment with the default
    /// configuration.
    ///
    /// # Errors
    /// Returns an error when required variables are missing or the
    /// configuration is invalid.
    pub fn from_env() -> TutorResult<Arc<Self>> {
        Self::with_config(TutorConfig::default())
    }

    /// Create application state from an explicit configuration.
    ///
    /// Requires `GEMINI_API_KEY`. When `VOCAB_SHEET_ID` and
    /// `GOOGLE_SHEETS_TOKEN` are both present the spreadsheet store is used;
    /// otherwise records live in process memory only.
    ///
    /// # Errors
    /// Returns an error when required variables are missing or the
    /// configuration is invalid.
    pub fn with_config(config: TutorConfig) -> TutorResult<Arc<Self>> {
        let api_key = std::env::var(GEMINI_API_KEY_ENV)
            .map_err(|_| TutorError::InvalidConfig(format!("missing {GEMINI_API_KEY_ENV}")))?;
        let generator = Arc::new(GeminiClient::new(&config.llm, api_key)?);

        let utc_offset_minutes = config.rotation.utc_offset_minutes;
        let store: Arc<dyn VocabStore> =
            match (std::env::var(SHEET_ID_ENV), std::env::var(SHEET_TOKEN_ENV)) {
                (Ok(sheet_id), Ok(token)) => {
                    info!(%sheet_id, "using spreadsheet store");
                    let mut sheets_config = SheetsConfig::new(sheet_id);
                    sheets_config.utc_offset_minutes = utc_offset_minutes;
                    Arc::new(SheetsStore::new(sheets_config, token)?)
                }
                _ => {
                    warn!(
                        "{SHEET_ID_ENV}/{SHEET_TOKEN_ENV} not set, vocabulary will not survive restarts"
                    );
                    Arc::new(InMemoryStore::with_offset(utc_offset_minutes))
                }
            };

        let service = TutorService::new(config, generator, store)?;
        Ok(Arc::new(Self { service }))
    }
}
