use thiserror::Error;

use crate::form::validation::FieldErrors;
use crate::models::field::FieldName;

/// Unified error type for the entire income-monitor-core library.
/// Every public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Storage ─────────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Income not found: {0}")]
    IncomeNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No rate provider available for currency: {0}")]
    NoProvider(String),

    #[error("Exchange rate not available for {currency} on {date}")]
    RateNotAvailable {
        currency: String,
        date: String,
    },

    // ── Form ────────────────────────────────────────────────────────
    #[error("Form has invalid fields: {0}")]
    InvalidForm(FieldErrors),

    #[error("Field is read-only: {0}")]
    ReadOnlyField(FieldName),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unsupported currency: {0}")]
    UnknownCurrency(String),

    #[error("A submit is already in progress")]
    SubmitInProgress,

    #[error("Form has been disposed")]
    FormDisposed,

    #[error("Invalid dependency graph: {0}")]
    InvalidGraph(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    // ── Configuration ───────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    Config(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest errors carry the full URL; keep the path, drop the query.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<rusqlite::Error> for CoreError {
    fn from(e: rusqlite::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}
