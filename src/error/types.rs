// src/error/types.rs
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The store rejected the schema declarations. Fatal: the run aborts
    /// before any record is processed.
    #[error("Schema error: {0}")]
    Schema(String),

    /// One record's shape violates the expected contract. Recorded against
    /// that record; the run continues.
    #[error("Malformed record: missing or invalid field `{field}`")]
    MalformedRecord { field: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    /// The upstream API could not be reached or returned garbage. Fatal for
    /// the listing call, recorded-and-skipped for a per-record detail call.
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn malformed(field: impl Into<String>) -> Self {
        AppError::MalformedRecord {
            field: field.into(),
        }
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::SourceUnavailable(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
