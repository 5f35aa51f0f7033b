//! SQL 계층 에러 타입

use thiserror::Error;

use crate::params::NormalizationError;

pub type Result<T> = std::result::Result<T, Error>;

/// SQL 생성/실행 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Schema / Normalization Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("schema error: {0}")]
    Schema(#[from] dbm_core::Error),

    #[error("normalization error: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("table '{table}' has no non-key columns to match on")]
    NoDataColumns { table: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Execution Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("execution error: {message}")]
    Execution { message: String },

    #[error("expected exactly one '{table}' row after get-or-insert, found {matches}")]
    AmbiguousOrFailedInsert { table: String, matches: usize },
}

impl Error {
    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::Schema(e) => e.code(),
            Error::Normalization(NormalizationError::MissingField { .. }) => "MISSING_FIELD",
            Error::Normalization(NormalizationError::TypeMismatch { .. }) => "TYPE_MISMATCH",
            Error::NoDataColumns { .. } => "NO_DATA_COLUMNS",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Execution { .. } => "EXECUTION_ERROR",
            Error::AmbiguousOrFailedInsert { .. } => "AMBIGUOUS_OR_FAILED_INSERT",
        }
    }
}
