//! 공통 에러 타입
//!
//! 스키마 로드와 조회에서 발생하는 에러를 정의합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// 스키마 에러
///
/// 모두 해당 작업에 치명적이며 재시도하지 않습니다.
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Description Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("schema parse error: {message}")]
    SchemaParse { message: String },

    #[error("table '{table}' has no columns section")]
    MissingColumns { table: String },

    #[error("column '{table}.{column}' has no type")]
    MissingColumnType { table: String, column: String },

    #[error("column '{table}.{column}' is tagged FOREIGN KEY but has no foreign_key reference")]
    MissingForeignKey { table: String, column: String },

    #[error("column '{table}.{column}' is AUTOINCREMENT but not the table's only PRIMARY KEY")]
    InvalidAutoIncrement { table: String, column: String },

    #[error("invalid reference: table '{table}' column '{column}' references non-existent table '{ref_table}'")]
    InvalidReference {
        table: String,
        column: String,
        ref_table: String,
    },

    // ─────────────────────────────────────────────────────────────────────────────
    // Lookup Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("unknown table: {name}")]
    UnknownTable { name: String },

    #[error("unknown column: {table}.{column}")]
    UnknownColumn { table: String, column: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // IO/Serialization Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// 에러 코드 (클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::SchemaParse { .. } => "SCHEMA_PARSE_ERROR",
            Error::MissingColumns { .. } => "MISSING_COLUMNS",
            Error::MissingColumnType { .. } => "MISSING_COLUMN_TYPE",
            Error::MissingForeignKey { .. } => "MISSING_FOREIGN_KEY",
            Error::InvalidAutoIncrement { .. } => "INVALID_AUTO_INCREMENT",
            Error::InvalidReference { .. } => "INVALID_REFERENCE",
            Error::UnknownTable { .. } => "UNKNOWN_TABLE",
            Error::UnknownColumn { .. } => "UNKNOWN_COLUMN",
            Error::Json(_) => "JSON_ERROR",
            Error::Toml(_) => "TOML_ERROR",
            Error::Yaml(_) => "YAML_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }
}
