//! SQL Dialect 전략
//!
//! 백엔드별로 달라지는 부분만 모았습니다.
//!
//! - 타입 토큰 변환 (`TEXT`, `AUTOINCREMENT`)
//! - 기본키 표현 방식 (컬럼 인라인 / 테이블 제약)
//! - 외래키 표현 방식 (인라인 / CREATE 이후 ALTER)
//! - placeholder 문법

use std::fmt;
use std::str::FromStr;

use sea_query::{PostgresQueryBuilder, SelectStatement, SqliteQueryBuilder, Values};
use serde::{Deserialize, Serialize};

use dbm_core::schema::{Column, TypeTag};

/// 기본키 표현 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryKeyStyle {
    /// 컬럼 토큰에 `PRIMARY KEY` 포함
    Inline,
    /// `CONSTRAINT <table>_pkey PRIMARY KEY (...)`
    TableConstraint,
}

/// 외래키 표현 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyStyle {
    /// `FOREIGN KEY(col) REFERENCES target(col)`를 CREATE TABLE 안에 포함
    Inline,
    /// 모든 CREATE TABLE 이후 `ALTER TABLE ... ADD CONSTRAINT`
    Deferred,
}

/// Dialect 전략
pub trait Dialect: Send + Sync + fmt::Debug {
    /// 식별 이름
    fn name(&self) -> &'static str;

    /// 컬럼 타입 토큰 변환 (`FOREIGN KEY` 태그는 제거)
    fn column_tokens(&self, column: &Column) -> Vec<String>;

    fn primary_key_style(&self) -> PrimaryKeyStyle;

    fn foreign_key_style(&self) -> ForeignKeyStyle;

    /// 1부터 시작하는 위치의 placeholder
    fn placeholder(&self, position: usize, column: &Column) -> String;

    /// 문자열 파라미터를 컬럼 타입으로 명시 변환해야 할 때의 타입 이름
    fn cast_type(&self, _column: &Column) -> Option<String> {
        None
    }

    /// DROP TABLE 문
    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", table)
    }

    /// SELECT 문 렌더링 (SQL, 바인딩 값)
    fn render_select(&self, query: &SelectStatement) -> (String, Values);
}

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL dialect
///
/// `TEXT` → `character varying`, `AUTOINCREMENT` → `serial NOT NULL`.
/// 기본키는 테이블 제약, 외래키는 ALTER로 지연 적용합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn column_tokens(&self, column: &Column) -> Vec<String> {
        if column.is_auto_increment() {
            return vec!["serial".to_string(), "NOT NULL".to_string()];
        }

        column
            .type_tags
            .iter()
            .filter_map(|tag| match tag {
                // 기본키는 테이블 제약으로 출력
                TypeTag::PrimaryKey | TypeTag::ForeignKey | TypeTag::AutoIncrement => None,
                TypeTag::Text => Some("character varying".to_string()),
                TypeTag::Native(token) => Some(token.clone()),
            })
            .collect()
    }

    fn primary_key_style(&self) -> PrimaryKeyStyle {
        PrimaryKeyStyle::TableConstraint
    }

    fn foreign_key_style(&self) -> ForeignKeyStyle {
        ForeignKeyStyle::Deferred
    }

    fn placeholder(&self, position: usize, column: &Column) -> String {
        match self.cast_type(column) {
            Some(cast) => format!("${}::{}", position, cast),
            None => format!("${}", position),
        }
    }

    /// 파라미터는 문자열로 바인딩되므로 컬럼 타입으로 명시 변환합니다.
    fn cast_type(&self, column: &Column) -> Option<String> {
        if column.is_auto_increment() {
            return Some("integer".to_string());
        }

        column.type_tags.iter().find_map(|tag| match tag {
            TypeTag::Text => Some("character varying".to_string()),
            TypeTag::Native(_) => tag.type_name().map(postgres_cast_name),
            _ => None,
        })
    }

    /// 다른 테이블의 외래키 제약이 DROP을 막지 않도록 CASCADE
    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {} CASCADE", table)
    }

    fn render_select(&self, query: &SelectStatement) -> (String, Values) {
        query.build(PostgresQueryBuilder)
    }
}

/// serial 계열은 타입이 아니므로 저장 타입으로 변환
fn postgres_cast_name(type_name: String) -> String {
    match type_name.to_ascii_lowercase().as_str() {
        "smallserial" | "serial2" => "smallint".to_string(),
        "serial" | "serial4" => "integer".to_string(),
        "bigserial" | "serial8" => "bigint".to_string(),
        _ => type_name,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite dialect
///
/// 타입 토큰은 그대로 출력하고, `AUTOINCREMENT`는 `INTEGER PRIMARY KEY AUTOINCREMENT`로 대체합니다.
/// 기본키와 외래키 모두 CREATE TABLE 안에 인라인으로 표현합니다.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn column_tokens(&self, column: &Column) -> Vec<String> {
        if column.is_auto_increment() {
            return vec![
                "INTEGER".to_string(),
                "PRIMARY KEY".to_string(),
                "AUTOINCREMENT".to_string(),
            ];
        }

        column
            .type_tags
            .iter()
            .filter(|tag| **tag != TypeTag::ForeignKey)
            .map(|tag| tag.as_token().to_string())
            .collect()
    }

    fn primary_key_style(&self) -> PrimaryKeyStyle {
        PrimaryKeyStyle::Inline
    }

    fn foreign_key_style(&self) -> ForeignKeyStyle {
        ForeignKeyStyle::Inline
    }

    fn placeholder(&self, _position: usize, _column: &Column) -> String {
        "?".to_string()
    }

    fn render_select(&self, query: &SelectStatement) -> (String, Values) {
        query.build(SqliteQueryBuilder)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dialect 선택
// ─────────────────────────────────────────────────────────────────────────────

/// 설정에서 사용하는 dialect 이름
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    Postgres,
    Sqlite,
}

impl DialectKind {
    /// dialect 전략 인스턴스
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            DialectKind::Postgres => &PostgresDialect,
            DialectKind::Sqlite => &SqliteDialect,
        }
    }

    /// DB URL scheme으로 추론
    pub fn from_url(url: &str) -> Option<Self> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Some(DialectKind::Postgres)
        } else if url.starts_with("sqlite:") {
            Some(DialectKind::Sqlite)
        } else {
            None
        }
    }
}

impl FromStr for DialectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(DialectKind::Postgres),
            "sqlite" | "sqlite3" => Ok(DialectKind::Sqlite),
            other => Err(format!("unknown dialect: {}", other)),
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dialect().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(tags: &[&str]) -> Column {
        Column::new(
            "c",
            None,
            tags.iter().map(|t| TypeTag::from(*t)).collect(),
            None,
        )
    }

    #[test]
    fn test_postgres_type_translation() {
        let dialect = PostgresDialect;
        assert_eq!(
            dialect.column_tokens(&column(&["TEXT", "NOT NULL"])),
            vec!["character varying", "NOT NULL"]
        );
        assert_eq!(
            dialect.column_tokens(&column(&["INTEGER", "PRIMARY KEY", "AUTOINCREMENT"])),
            vec!["serial", "NOT NULL"]
        );
        assert_eq!(
            dialect.column_tokens(&column(&["INTEGER", "FOREIGN KEY"])),
            vec!["INTEGER"]
        );
    }

    #[test]
    fn test_sqlite_type_translation() {
        let dialect = SqliteDialect;
        assert_eq!(
            dialect.column_tokens(&column(&["PRIMARY KEY", "AUTOINCREMENT"])),
            vec!["INTEGER", "PRIMARY KEY", "AUTOINCREMENT"]
        );
        assert_eq!(
            dialect.column_tokens(&column(&["INTEGER", "FOREIGN KEY"])),
            vec!["INTEGER"]
        );
        assert_eq!(dialect.column_tokens(&column(&["TEXT"])), vec!["TEXT"]);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(SqliteDialect.placeholder(3, &column(&["INTEGER"])), "?");
        assert_eq!(
            PostgresDialect.placeholder(3, &column(&["INTEGER", "FOREIGN KEY"])),
            "$3::INTEGER"
        );
        assert_eq!(
            PostgresDialect.placeholder(1, &column(&["TEXT"])),
            "$1::character varying"
        );
        assert_eq!(PostgresDialect.placeholder(2, &column(&["NOT NULL"])), "$2");
    }

    #[test]
    fn test_postgres_cast_uses_type_name_only() {
        assert_eq!(
            PostgresDialect.placeholder(1, &column(&["INTEGER NOT NULL"])),
            "$1::INTEGER"
        );
        assert_eq!(
            PostgresDialect.placeholder(2, &column(&["VARCHAR(20) UNIQUE"])),
            "$2::VARCHAR(20)"
        );
        assert_eq!(PostgresDialect.placeholder(3, &column(&["serial"])), "$3::integer");
        assert_eq!(
            PostgresDialect.placeholder(4, &column(&["BIGSERIAL NOT NULL"])),
            "$4::bigint"
        );
        assert_eq!(
            PostgresDialect.cast_type(&column(&["NOT NULL", "numeric(10, 2)"])),
            Some("numeric(10, 2)".to_string())
        );
    }

    #[test]
    fn test_dialect_kind_selection() {
        assert_eq!(
            DialectKind::from_url("postgres://user@localhost/db"),
            Some(DialectKind::Postgres)
        );
        assert_eq!(DialectKind::from_url("sqlite::memory:"), Some(DialectKind::Sqlite));
        assert_eq!(DialectKind::from_url("mysql://x"), None);
        assert_eq!("PG".parse::<DialectKind>(), Ok(DialectKind::Postgres));
        assert_eq!(DialectKind::Sqlite.to_string(), "sqlite");
    }
}
