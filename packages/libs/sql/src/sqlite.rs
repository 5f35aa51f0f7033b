//! SQLite 실행기 (sqlx)

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{query::Query, Column, Row as _, Sqlite, SqlitePool, TypeInfo, ValueRef};

use crate::error::Result;
use crate::executor::{Executor, SchemaIntrospector};
use crate::value::{Row, SqlValue};

const EXISTING_TABLES: &str =
    "SELECT sql FROM sqlite_master WHERE type='table' AND name != 'sqlite_sequence'";

/// SQLite 실행기
///
/// 연결 하나짜리 풀을 사용합니다. `sqlite::memory:` DB가 연결마다 새로 만들어지지 않도록
/// 유휴 연결을 닫지 않습니다.
#[derive(Debug, Clone)]
pub struct SqliteExecutor {
    pool: SqlitePool,
}

impl SqliteExecutor {
    /// URL로 연결 (파일이 없으면 생성)
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        tracing::debug!(url, "Connected to SQLite");
        Ok(Self { pool })
    }

    /// 기존 풀 사용
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Executor for SqliteExecutor {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        tracing::debug!(sql, params = params.len(), "Executing statement");

        let rows = bind_values(sqlx::query::<Sqlite>(sql), params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(sql, error = %e, "Statement failed");
                e
            })?;

        Ok(rows.iter().map(decode_row).collect())
    }
}

#[async_trait]
impl SchemaIntrospector for SqliteExecutor {
    async fn existing_table_ddl(&mut self) -> Result<Vec<String>> {
        let rows = sqlx::query(EXISTING_TABLES).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .filter_map(|row| row.try_get::<Option<String>, _>(0).ok().flatten())
            .collect())
    }
}

fn bind_values<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &[SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in params {
        match value {
            SqlValue::Null => {
                let v: Option<String> = None;
                query = query.bind(v);
            }
            SqlValue::Integer(i) => query = query.bind(*i),
            SqlValue::Real(f) => query = query.bind(*f),
            SqlValue::Text(s) => query = query.bind(s.clone()),
        }
    }
    query
}

/// 저장된 값의 실제 타입으로 디코딩
fn decode_row(row: &SqliteRow) -> Row {
    row.columns()
        .iter()
        .map(|column| {
            let index = column.ordinal();
            let type_name = match row.try_get_raw(index) {
                Ok(raw) if !raw.is_null() => raw.type_info().name().to_ascii_uppercase(),
                _ => "NULL".to_string(),
            };

            let value = match type_name.as_str() {
                "NULL" => None,
                "INTEGER" | "BOOLEAN" => row.try_get::<i64, _>(index).ok().map(SqlValue::Integer),
                "REAL" => row.try_get::<f64, _>(index).ok().map(SqlValue::Real),
                "BLOB" => row
                    .try_get::<Vec<u8>, _>(index)
                    .ok()
                    .map(|bytes| SqlValue::Text(String::from_utf8_lossy(&bytes).into_owned())),
                _ => row.try_get::<String, _>(index).ok().map(SqlValue::Text),
            }
            .unwrap_or(SqlValue::Null);

            (column.name().to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_and_decode() {
        let mut db = SqliteExecutor::connect("sqlite::memory:").await.unwrap();

        db.execute("CREATE TABLE notes(id INTEGER PRIMARY KEY AUTOINCREMENT, body TEXT, score REAL)", &[])
            .await
            .unwrap();
        db.execute(
            "INSERT INTO notes (body, score) VALUES (?, ?)",
            &[SqlValue::from("hello"), SqlValue::Real(1.5)],
        )
        .await
        .unwrap();
        db.execute(
            "INSERT INTO notes (body, score) VALUES (?, ?)",
            &[SqlValue::Null, SqlValue::from("2")],
        )
        .await
        .unwrap();

        let rows = db
            .execute("SELECT * FROM notes ORDER BY id", &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], SqlValue::Integer(1));
        assert_eq!(rows[0]["body"], SqlValue::from("hello"));
        assert_eq!(rows[0]["score"], SqlValue::Real(1.5));
        assert_eq!(rows[1]["body"], SqlValue::Null);
        // REAL 컬럼 affinity
        assert_eq!(rows[1]["score"], SqlValue::Real(2.0));
    }

    #[tokio::test]
    async fn test_existing_table_ddl_skips_internal_tables() {
        let mut db = SqliteExecutor::connect("sqlite::memory:").await.unwrap();
        assert!(db.existing_table_ddl().await.unwrap().is_empty());

        let ddl = "CREATE TABLE teams(team_id INTEGER PRIMARY KEY AUTOINCREMENT, team_name TEXT)";
        db.execute(ddl, &[]).await.unwrap();
        db.execute("INSERT INTO teams (team_name) VALUES (?)", &[SqlValue::from("Core")])
            .await
            .unwrap();

        assert_eq!(db.existing_table_ddl().await.unwrap(), vec![ddl.to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_statement_is_database_error() {
        let mut db = SqliteExecutor::connect("sqlite::memory:").await.unwrap();
        let error = db.execute("SELECT * FROM missing", &[]).await.unwrap_err();
        assert_eq!(error.code(), "DATABASE_ERROR");
    }
}
