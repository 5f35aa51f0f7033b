//! PostgreSQL 실행기 (sqlx)
//!
//! 모든 데이터 파라미터는 문자열로 바인딩되고, placeholder의 `::type` 변환으로
//! 컬럼 타입에 맞춰집니다. 결과의 `NUMERIC`, 날짜/시간, `JSON`, `UUID` 값은 텍스트로 돌려주며,
//! 디코딩할 수 없는 값은 NULL로 바꾸지 않고 `Error::Execution`으로 보고합니다.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::{query::Query, Column, PgPool, Postgres, Row as _, TypeInfo};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::value::{Row, SqlValue};

/// PostgreSQL 실행기
#[derive(Debug, Clone)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(5).connect(url).await?;
        tracing::debug!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Executor for PgExecutor {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        tracing::debug!(sql, params = params.len(), "Executing statement");

        let rows = bind_values(sqlx::query::<Postgres>(sql), params)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(sql, error = %e, "Statement failed");
                e
            })?;

        rows.iter().map(decode_row).collect()
    }
}

fn bind_values<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[SqlValue],
) -> Query<'q, Postgres, PgArguments> {
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

/// 컬럼 타입별 디코딩 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decode {
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Bool,
    Numeric,
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Json,
    Uuid,
    Bytes,
    Text,
}

impl Decode {
    /// sqlx가 보고하는 PostgreSQL 타입 이름에서 결정
    ///
    /// 목록에 없는 타입은 문자열로 읽고, 문자열과 호환되지 않으면 에러입니다.
    fn from_type_name(type_name: &str) -> Self {
        match type_name.to_ascii_uppercase().as_str() {
            "INT2" => Decode::Int2,
            "INT4" => Decode::Int4,
            "INT8" => Decode::Int8,
            "FLOAT4" => Decode::Float4,
            "FLOAT8" => Decode::Float8,
            "BOOL" => Decode::Bool,
            "NUMERIC" => Decode::Numeric,
            "DATE" => Decode::Date,
            "TIME" => Decode::Time,
            "TIMESTAMP" => Decode::Timestamp,
            "TIMESTAMPTZ" => Decode::TimestampTz,
            "JSON" | "JSONB" => Decode::Json,
            "UUID" => Decode::Uuid,
            "BYTEA" => Decode::Bytes,
            _ => Decode::Text,
        }
    }
}

fn decode_row(row: &PgRow) -> Result<Row> {
    row.columns()
        .iter()
        .map(|column| {
            let name = column.name();
            let type_name = column.type_info().name();
            let value = decode_value(row, column.ordinal(), Decode::from_type_name(type_name))
                .map_err(|e| Error::Execution {
                    message: format!("cannot decode column '{name}' of type {type_name}: {e}"),
                })?
                .unwrap_or(SqlValue::Null);

            Ok((name.to_string(), value))
        })
        .collect()
}

/// 컬럼 하나를 읽음 (`None`은 SQL NULL)
///
/// 정밀도나 시간대가 있는 값은 텍스트로 옮깁니다.
fn decode_value(
    row: &PgRow,
    index: usize,
    kind: Decode,
) -> std::result::Result<Option<SqlValue>, sqlx::Error> {
    let value = match kind {
        Decode::Int2 => row
            .try_get::<Option<i16>, _>(index)?
            .map(|v| SqlValue::Integer(i64::from(v))),
        Decode::Int4 => row
            .try_get::<Option<i32>, _>(index)?
            .map(|v| SqlValue::Integer(i64::from(v))),
        Decode::Int8 => row.try_get::<Option<i64>, _>(index)?.map(SqlValue::Integer),
        Decode::Float4 => row
            .try_get::<Option<f32>, _>(index)?
            .map(|v| SqlValue::Real(f64::from(v))),
        Decode::Float8 => row.try_get::<Option<f64>, _>(index)?.map(SqlValue::Real),
        Decode::Bool => row
            .try_get::<Option<bool>, _>(index)?
            .map(|v| SqlValue::Integer(i64::from(v))),
        Decode::Numeric => row
            .try_get::<Option<Decimal>, _>(index)?
            .map(|v| SqlValue::Text(v.to_string())),
        Decode::Date => row
            .try_get::<Option<NaiveDate>, _>(index)?
            .map(|v| SqlValue::Text(v.to_string())),
        Decode::Time => row
            .try_get::<Option<NaiveTime>, _>(index)?
            .map(|v| SqlValue::Text(v.to_string())),
        Decode::Timestamp => row
            .try_get::<Option<NaiveDateTime>, _>(index)?
            .map(|v| SqlValue::Text(v.to_string())),
        Decode::TimestampTz => row
            .try_get::<Option<DateTime<Utc>>, _>(index)?
            .map(|v| SqlValue::Text(v.to_rfc3339())),
        Decode::Json => row
            .try_get::<Option<serde_json::Value>, _>(index)?
            .map(|v| SqlValue::Text(v.to_string())),
        Decode::Uuid => row
            .try_get::<Option<Uuid>, _>(index)?
            .map(|v| SqlValue::Text(v.to_string())),
        Decode::Bytes => row
            .try_get::<Option<Vec<u8>>, _>(index)?
            .map(|v| SqlValue::Text(String::from_utf8_lossy(&v).into_owned())),
        Decode::Text => row.try_get::<Option<String>, _>(index)?.map(SqlValue::Text),
    };
    Ok(value)
}
