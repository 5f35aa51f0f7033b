//! SQL 값과 결과 행
//!
//! 파라미터 바인딩과 SELECT 결과가 공유하는 값 타입입니다.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 결과 행 (컬럼 이름 -> 값, 결과 컬럼 순서 유지)
pub type Row = IndexMap<String, SqlValue>;

/// 바인딩/조회 값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// 문자열 값이면 참조 반환
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(i: i64) -> Self {
        SqlValue::Integer(i)
    }
}

impl From<f64> for SqlValue {
    fn from(f: f64) -> Self {
        SqlValue::Real(f)
    }
}

/// SeaQuery가 바인딩한 값을 변환
///
/// SELECT 경로는 문자열/정수/실수와 LIMIT(u64)만 바인딩합니다.
impl From<sea_query::Value> for SqlValue {
    fn from(value: sea_query::Value) -> Self {
        use sea_query::Value;

        match value {
            Value::String(Some(s)) => SqlValue::Text(*s),
            Value::Char(Some(c)) => SqlValue::Text(c.to_string()),
            Value::Bool(Some(b)) => SqlValue::Integer(i64::from(b)),
            Value::TinyInt(Some(i)) => SqlValue::Integer(i64::from(i)),
            Value::SmallInt(Some(i)) => SqlValue::Integer(i64::from(i)),
            Value::Int(Some(i)) => SqlValue::Integer(i64::from(i)),
            Value::BigInt(Some(i)) => SqlValue::Integer(i),
            Value::TinyUnsigned(Some(u)) => SqlValue::Integer(i64::from(u)),
            Value::SmallUnsigned(Some(u)) => SqlValue::Integer(i64::from(u)),
            Value::Unsigned(Some(u)) => SqlValue::Integer(i64::from(u)),
            Value::BigUnsigned(Some(u)) => {
                SqlValue::Integer(i64::try_from(u).unwrap_or(i64::MAX))
            }
            Value::Float(Some(f)) => SqlValue::Real(f64::from(f)),
            Value::Double(Some(f)) => SqlValue::Real(f),
            _ => SqlValue::Null,
        }
    }
}

impl From<SqlValue> for sea_query::Value {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => sea_query::Value::String(None),
            SqlValue::Integer(i) => i.into(),
            SqlValue::Real(f) => f.into(),
            SqlValue::Text(s) => s.into(),
        }
    }
}

impl From<SqlValue> for serde_json::Value {
    fn from(value: SqlValue) -> Self {
        match value {
            SqlValue::Null => serde_json::Value::Null,
            SqlValue::Integer(i) => i.into(),
            SqlValue::Real(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            SqlValue::Text(s) => s.into(),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Real(r) => write!(f, "{}", r),
            SqlValue::Text(s) => f.write_str(s),
        }
    }
}
