//! 요청 파라미터와 Data Normalizer
//!
//! 필드 이름으로 키잉된 데이터를 테이블의 데이터 컬럼 순서에 맞는
//! 위치 파라미터 목록으로 변환합니다.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use dbm_core::schema::Table;

use crate::value::SqlValue;

/// 필드 데이터 (필드 이름 -> 값)
pub type FieldData = HashMap<String, Value>;

/// 필드 데이터를 위치 파라미터로 정규화
///
/// 테이블의 데이터 컬럼(index 제외)을 선언 순서대로 순회하며 `prefix + 컬럼 이름`을 조회합니다.
/// 값은 문자열이거나 첫 원소가 문자열인 배열이어야 합니다.
/// 결과 길이는 항상 데이터 컬럼 수와 같고, 순서는 INSERT/UPDATE/DELETE의 placeholder 순서와 같습니다.
pub fn normalize(
    table: &Table,
    fields: &FieldData,
    prefix: &str,
) -> Result<Vec<SqlValue>, NormalizationError> {
    let mut values = Vec::with_capacity(table.data_column_count());

    for column in table.data_columns() {
        let field = format!("{}{}", prefix, column.name);
        let value = fields
            .get(&field)
            .ok_or_else(|| NormalizationError::MissingField {
                field: field.clone(),
            })?;

        values.push(SqlValue::Text(scalar_text(&field, value)?));
    }

    Ok(values)
}

/// 문자열 또는 첫 원소가 문자열인 배열에서 문자열 추출
fn scalar_text(field: &str, value: &Value) -> Result<String, NormalizationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Array(items) => match items.first() {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(NormalizationError::type_mismatch(field, other)),
            None => Err(NormalizationError::type_mismatch(field, value)),
        },
        other => Err(NormalizationError::type_mismatch(field, other)),
    }
}

/// 조건 값 변환
///
/// 배열은 첫 원소를 사용하고, null은 `IS NULL` 조건이 됩니다.
pub fn condition_value(field: &str, value: &Value) -> Result<SqlValue, NormalizationError> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(SqlValue::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(SqlValue::Real(f))
            } else {
                Ok(SqlValue::Text(n.to_string()))
            }
        }
        Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
        Value::Array(items) => match items.first() {
            Some(first) if !first.is_array() && !first.is_object() => {
                condition_value(field, first)
            }
            Some(other) => Err(NormalizationError::type_mismatch(field, other)),
            None => Err(NormalizationError::type_mismatch(field, value)),
        },
        Value::Object(_) => Err(NormalizationError::type_mismatch(field, value)),
    }
}

/// 정규화 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizationError {
    #[error("missing field: {field}")]
    MissingField { field: String },

    #[error("type mismatch for field {field}: expected string, got {found}")]
    TypeMismatch { field: String, found: &'static str },
}

impl NormalizationError {
    fn type_mismatch(field: &str, value: &Value) -> Self {
        NormalizationError::TypeMismatch {
            field: field.to_string(),
            found: json_type_name(value),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(items) if items.is_empty() => "empty array",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// WHERE 조건 (컬럼 -> 값, 동등 비교만)
///
/// 키는 `column` 또는 `table.column` 형식입니다. 삽입 순서가 WHERE 절 순서가 됩니다.
///
/// # 예시
///
/// ```json
/// { "name": "Ann" }                 // name = 'Ann'
/// { "teams.team_name": ["Core"] }   // teams.team_name = 'Core'
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WhereClause(pub IndexMap<String, Value>);

impl WhereClause {
    /// 빈 WHERE 절
    pub fn empty() -> Self {
        Self(IndexMap::new())
    }

    /// WHERE 조건이 비어있는지
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 단순 equality 조건 추가
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

/// 호출자 지정 조인
///
/// `left_join`/`right_join`은 SQL 표현식 그대로 출력됩니다. 신뢰할 수 있는 입력만 허용합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Join {
    /// 조인 대상 테이블
    pub joined_table: String,
    /// ON 좌변 표현식
    pub left_join: String,
    /// ON 우변 표현식
    pub right_join: String,
}

impl Join {
    pub fn new(
        joined_table: impl Into<String>,
        left_join: impl Into<String>,
        right_join: impl Into<String>,
    ) -> Self {
        Self {
            joined_table: joined_table.into(),
            left_join: left_join.into(),
            right_join: right_join.into(),
        }
    }

    /// ON 조건 표현식
    pub fn condition(&self) -> String {
        format!("{} = {}", self.left_join, self.right_join)
    }
}

/// 정렬 순서
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// ORDER BY / LIMIT
///
/// `order` 항목은 `"name"` 또는 `"name DESC"` 형식의 SQL 표현식입니다 (신뢰 입력).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAndLimit {
    #[serde(default)]
    pub order: Vec<String>,

    #[serde(default)]
    pub limit: Option<u64>,
}

impl OrderAndLimit {
    /// 정렬 항목을 (표현식, 방향)으로 분리
    pub fn order_terms(&self) -> impl Iterator<Item = (&str, SortOrder)> {
        self.order.iter().map(|term| split_order_term(term))
    }
}

fn split_order_term(term: &str) -> (&str, SortOrder) {
    let term = term.trim();
    if let Some((expr, dir)) = term.rsplit_once(char::is_whitespace) {
        if dir.eq_ignore_ascii_case("desc") {
            return (expr.trim_end(), SortOrder::Desc);
        }
        if dir.eq_ignore_ascii_case("asc") {
            return (expr.trim_end(), SortOrder::Asc);
        }
    }
    (term, SortOrder::Asc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbm_core::schema::SchemaParser;
    use serde_json::json;

    fn users() -> Table {
        let schema = SchemaParser::parse_json(
            r#"{ "tables": {
                "teams": { "columns": { "team_id": { "type": ["INTEGER", "PRIMARY KEY"] } } },
                "users": { "columns": {
                    "id": { "type": ["PRIMARY KEY", "AUTOINCREMENT"] },
                    "name": { "type": "TEXT" },
                    "team_id": { "type": ["INTEGER", "FOREIGN KEY"], "foreign_key": { "table": "teams" } }
                } }
            } }"#,
        )
        .unwrap();
        schema.get_table("users").unwrap().clone()
    }

    fn fields(value: Value) -> FieldData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_follows_column_order() {
        let values = normalize(
            &users(),
            &fields(json!({ "team_id": "3", "name": "Ann", "id": "99" })),
            "",
        )
        .unwrap();
        assert_eq!(values, vec![SqlValue::from("Ann"), SqlValue::from("3")]);
    }

    #[test]
    fn test_normalize_uses_first_list_element_and_prefix() {
        let values = normalize(
            &users(),
            &fields(json!({ "old_name": ["Ann", "ignored"], "old_team_id": "3" })),
            "old_",
        )
        .unwrap();
        assert_eq!(values, vec![SqlValue::from("Ann"), SqlValue::from("3")]);
    }

    #[test]
    fn test_normalize_missing_field() {
        let error = normalize(&users(), &fields(json!({ "name": "Ann" })), "").unwrap_err();
        assert_eq!(
            error,
            NormalizationError::MissingField {
                field: "team_id".to_string()
            }
        );
    }

    #[test]
    fn test_normalize_type_mismatch() {
        let error =
            normalize(&users(), &fields(json!({ "name": "Ann", "team_id": 3 })), "").unwrap_err();
        assert_eq!(
            error,
            NormalizationError::TypeMismatch {
                field: "team_id".to_string(),
                found: "number"
            }
        );

        let error = normalize(&users(), &fields(json!({ "name": [1], "team_id": "3" })), "")
            .unwrap_err();
        assert!(matches!(error, NormalizationError::TypeMismatch { found: "number", .. }));
    }

    #[test]
    fn test_condition_values() {
        assert_eq!(condition_value("a", &json!("x")).unwrap(), SqlValue::from("x"));
        assert_eq!(condition_value("a", &json!(["x", "y"])).unwrap(), SqlValue::from("x"));
        assert_eq!(condition_value("a", &json!(7)).unwrap(), SqlValue::Integer(7));
        assert_eq!(condition_value("a", &json!(null)).unwrap(), SqlValue::Null);
        assert!(condition_value("a", &json!({ "x": 1 })).is_err());
        assert!(condition_value("a", &json!([])).is_err());
    }

    #[test]
    fn test_order_terms() {
        let order = OrderAndLimit {
            order: vec!["name".to_string(), "created_at DESC".to_string()],
            limit: Some(5),
        };
        let terms: Vec<_> = order.order_terms().collect();
        assert_eq!(
            terms,
            vec![("name", SortOrder::Asc), ("created_at", SortOrder::Desc)]
        );
    }

    #[test]
    fn test_params_deserialization() {
        let json = r#"{ "order": ["name"], "limit": 10 }"#;
        let params: OrderAndLimit = serde_json::from_str(json).unwrap();
        assert_eq!(params.limit, Some(10));

        let join: Join = serde_json::from_str(
            r#"{ "joined_table": "teams", "left_join": "users.team_id", "right_join": "teams.team_id" }"#,
        )
        .unwrap();
        assert_eq!(join.condition(), "users.team_id = teams.team_id");
    }
}
