//! 스키마 설명 파서
//!
//! JSON/TOML/YAML 스키마 설명을 파싱하여 Schema IR로 변환합니다.
//! 설명 구조체는 serde 역직렬화 결과 그대로이고, 검증은 [`SchemaParser::build`]에서 합니다.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::column::{default_table_label, Column, ForeignKey};
use super::ir::Schema;
use super::table::{IncludedColumns, JoinedTable, Table};
use super::types::TypeTag;
use crate::error::{Error, Result};

/// 스키마 파서
pub struct SchemaParser;

impl SchemaParser {
    /// JSON 문자열 파싱
    pub fn parse_json(json: &str) -> Result<Schema> {
        let description: SchemaDescription = serde_json::from_str(json)?;
        Self::build(description)
    }

    /// TOML 문자열 파싱
    pub fn parse_toml(toml: &str) -> Result<Schema> {
        let description: SchemaDescription = toml::from_str(toml)?;
        Self::build(description)
    }

    /// YAML 문자열 파싱
    pub fn parse_yaml(yaml: &str) -> Result<Schema> {
        let description: SchemaDescription = serde_yaml::from_str(yaml)?;
        Self::build(description)
    }

    /// 파일에서 로드 (확장자로 형식 결정)
    pub fn load(path: impl AsRef<Path>) -> Result<Schema> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::parse_json(&content),
            Some("toml") => Self::parse_toml(&content),
            Some("yaml") | Some("yml") => Self::parse_yaml(&content),
            other => Err(Error::SchemaParse {
                message: format!(
                    "unsupported schema file extension: {}",
                    other.unwrap_or("<none>")
                ),
            }),
        }
    }

    /// 설명을 검증하여 Schema IR 생성
    ///
    /// 외래키 참조는 여기서 한 번에 검증합니다.
    pub fn build(description: SchemaDescription) -> Result<Schema> {
        let mut tables = Vec::with_capacity(description.tables.len());

        for (name, raw_table) in description.tables {
            tables.push(Self::convert_table(name, raw_table)?);
        }

        let schema = Schema::new(tables);

        if let Some(error) = schema.validate_references().into_iter().next() {
            return Err(error.into());
        }

        Ok(schema)
    }

    /// 테이블 설명 변환
    fn convert_table(name: String, raw: TableDescription) -> Result<Table> {
        let raw_columns = raw.columns.ok_or_else(|| Error::MissingColumns {
            table: name.clone(),
        })?;

        let mut columns = IndexMap::with_capacity(raw_columns.len());
        for (column_name, raw_column) in raw_columns {
            let column = Self::convert_column(&name, column_name, raw_column)?;
            columns.insert(column.name.clone(), column);
        }

        // AUTOINCREMENT는 단일 기본키 컬럼에만 허용
        let key_count = columns.values().filter(|c| c.is_primary_key()).count();
        if let Some(column) = columns
            .values()
            .find(|c| c.is_auto_increment() && (!c.is_primary_key() || key_count > 1))
        {
            return Err(Error::InvalidAutoIncrement {
                table: name,
                column: column.name.clone(),
            });
        }

        let joined_tables = raw
            .joined_tables
            .unwrap_or_default()
            .into_iter()
            .map(|(joined_name, raw_joined)| {
                let joined = Self::convert_joined_table(joined_name.clone(), raw_joined);
                (joined_name, joined)
            })
            .collect();

        let label = raw.label.unwrap_or_else(|| default_table_label(&name));

        Ok(Table::new(name, label, columns, joined_tables))
    }

    /// 컬럼 설명 변환
    fn convert_column(table: &str, name: String, raw: ColumnDescription) -> Result<Column> {
        let type_tags: Vec<TypeTag> = raw
            .column_type
            .map(OneOrMany::into_vec)
            .unwrap_or_default()
            .into_iter()
            .map(TypeTag::from)
            .collect();

        if type_tags.is_empty() {
            return Err(Error::MissingColumnType {
                table: table.to_string(),
                column: name,
            });
        }

        // FOREIGN KEY 태그가 없는 컬럼의 참조는 무시
        let foreign_key = if type_tags.contains(&TypeTag::ForeignKey) {
            let reference = raw.foreign_key.ok_or_else(|| Error::MissingForeignKey {
                table: table.to_string(),
                column: name.clone(),
            })?;
            Some(ForeignKey {
                table: reference.table,
            })
        } else {
            None
        };

        Ok(Column::new(name, raw.label, type_tags, foreign_key))
    }

    /// 조인 힌트 변환
    fn convert_joined_table(name: String, raw: JoinedTableDescription) -> JoinedTable {
        let included_columns = match raw.included_columns {
            None => IncludedColumns::All,
            Some(OneOrMany::One(s)) if s.trim() == "*" => IncludedColumns::All,
            Some(other) => IncludedColumns::Columns(other.into_vec()),
        };

        JoinedTable {
            name,
            joined_columns: raw.joined_columns,
            included_columns,
            recursive_join: raw.recursive_join.unwrap_or(true),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// 스키마 설명 구조체 (serde 역직렬화용)
// ─────────────────────────────────────────────────────────────────────────────

/// 스키마 설명 최상위
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDescription {
    pub tables: IndexMap<String, TableDescription>,
}

/// 테이블 설명
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableDescription {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub columns: Option<IndexMap<String, ColumnDescription>>,
    #[serde(default)]
    pub joined_tables: Option<IndexMap<String, JoinedTableDescription>>,
}

/// 컬럼 설명
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnDescription {
    #[serde(rename = "type", default)]
    pub column_type: Option<OneOrMany>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub foreign_key: Option<ForeignKeyDescription>,
}

/// 외래키 설명
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignKeyDescription {
    pub table: String,
}

/// 조인 힌트 설명
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinedTableDescription {
    #[serde(default)]
    pub joined_columns: Option<Vec<String>>,
    #[serde(default)]
    pub included_columns: Option<OneOrMany>,
    #[serde(default)]
    pub recursive_join: Option<bool>,
}

/// 단일 토큰 또는 토큰 목록
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(s) => vec![s],
            OneOrMany::Many(v) => v,
        }
    }
}
