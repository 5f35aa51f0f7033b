//! Schema IR (Intermediate Representation)
//!
//! 스키마 설명을 검증해 만든 불변 스키마입니다.
//! Statement Builder와 Data Normalizer는 이 IR만 조회합니다.

use indexmap::IndexMap;
use serde::Serialize;

use super::table::Table;
use crate::error::{Error, Result};

/// Schema IR
///
/// 테이블 맵 (선언 순서 유지). 생성 후 변경 API는 없습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    tables: IndexMap<String, Table>,
}

impl Schema {
    /// 테이블 목록으로 IR 생성
    pub fn new(tables: impl IntoIterator<Item = Table>) -> Self {
        Self {
            tables: tables
                .into_iter()
                .map(|table| (table.name.clone(), table))
                .collect(),
        }
    }

    /// 테이블 조회
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// 테이블 조회 (없으면 에러)
    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables.get(name).ok_or_else(|| Error::UnknownTable {
            name: name.to_string(),
        })
    }

    /// 테이블 존재 여부
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// 모든 테이블 이름 (선언 순서)
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|s| s.as_str())
    }

    /// 모든 테이블 (선언 순서)
    pub fn all_tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// 외래키 참조 검증
    ///
    /// 모든 외래키가 같은 스키마 안의 테이블을 참조하는지 확인합니다.
    pub fn validate_references(&self) -> Vec<ReferenceError> {
        let mut errors = Vec::new();

        for table in self.tables.values() {
            for column in table.all_columns() {
                if !column.is_foreign_key() {
                    continue;
                }
                match column.foreign_table() {
                    None => errors.push(ReferenceError::MissingReference {
                        from_table: table.name.clone(),
                        from_column: column.name.clone(),
                    }),
                    Some(target) if !self.tables.contains_key(target) => {
                        errors.push(ReferenceError::TableNotFound {
                            from_table: table.name.clone(),
                            from_column: column.name.clone(),
                            ref_table: target.to_string(),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        errors
    }
}

/// 참조 검증 에러
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// `FOREIGN KEY` 태그는 있지만 `foreign_key` 참조가 없음
    MissingReference {
        from_table: String,
        from_column: String,
    },
    /// 존재하지 않는 테이블 참조
    TableNotFound {
        from_table: String,
        from_column: String,
        ref_table: String,
    },
}

impl From<ReferenceError> for Error {
    fn from(error: ReferenceError) -> Self {
        match error {
            ReferenceError::MissingReference {
                from_table,
                from_column,
            } => Error::MissingForeignKey {
                table: from_table,
                column: from_column,
            },
            ReferenceError::TableNotFound {
                from_table,
                from_column,
                ref_table,
            } => Error::InvalidReference {
                table: from_table,
                column: from_column,
                ref_table,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ForeignKey, TypeTag};

    fn table(name: &str, columns: Vec<Column>) -> Table {
        Table::new(
            name,
            name,
            columns.into_iter().map(|c| (c.name.clone(), c)).collect(),
            IndexMap::new(),
        )
    }

    #[test]
    fn test_schema_table_operations() {
        let schema = Schema::new(vec![table("users", vec![]), table("teams", vec![])]);

        assert!(schema.has_table("users"));
        assert!(!schema.has_table("posts"));
        assert_eq!(schema.table_names().collect::<Vec<_>>(), vec!["users", "teams"]);
        assert!(matches!(
            schema.table("posts"),
            Err(Error::UnknownTable { name }) if name == "posts"
        ));
    }

    #[test]
    fn test_validate_references() {
        let fk_column = Column::new(
            "team_id",
            None,
            vec![TypeTag::ForeignKey],
            Some(ForeignKey {
                table: "teams".to_string(),
            }),
        );
        let schema = Schema::new(vec![table("users", vec![fk_column.clone()])]);
        assert_eq!(
            schema.validate_references(),
            vec![ReferenceError::TableNotFound {
                from_table: "users".to_string(),
                from_column: "team_id".to_string(),
                ref_table: "teams".to_string(),
            }]
        );

        let schema = Schema::new(vec![
            table("users", vec![fk_column]),
            table("teams", vec![]),
        ]);
        assert!(schema.validate_references().is_empty());
    }
}
