//! 테이블 정의
//!
//! 컬럼 순서는 스키마 선언 순서를 그대로 따릅니다. 이 순서가 DDL 컬럼 순서와
//! DML 파라미터 순서를 동시에 결정하므로, 파라미터 목록을 만드는 모든 곳은
//! [`Table::data_columns`]를 통해 순회해야 합니다.

use indexmap::IndexMap;
use serde::Serialize;

use super::column::Column;

/// 테이블 정의
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    /// 테이블 이름
    pub name: String,

    /// 표시 이름
    pub label: String,

    /// 컬럼 맵 (선언 순서 유지)
    pub columns: IndexMap<String, Column>,

    /// index(기본키) 컬럼 이름 (생성 시 한 번 계산)
    index_columns: Vec<String>,

    /// 조인 힌트
    pub joined_tables: IndexMap<String, JoinedTable>,
}

/// 조인 대상 테이블 힌트
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedTable {
    /// 조인 대상 테이블 이름
    pub name: String,

    /// 조인에 사용할 컬럼
    pub joined_columns: Option<Vec<String>>,

    /// SELECT에 포함할 대상 테이블 컬럼
    pub included_columns: IncludedColumns,

    /// 대상 테이블의 외래키도 다시 조인할지
    pub recursive_join: bool,
}

/// 조인 시 포함할 컬럼
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum IncludedColumns {
    /// 모든 컬럼 (`*`)
    #[default]
    All,
    /// 특정 컬럼 목록
    Columns(Vec<String>),
}

impl Table {
    /// 새 테이블 생성
    ///
    /// `PRIMARY KEY` 태그가 있는 컬럼을 컬럼 순서대로 index 컬럼으로 등록합니다.
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        columns: IndexMap<String, Column>,
        joined_tables: IndexMap<String, JoinedTable>,
    ) -> Self {
        let index_columns = columns
            .values()
            .filter(|c| c.is_primary_key())
            .map(|c| c.name.clone())
            .collect();

        Self {
            name: name.into(),
            label: label.into(),
            columns,
            index_columns,
            joined_tables,
        }
    }

    /// 컬럼 조회
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// 모든 컬럼 (선언 순서)
    pub fn all_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// index 컬럼 이름
    pub fn index_columns(&self) -> &[String] {
        &self.index_columns
    }

    pub fn is_index_column(&self, name: &str) -> bool {
        self.index_columns.iter().any(|c| c == name)
    }

    /// 데이터 컬럼 (index 제외, 선언 순서)
    ///
    /// INSERT/UPDATE/DELETE 파라미터와 Data Normalizer가 공유하는 유일한 순회 순서입니다.
    pub fn data_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .values()
            .filter(|c| !self.is_index_column(&c.name))
    }

    /// 데이터 컬럼 수
    pub fn data_column_count(&self) -> usize {
        self.columns.len() - self.index_columns.len()
    }

    /// 외래키 컬럼 (선언 순서)
    pub fn foreign_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values().filter(|c| c.foreign_table().is_some())
    }
}
