//! 선언 스키마 파싱 및 IR 생성
//!
//! # 개요
//!
//! 스키마는 JSON/TOML/YAML 설명 파일로 정의됩니다.
//! 이 모듈은 설명을 파싱하여 불변 Schema IR로 변환합니다.
//!
//! # 모듈 구조
//!
//! - `types`: 컬럼 타입 태그 (PRIMARY KEY, FOREIGN KEY, TEXT, AUTOINCREMENT, 네이티브 토큰)
//! - `table`: 테이블 정의
//! - `column`: 컬럼 정의
//! - `ir`: Schema IR (SQL 생성기가 사용하는 최종 형태)
//! - `parser`: 설명 파싱 로직

mod column;
mod ir;
mod parser;
mod table;
mod types;

pub use column::{default_column_label, default_table_label, Column, ForeignKey};
pub use ir::{ReferenceError, Schema};
pub use parser::{
    ColumnDescription, ForeignKeyDescription, JoinedTableDescription, OneOrMany,
    SchemaDescription, SchemaParser, TableDescription,
};
pub use table::{IncludedColumns, JoinedTable, Table};
pub use types::TypeTag;
