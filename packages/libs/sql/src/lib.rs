//! dbm-sql: 스키마 기반 SQL 생성 라이브러리
//!
//! Schema IR을 기반으로 런타임에 DDL/DML을 생성하고 실행합니다.
//! 조건 값은 항상 바인딩 파라미터로 전달되며 SQL 텍스트에 들어가지 않습니다.
//!
//! # 모듈 구조
//!
//! - `dialect`: PostgreSQL / SQLite 전략
//! - `ddl`: CREATE TABLE / DROP TABLE 생성기
//! - `builder`: CRUD SQL 빌더
//! - `params`: Data Normalizer와 요청 파라미터
//! - `reconcile`: 기존 DB 스키마 확인/생성
//! - `crud`: 실행기를 사용하는 행 단위 작업
//! - `executor`, `sqlite`, `postgres`: 실행기 trait과 sqlx 구현

pub mod builder;
pub mod crud;
pub mod ddl;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod params;
pub mod postgres;
pub mod reconcile;
pub mod sqlite;
pub mod value;

pub use builder::{BoundStatement, StatementBuilder};
pub use crud::Crud;
pub use ddl::{DdlGenerator, SchemaDdl, TableDdl};
pub use dialect::{Dialect, DialectKind, PostgresDialect, SqliteDialect};
pub use error::{Error, Result};
pub use executor::{Executor, SchemaIntrospector};
pub use params::{normalize, FieldData, Join, NormalizationError, OrderAndLimit, WhereClause};
pub use postgres::PgExecutor;
pub use reconcile::{compare, outline_table, Mismatch, Reconciliation, SchemaReconciler};
pub use sqlite::SqliteExecutor;
pub use value::{Row, SqlValue};
