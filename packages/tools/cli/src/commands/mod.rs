//! CLI 명령어 구현

pub mod database;
pub mod ddl;
pub mod statements;
