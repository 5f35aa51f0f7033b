//! dbm-core: dbmangler 공통 핵심 라이브러리
//!
//! 이 크레이트는 SQL 생성기와 CLI가 공유하는 스키마 모델을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `schema`: 선언 스키마(JSON/TOML/YAML) 파싱 및 IR 생성
//! - `error`: 공통 에러 타입

pub mod error;
pub mod schema;

pub use error::{Error, Result};
