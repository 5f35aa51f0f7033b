//! 컬럼 타입 태그 정의
//!
//! 스키마의 `type` 필드는 의미 태그(`PRIMARY KEY`, `FOREIGN KEY`, `TEXT`, `AUTOINCREMENT`)와
//! DB 네이티브 토큰(`INTEGER`, `NOT NULL` 등)이 섞인 순서 있는 목록입니다.
//! Dialect는 의미 태그만 분기하고, 네이티브 토큰은 그대로 출력합니다.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 컬럼 타입 태그
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TypeTag {
    /// 기본키 (index 컬럼)
    PrimaryKey,

    /// 외래키 (`foreign_key` 참조 필요)
    ForeignKey,

    /// 가변 길이 문자열 (dialect별 타입으로 변환)
    Text,

    /// 자동 증가 정수 (dialect별 관례로 변환, 다른 토큰을 대체)
    AutoIncrement,

    /// 변환 없이 출력되는 네이티브 토큰
    Native(String),
}

impl TypeTag {
    /// 토큰 문자열에서 파싱
    ///
    /// 의미 태그는 대소문자를 구분하지 않고, 그 외 토큰은 원문 그대로 보존합니다.
    pub fn from_token(token: &str) -> Self {
        let trimmed = token.trim();
        let normalized = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");

        if normalized.eq_ignore_ascii_case("PRIMARY KEY") {
            TypeTag::PrimaryKey
        } else if normalized.eq_ignore_ascii_case("FOREIGN KEY") {
            TypeTag::ForeignKey
        } else if normalized.eq_ignore_ascii_case("TEXT") {
            TypeTag::Text
        } else if normalized.eq_ignore_ascii_case("AUTOINCREMENT") {
            TypeTag::AutoIncrement
        } else {
            TypeTag::Native(trimmed.to_string())
        }
    }

    /// DDL에 쓰이는 토큰 문자열
    pub fn as_token(&self) -> &str {
        match self {
            TypeTag::PrimaryKey => "PRIMARY KEY",
            TypeTag::ForeignKey => "FOREIGN KEY",
            TypeTag::Text => "TEXT",
            TypeTag::AutoIncrement => "AUTOINCREMENT",
            TypeTag::Native(token) => token,
        }
    }

    /// 제약 조건 키워드로 시작하는 네이티브 토큰인지
    ///
    /// `NOT NULL`, `DEFAULT 0`, `UNIQUE` 처럼 타입 이름이 없는 토큰을 구분합니다.
    pub fn is_constraint(&self) -> bool {
        matches!(self, TypeTag::Native(_)) && self.type_name().is_none()
    }

    /// 네이티브 토큰의 타입 이름 부분
    ///
    /// 첫 제약 키워드 앞까지만 사용합니다.
    /// `INTEGER NOT NULL` → `INTEGER`, `NUMERIC(10, 2) UNIQUE` → `NUMERIC(10, 2)`.
    pub fn type_name(&self) -> Option<String> {
        let TypeTag::Native(token) = self else {
            return None;
        };

        let words: Vec<&str> = token
            .split_whitespace()
            .take_while(|word| !is_constraint_keyword(word))
            .collect();

        (!words.is_empty()).then(|| words.join(" "))
    }
}

fn is_constraint_keyword(word: &str) -> bool {
    const CONSTRAINT_KEYWORDS: &[&str] = &[
        "NOT",
        "NULL",
        "DEFAULT",
        "UNIQUE",
        "CHECK",
        "REFERENCES",
        "COLLATE",
        "CONSTRAINT",
        "GENERATED",
        "PRIMARY",
        "FOREIGN",
        "AUTOINCREMENT",
    ];

    CONSTRAINT_KEYWORDS
        .iter()
        .any(|kw| word.eq_ignore_ascii_case(kw))
}

impl From<String> for TypeTag {
    fn from(token: String) -> Self {
        TypeTag::from_token(&token)
    }
}

impl From<&str> for TypeTag {
    fn from(token: &str) -> Self {
        TypeTag::from_token(token)
    }
}

impl From<TypeTag> for String {
    fn from(tag: TypeTag) -> Self {
        tag.as_token().to_string()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}
