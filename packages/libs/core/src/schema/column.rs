//! 컬럼 정의
//!
//! 테이블의 컬럼 메타데이터를 정의합니다.

use serde::{Deserialize, Serialize};

use super::types::TypeTag;

/// 컬럼 정의
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// 컬럼 이름
    pub name: String,

    /// 표시 이름
    pub label: String,

    /// 타입 태그 (순서가 DDL 토큰 순서를 결정)
    pub type_tags: Vec<TypeTag>,

    /// 외래키 참조
    #[serde(default)]
    pub foreign_key: Option<ForeignKey>,
}

/// 외래키 참조 정의
///
/// 참조 대상 컬럼은 항상 같은 이름입니다 (`<table>.<col> = <target>.<col>`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// 참조 대상 테이블
    pub table: String,
}

impl Column {
    /// 새 컬럼 생성 (label 생략 시 기본 규칙 적용)
    pub fn new(
        name: impl Into<String>,
        label: Option<String>,
        type_tags: Vec<TypeTag>,
        foreign_key: Option<ForeignKey>,
    ) -> Self {
        let name = name.into();
        let label = label.unwrap_or_else(|| default_column_label(&name));

        Self {
            name,
            label,
            type_tags,
            foreign_key,
        }
    }

    /// 태그 포함 여부
    pub fn has_tag(&self, tag: &TypeTag) -> bool {
        self.type_tags.contains(tag)
    }

    pub fn is_primary_key(&self) -> bool {
        self.has_tag(&TypeTag::PrimaryKey)
    }

    pub fn is_foreign_key(&self) -> bool {
        self.has_tag(&TypeTag::ForeignKey)
    }

    pub fn is_auto_increment(&self) -> bool {
        self.has_tag(&TypeTag::AutoIncrement)
    }

    /// 외래키 참조 대상 테이블 (FOREIGN KEY 태그가 있는 경우만)
    pub fn foreign_table(&self) -> Option<&str> {
        if !self.is_foreign_key() {
            return None;
        }
        self.foreign_key.as_ref().map(|fk| fk.table.as_str())
    }

    /// 첫 번째 네이티브 타입 이름 (제약 키워드 제외)
    pub fn native_type(&self) -> Option<String> {
        self.type_tags.iter().find_map(TypeTag::type_name)
    }
}

/// 컬럼 기본 label: `team_id` → `Team Id`
pub fn default_column_label(name: &str) -> String {
    title_case(&name.replace('_', " "))
}

/// 테이블 기본 label: `users` → `Users`
pub fn default_table_label(name: &str) -> String {
    title_case(name)
}

/// 알파벳 연속 구간마다 첫 글자만 대문자로 변환
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;

    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_labels() {
        assert_eq!(default_column_label("team_id"), "Team Id");
        assert_eq!(default_column_label("name"), "Name");
        assert_eq!(default_table_label("users"), "Users");
        assert_eq!(default_table_label("user_teams"), "User_Teams");
        assert_eq!(default_table_label("ORDERS"), "Orders");
    }

    #[test]
    fn test_explicit_label_wins() {
        let column = Column::new("team_id", Some("Team".to_string()), vec![], None);
        assert_eq!(column.label, "Team");
    }

    #[test]
    fn test_foreign_table_requires_tag() {
        let fk = Some(ForeignKey {
            table: "teams".to_string(),
        });

        let tagged = Column::new(
            "team_id",
            None,
            vec![TypeTag::from("INTEGER"), TypeTag::ForeignKey],
            fk.clone(),
        );
        assert_eq!(tagged.foreign_table(), Some("teams"));

        let untagged = Column::new("team_id", None, vec![TypeTag::from("INTEGER")], fk);
        assert_eq!(untagged.foreign_table(), None);
    }

    #[test]
    fn test_native_type_skips_constraints() {
        let column = Column::new(
            "age",
            None,
            vec![TypeTag::from("NOT NULL"), TypeTag::from("INTEGER")],
            None,
        );
        assert_eq!(column.native_type().as_deref(), Some("INTEGER"));

        let column = Column::new("age", None, vec![TypeTag::from("INTEGER NOT NULL")], None);
        assert_eq!(column.native_type().as_deref(), Some("INTEGER"));
    }
}
