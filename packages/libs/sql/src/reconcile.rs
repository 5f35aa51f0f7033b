//! Schema Reconciler
//!
//! 생성한 DDL과 DB에 이미 있는 테이블 DDL을 텍스트로 비교합니다.
//!
//! | DB 상태 | auto_create | 결과 |
//! |---------|-------------|------|
//! | 테이블 없음 | true | 전체 생성 후 `Created` |
//! | 테이블 없음 | false | `Mismatch(NoSchema)` |
//! | 테이블 수 부족 | - | `Mismatch(TableCountMismatch)` |
//! | 정의 불일치 | - | `Mismatch(TableDefinitionMismatch)` |
//! | 모두 일치 | - | `Ok` |

use serde::Serialize;

use dbm_core::schema::Schema;

use crate::ddl::{DdlGenerator, TableDdl};
use crate::dialect::Dialect;
use crate::error::Result;
use crate::executor::{Executor, SchemaIntrospector};

/// 스키마 불일치
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum Mismatch {
    #[error("database has no tables")]
    NoSchema,

    #[error("expected {expected} tables, database has {actual}")]
    TableCountMismatch { expected: usize, actual: usize },

    #[error("table '{table}' definition differs from the database")]
    TableDefinitionMismatch { table: String },
}

/// 조정 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Reconciliation {
    /// 기존 스키마가 일치
    Ok,
    /// 빈 DB에 스키마를 생성
    Created,
    /// 불일치 (처리는 호출자가 결정)
    Mismatch(Mismatch),
}

/// 기대 DDL과 실제 DDL 비교
///
/// 실제 DDL이 더 많은 것은 허용합니다 (스키마 밖의 테이블).
pub fn compare(expected: &[TableDdl], actual: &[String]) -> std::result::Result<(), Mismatch> {
    if actual.is_empty() {
        return Err(Mismatch::NoSchema);
    }

    if actual.len() < expected.len() {
        return Err(Mismatch::TableCountMismatch {
            expected: expected.len(),
            actual: actual.len(),
        });
    }

    for table in expected {
        if !actual.iter().any(|ddl| ddl == &table.create) {
            return Err(Mismatch::TableDefinitionMismatch {
                table: table.table.clone(),
            });
        }
    }

    Ok(())
}

/// Schema Reconciler
#[derive(Debug, Clone, Copy)]
pub struct SchemaReconciler<'a> {
    ddl: DdlGenerator<'a>,
}

impl<'a> SchemaReconciler<'a> {
    pub fn new(schema: &'a Schema, dialect: &'a dyn Dialect) -> Self {
        Self {
            ddl: DdlGenerator::new(schema, dialect),
        }
    }

    /// DB 스키마 확인 (필요하면 생성)
    pub async fn reconcile<E>(&self, db: &mut E, auto_create: bool) -> Result<Reconciliation>
    where
        E: Executor + SchemaIntrospector + ?Sized,
    {
        let expected = self.ddl.generate()?;
        let actual = db.existing_table_ddl().await?;

        match compare(&expected.tables, &actual) {
            Ok(()) => {
                tracing::info!(tables = expected.tables.len(), "Schema matches database");
                Ok(Reconciliation::Ok)
            }
            Err(Mismatch::NoSchema) if auto_create => {
                self.create_all(db).await?;
                tracing::info!(tables = expected.tables.len(), "Created schema");
                Ok(Reconciliation::Created)
            }
            Err(mismatch) => {
                tracing::warn!(%mismatch, "Schema mismatch");
                Ok(Reconciliation::Mismatch(mismatch))
            }
        }
    }

    /// 모든 CREATE TABLE 후 제약 실행
    pub async fn create_all<E>(&self, db: &mut E) -> Result<()>
    where
        E: Executor + ?Sized,
    {
        let ddl = self.ddl.generate()?;
        for statement in ddl.statements() {
            db.execute(statement, &[]).await?;
        }
        db.commit().await
    }

    /// 모든 테이블 DROP (선언 역순)
    pub async fn drop_all<E>(&self, db: &mut E) -> Result<()>
    where
        E: Executor + ?Sized,
    {
        for statement in self.ddl.drop_tables() {
            db.execute(&statement, &[]).await?;
        }
        db.commit().await
    }

    /// DROP 후 다시 생성
    pub async fn reset<E>(&self, db: &mut E) -> Result<()>
    where
        E: Executor + ?Sized,
    {
        self.drop_all(db).await?;
        self.create_all(db).await?;
        tracing::info!("Reset schema");
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// DDL 개요
// ─────────────────────────────────────────────────────────────────────────────

/// `CREATE TABLE` 텍스트에서 뽑은 테이블 개요
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOutline {
    pub name: String,
    pub columns: Vec<ColumnOutline>,
}

/// 컬럼 이름과 나머지 정의
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnOutline {
    pub name: String,
    pub definition: String,
}

/// `CREATE TABLE name(...)` 파싱
///
/// 괄호 안을 최상위 쉼표로 나눕니다. `FOREIGN KEY`, `CONSTRAINT`, `PRIMARY KEY` 등
/// 테이블 제약 항목은 컬럼에서 제외합니다. 형식이 맞지 않으면 `None`.
pub fn outline_table(ddl: &str) -> Option<TableOutline> {
    let ddl = ddl.trim().trim_end_matches(';');
    let head_len = "CREATE TABLE".len();
    if !ddl.get(..head_len)?.eq_ignore_ascii_case("CREATE TABLE") {
        return None;
    }

    let open = ddl.find('(')?;
    let close = ddl.rfind(')')?;
    if close < open {
        return None;
    }

    let name = ddl[head_len..open]
        .trim()
        .trim_matches(|c| c == '"' || c == '`' || c == '[' || c == ']')
        .to_string();
    if name.is_empty() {
        return None;
    }

    let columns = split_top_level(&ddl[open + 1..close])
        .into_iter()
        .filter(|item| !is_table_constraint(item))
        .filter_map(|item| {
            let (name, definition) = match item.split_once(char::is_whitespace) {
                Some((name, rest)) => (name, rest.trim()),
                None => (item, ""),
            };
            (!name.is_empty()).then(|| ColumnOutline {
                name: name.trim_matches('"').to_string(),
                definition: definition.to_string(),
            })
        })
        .collect();

    Some(TableOutline { name, columns })
}

fn split_top_level(body: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, ch) in body.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(body[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(body[start..].trim());

    items.into_iter().filter(|item| !item.is_empty()).collect()
}

fn is_table_constraint(item: &str) -> bool {
    let upper = item.to_ascii_uppercase();
    ["CONSTRAINT", "FOREIGN KEY", "PRIMARY KEY", "UNIQUE", "CHECK"]
        .iter()
        .any(|keyword| upper.starts_with(keyword))
}
