//! CRUD Facade
//!
//! Statement Builder + Data Normalizer + 실행기를 묶은 행 단위 작업입니다.
//! 쓰기는 실행 직후 커밋합니다. 여러 문으로 이루어진 작업(`get_or_insert`)은
//! 앞 단계를 되돌리지 않습니다.

use indexmap::IndexMap;

use dbm_core::schema::Schema;

use crate::builder::{foreign_targets, StatementBuilder};
use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::params::{normalize, FieldData, Join, OrderAndLimit, WhereClause};
use crate::value::{Row, SqlValue};

/// CRUD Facade
#[derive(Debug, Clone, Copy)]
pub struct Crud<'a> {
    builder: StatementBuilder<'a>,
}

impl<'a> Crud<'a> {
    pub fn new(schema: &'a Schema, dialect: &'a dyn Dialect) -> Self {
        Self {
            builder: StatementBuilder::new(schema, dialect),
        }
    }

    pub fn builder(&self) -> &StatementBuilder<'a> {
        &self.builder
    }

    /// 행 삽입
    pub async fn insert_row(
        &self,
        executor: &mut dyn Executor,
        table: &str,
        fields: &FieldData,
    ) -> Result<()> {
        let sql = self.builder.insert(table)?;
        let params = normalize(self.builder.schema().table(table)?, fields, "")?;
        self.write(executor, &sql, &params).await
    }

    /// 모든 데이터 컬럼이 일치하는 행 삭제
    pub async fn delete_row(
        &self,
        executor: &mut dyn Executor,
        table: &str,
        fields: &FieldData,
    ) -> Result<()> {
        let sql = self.builder.delete(table)?;
        let params = normalize(self.builder.schema().table(table)?, fields, "")?;
        self.write(executor, &sql, &params).await
    }

    /// `old`와 일치하는 행을 `new`로 변경 (파라미터: new + old)
    pub async fn update_row(
        &self,
        executor: &mut dyn Executor,
        table: &str,
        old: &FieldData,
        new: &FieldData,
    ) -> Result<()> {
        let sql = self.builder.update(table)?;
        let definition = self.builder.schema().table(table)?;

        let mut params = normalize(definition, new, "")?;
        params.extend(normalize(definition, old, "")?);

        self.write(executor, &sql, &params).await
    }

    /// 조건/조인/정렬/제한 조회
    pub async fn select_subset(
        &self,
        executor: &mut dyn Executor,
        table: &str,
        conditions: &WhereClause,
        joins: &[Join],
        order_and_limit: Option<&OrderAndLimit>,
    ) -> Result<Vec<Row>> {
        let statement = self
            .builder
            .subset_select(table, conditions, joins, order_and_limit)?;
        executor.execute(&statement.sql, &statement.params).await
    }

    /// 전체 행 조회 (외래키 조인 포함)
    pub async fn select_all(&self, executor: &mut dyn Executor, table: &str) -> Result<Vec<Row>> {
        let sql = self.builder.select(table, &[])?;
        executor.execute(&sql, &[]).await
    }

    /// 데이터 컬럼이 모두 일치하는 행을 찾고, 없으면 삽입 후 다시 조회
    ///
    /// 일치하는 행이 여러 개이거나 삽입 후에도 찾지 못하면
    /// [`Error::AmbiguousOrFailedInsert`]를 반환합니다.
    pub async fn get_or_insert(
        &self,
        executor: &mut dyn Executor,
        table: &str,
        fields: &FieldData,
    ) -> Result<Row> {
        let definition = self.builder.schema().table(table)?;
        let values = normalize(definition, fields, "")?;

        let conditions = WhereClause(
            definition
                .data_columns()
                .zip(values)
                .map(|(column, value)| {
                    (format!("{}.{}", table, column.name), serde_json::Value::from(value))
                })
                .collect(),
        );

        let mut rows = self
            .select_subset(executor, table, &conditions, &[], None)
            .await?;

        if rows.is_empty() {
            tracing::debug!(table, "No matching row, inserting");
            self.insert_row(executor, table, fields).await?;
            rows = self
                .select_subset(executor, table, &conditions, &[], None)
                .await?;
        }

        if rows.len() != 1 {
            return Err(Error::AmbiguousOrFailedInsert {
                table: table.to_string(),
                matches: rows.len(),
            });
        }

        Ok(rows.remove(0))
    }

    /// 외래키가 참조하는 테이블의 전체 행 (대상 테이블별 한 번)
    pub async fn get_foreign_rows(
        &self,
        executor: &mut dyn Executor,
        table: &str,
    ) -> Result<IndexMap<String, Vec<Row>>> {
        let schema = self.builder.schema();
        let definition = schema.table(table)?;

        let mut foreign_rows = IndexMap::new();
        for (_, target) in foreign_targets(schema, definition)? {
            if foreign_rows.contains_key(&target.name) {
                continue;
            }
            let rows = self.select_all(executor, &target.name).await?;
            foreign_rows.insert(target.name.clone(), rows);
        }

        Ok(foreign_rows)
    }

    async fn write(
        &self,
        executor: &mut dyn Executor,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<()> {
        executor.execute(sql, params).await?;
        executor.commit().await
    }
}
