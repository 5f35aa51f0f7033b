//! CRUD SQL 빌더
//!
//! Schema IR을 받아 dialect별 SQL을 생성합니다.
//!
//! - INSERT/UPDATE/DELETE: 데이터 컬럼 순서로 placeholder를 나열한 문자열
//! - SELECT: SeaQuery로 조립하며 조건 값과 LIMIT은 모두 바인딩 파라미터
//!
//! 알 수 없는 테이블은 SQL을 조립하기 전에 에러로 반환합니다.

use sea_query::{Alias, Asterisk, Expr, Iden, Order, Query, SelectStatement, SimpleExpr};

use dbm_core::schema::{Column, Schema, Table};

use crate::dialect::Dialect;
use crate::error::{Error, Result};
use crate::params::{condition_value, Join, OrderAndLimit, SortOrder, WhereClause};
use crate::value::SqlValue;

/// 동적 테이블/컬럼 식별자
#[derive(Debug, Clone)]
struct DynIden(String);

impl DynIden {
    fn new(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl Iden for DynIden {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "{}", self.0).unwrap();
    }
}

/// 바인딩 값이 있는 SQL
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// 외래키 컬럼과 참조 대상 테이블 (컬럼 순서)
///
/// 참조 대상이 스키마에 없으면 SQL을 만들기 전에 실패합니다.
pub(crate) fn foreign_targets<'s>(
    schema: &'s Schema,
    table: &'s Table,
) -> Result<Vec<(&'s Column, &'s Table)>> {
    let mut targets = Vec::new();

    for column in table.all_columns().filter(|c| c.is_foreign_key()) {
        let target_name = column
            .foreign_table()
            .ok_or_else(|| dbm_core::Error::MissingForeignKey {
                table: table.name.clone(),
                column: column.name.clone(),
            })?;
        let target =
            schema
                .get_table(target_name)
                .ok_or_else(|| dbm_core::Error::InvalidReference {
                    table: table.name.clone(),
                    column: column.name.clone(),
                    ref_table: target_name.to_string(),
                })?;
        targets.push((column, target));
    }

    Ok(targets)
}

/// Statement Builder
///
/// 순수 함수만 제공하므로 여러 스레드에서 동시에 사용해도 됩니다.
#[derive(Debug, Clone, Copy)]
pub struct StatementBuilder<'a> {
    schema: &'a Schema,
    dialect: &'a dyn Dialect,
}

impl<'a> StatementBuilder<'a> {
    /// 새 빌더 생성
    pub fn new(schema: &'a Schema, dialect: &'a dyn Dialect) -> Self {
        Self { schema, dialect }
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    // ─────────────────────────────────────────────────────────────────────────
    // SELECT
    // ─────────────────────────────────────────────────────────────────────────

    /// `SELECT *` + 외래키 INNER JOIN + 호출자 조인
    pub fn select(&self, table: &str, joins: &[Join]) -> Result<String> {
        let table = self.schema.table(table)?;
        let query = self.select_query(table, joins)?;
        let (sql, _) = self.dialect.render_select(&query);
        Ok(sql)
    }

    /// 조건/정렬/제한이 있는 SELECT
    ///
    /// 조건 값과 LIMIT은 바인딩 파라미터로 반환됩니다.
    /// 조인 표현식과 정렬 표현식은 SQL 조각 그대로 들어가므로 신뢰 입력만 허용합니다.
    pub fn subset_select(
        &self,
        table: &str,
        conditions: &WhereClause,
        joins: &[Join],
        order_and_limit: Option<&OrderAndLimit>,
    ) -> Result<BoundStatement> {
        let table = self.schema.table(table)?;
        let mut query = self.select_query(table, joins)?;

        // WHERE
        for (field, value) in conditions.iter() {
            let value = condition_value(field, value)?;
            let (table_name, column_name, column) = self.resolve_condition(table, field)?;
            let col = Expr::col((DynIden::new(table_name), DynIden::new(column_name)));

            if value.is_null() {
                query.and_where(col.is_null());
            } else {
                query.and_where(col.eq(self.bind_value(value, column)));
            }
        }

        // ORDER BY / LIMIT
        if let Some(order_and_limit) = order_and_limit {
            for (expr, order) in order_and_limit.order_terms() {
                let order = match order {
                    SortOrder::Asc => Order::Asc,
                    SortOrder::Desc => Order::Desc,
                };
                query.order_by_expr(Expr::cust(expr), order);
            }
            if let Some(limit) = order_and_limit.limit {
                query.limit(limit);
            }
        }

        let (sql, values) = self.dialect.render_select(&query);
        Ok(BoundStatement {
            sql,
            params: values.0.into_iter().map(SqlValue::from).collect(),
        })
    }

    fn select_query(&self, table: &Table, joins: &[Join]) -> Result<SelectStatement> {
        let mut query = Query::select();
        query.column(Asterisk).from(DynIden::new(&table.name));

        // 외래키 조인: 양쪽 모두 같은 컬럼 이름
        for (column, target) in foreign_targets(self.schema, table)? {
            query.inner_join(
                DynIden::new(&target.name),
                Expr::col((DynIden::new(&table.name), DynIden::new(&column.name)))
                    .equals((DynIden::new(&target.name), DynIden::new(&column.name))),
            );
        }

        // 호출자 조인 (호출 순서)
        for join in joins {
            self.schema.table(&join.joined_table)?;
            let condition = join.condition();
            query.inner_join(
                DynIden::new(&join.joined_table),
                Expr::cust(condition.as_str()),
            );
        }

        Ok(query)
    }

    /// 조건 키를 (테이블, 컬럼, 컬럼 정의)로 해석
    ///
    /// `table.column`은 그대로, `column`은 기준 테이블 → 외래키 대상 테이블 순으로 찾습니다.
    /// 어느 쪽이든 컬럼이 없으면 SQL을 만들기 전에 `UnknownColumn`입니다.
    fn resolve_condition<'f>(
        &self,
        table: &'a Table,
        field: &'f str,
    ) -> Result<(&'f str, &'f str, &'a Column)>
    where
        'a: 'f,
    {
        if let Some((table_name, column_name)) = field.split_once('.') {
            let qualified = self.schema.table(table_name)?;
            let column = qualified.find_column(column_name).ok_or_else(|| {
                dbm_core::Error::UnknownColumn {
                    table: table_name.to_string(),
                    column: column_name.to_string(),
                }
            })?;
            return Ok((table_name, column_name, column));
        }

        if let Some(column) = table.find_column(field) {
            return Ok((&table.name, field, column));
        }

        for (_, target) in foreign_targets(self.schema, table)? {
            if let Some(column) = target.find_column(field) {
                return Ok((&target.name, field, column));
            }
        }

        Err(dbm_core::Error::UnknownColumn {
            table: table.name.clone(),
            column: field.to_string(),
        }
        .into())
    }

    fn bind_value(&self, value: SqlValue, column: &Column) -> SimpleExpr {
        let value: sea_query::Value = value.into();
        match self.dialect.cast_type(column) {
            Some(cast) => Expr::val(value).cast_as(Alias::new(cast)),
            None => Expr::val(value).into(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // INSERT / UPDATE / DELETE
    // ─────────────────────────────────────────────────────────────────────────

    /// `INSERT INTO t (cols…) VALUES (placeholders…)`
    ///
    /// 컬럼/placeholder 순서는 Data Normalizer 결과 순서와 같습니다.
    pub fn insert(&self, table: &str) -> Result<String> {
        let table = self.schema.table(table)?;
        let columns: Vec<&Column> = table.data_columns().collect();

        if columns.is_empty() {
            return Ok(format!("INSERT INTO {} DEFAULT VALUES", table.name));
        }

        let names = columns
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = columns
            .iter()
            .enumerate()
            .map(|(i, c)| self.dialect.placeholder(i + 1, c))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name, names, placeholders
        ))
    }

    /// `UPDATE t SET c=?, … WHERE c=? AND …`
    ///
    /// 파라미터는 `[새 값…, 기존 값…]` 순서입니다.
    pub fn update(&self, table: &str) -> Result<String> {
        let table = self.schema.table(table)?;
        let columns = self.match_columns(table)?;

        let assignments = self.assignments(&columns, 0, ", ");
        let filter = self.assignments(&columns, columns.len(), " AND ");

        Ok(format!(
            "UPDATE {} SET {} WHERE {}",
            table.name, assignments, filter
        ))
    }

    /// `DELETE FROM t WHERE c=? AND …`
    pub fn delete(&self, table: &str) -> Result<String> {
        let table = self.schema.table(table)?;
        let columns = self.match_columns(table)?;

        Ok(format!(
            "DELETE FROM {} WHERE {}",
            table.name,
            self.assignments(&columns, 0, " AND ")
        ))
    }

    /// 행 매칭에 쓰는 데이터 컬럼 (없으면 전체 행이 매칭되므로 에러)
    fn match_columns<'t>(&self, table: &'t Table) -> Result<Vec<&'t Column>> {
        let columns: Vec<&Column> = table.data_columns().collect();
        if columns.is_empty() {
            return Err(Error::NoDataColumns {
                table: table.name.clone(),
            });
        }
        Ok(columns)
    }

    fn assignments(&self, columns: &[&Column], offset: usize, separator: &str) -> String {
        columns
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}={}", c.name, self.dialect.placeholder(offset + i + 1, c)))
            .collect::<Vec<_>>()
            .join(separator)
    }
}
