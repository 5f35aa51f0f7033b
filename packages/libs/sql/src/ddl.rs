//! DDL 생성기
//!
//! Schema IR에서 CREATE TABLE / DROP TABLE 문을 생성합니다.
//! 기본키와 외래키의 표현 방식은 [`Dialect`]가 결정합니다.
//!
//! 출력은 결정적입니다. 같은 스키마는 항상 같은 텍스트를 만들고,
//! Schema Reconciler는 이 텍스트를 DB에 저장된 DDL과 그대로 비교합니다.

use serde::Serialize;

use dbm_core::schema::{Schema, Table, TypeTag};

use crate::builder::foreign_targets;
use crate::dialect::{Dialect, ForeignKeyStyle, PrimaryKeyStyle};
use crate::error::Result;

/// 테이블 하나의 DDL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDdl {
    /// 테이블 이름
    pub table: String,
    /// `CREATE TABLE` 문
    pub create: String,
    /// 모든 CREATE 이후 실행할 제약 (`ALTER TABLE ...`)
    pub constraints: Vec<String>,
}

/// 스키마 전체 DDL (선언 순서)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDdl {
    pub tables: Vec<TableDdl>,
}

impl SchemaDdl {
    /// 테이블별 CREATE 문
    pub fn create_statements(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.create.as_str())
    }

    /// 실행 순서대로 모든 문 (CREATE 전부 → 제약 전부)
    pub fn statements(&self) -> Vec<&str> {
        self.create_statements()
            .chain(
                self.tables
                    .iter()
                    .flat_map(|t| t.constraints.iter().map(|c| c.as_str())),
            )
            .collect()
    }

    /// 단일 스크립트 (`; ` 구분, 끝에 `;`)
    pub fn script(&self) -> String {
        let statements = self.statements();
        if statements.is_empty() {
            return String::new();
        }
        format!("{};", statements.join("; "))
    }
}

/// DDL 생성기
#[derive(Debug, Clone, Copy)]
pub struct DdlGenerator<'a> {
    schema: &'a Schema,
    dialect: &'a dyn Dialect,
}

impl<'a> DdlGenerator<'a> {
    pub fn new(schema: &'a Schema, dialect: &'a dyn Dialect) -> Self {
        Self { schema, dialect }
    }

    /// 모든 테이블의 DDL
    pub fn generate(&self) -> Result<SchemaDdl> {
        let tables = self
            .schema
            .all_tables()
            .map(|table| self.table_ddl(table))
            .collect::<Result<Vec<_>>>()?;

        Ok(SchemaDdl { tables })
    }

    /// 테이블 하나의 DDL
    pub fn create_table(&self, name: &str) -> Result<TableDdl> {
        let table = self.schema.table(name)?;
        self.table_ddl(table)
    }

    /// DROP TABLE 문 (선언 역순)
    pub fn drop_tables(&self) -> Vec<String> {
        let names: Vec<&str> = self.schema.table_names().collect();
        names
            .into_iter()
            .rev()
            .map(|name| self.dialect.drop_table(name))
            .collect()
    }

    fn table_ddl(&self, table: &Table) -> Result<TableDdl> {
        let foreign = foreign_targets(self.schema, table)?;
        let primary_key = table.index_columns();

        // 인라인 방식에서 복합 기본키는 테이블 제약으로 옮김
        let composite_inline = self.dialect.primary_key_style() == PrimaryKeyStyle::Inline
            && primary_key.len() > 1;

        let mut definitions: Vec<String> = table
            .all_columns()
            .map(|column| {
                let mut tokens = self.dialect.column_tokens(column);
                if composite_inline {
                    tokens.retain(|token| token != TypeTag::PrimaryKey.as_token());
                }
                if tokens.is_empty() {
                    column.name.clone()
                } else {
                    format!("{} {}", column.name, tokens.join(" "))
                }
            })
            .collect();

        match self.dialect.primary_key_style() {
            PrimaryKeyStyle::TableConstraint if !primary_key.is_empty() => {
                definitions.push(format!(
                    "CONSTRAINT {}_pkey PRIMARY KEY ({})",
                    table.name,
                    primary_key.join(", ")
                ));
            }
            PrimaryKeyStyle::Inline if composite_inline => {
                definitions.push(format!("PRIMARY KEY ({})", primary_key.join(", ")));
            }
            _ => {}
        }

        let mut constraints = Vec::new();
        for (column, target) in foreign {
            match self.dialect.foreign_key_style() {
                ForeignKeyStyle::Inline => definitions.push(format!(
                    "FOREIGN KEY({col}) REFERENCES {target}({col})",
                    col = column.name,
                    target = target.name
                )),
                ForeignKeyStyle::Deferred => constraints.push(format!(
                    "ALTER TABLE {table} ADD CONSTRAINT {table}_{col}_fkey FOREIGN KEY ({col}) \
                     REFERENCES {target} ({col}) MATCH SIMPLE ON UPDATE NO ACTION ON DELETE NO ACTION",
                    table = table.name,
                    col = column.name,
                    target = target.name
                )),
            }
        }

        let create = format!("CREATE TABLE {}({})", table.name, definitions.join(", "));
        tracing::debug!(table = %table.name, dialect = self.dialect.name(), sql = %create, "Generated DDL");

        Ok(TableDdl {
            table: table.name.clone(),
            create,
            constraints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{PostgresDialect, SqliteDialect};
    use dbm_core::schema::SchemaParser;

    fn sample_schema() -> Schema {
        SchemaParser::parse_json(
            r#"{ "tables": {
                "teams": { "columns": {
                    "team_id": { "type": ["INTEGER", "PRIMARY KEY", "AUTOINCREMENT"] },
                    "team_name": { "type": "TEXT" }
                } },
                "users": { "columns": {
                    "id": { "type": ["PRIMARY KEY", "AUTOINCREMENT"] },
                    "name": { "type": "TEXT" },
                    "team_id": { "type": ["INTEGER", "FOREIGN KEY"], "foreign_key": { "table": "teams" } }
                } }
            } }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_sqlite_create_table() {
        let schema = sample_schema();
        let ddl = DdlGenerator::new(&schema, &SqliteDialect);

        let users = ddl.create_table("users").unwrap();
        assert_eq!(
            users.create,
            "CREATE TABLE users(id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, team_id INTEGER, \
             FOREIGN KEY(team_id) REFERENCES teams(team_id))"
        );
        assert!(users.constraints.is_empty());
    }

    #[test]
    fn test_postgres_create_table() {
        let schema = sample_schema();
        let ddl = DdlGenerator::new(&schema, &PostgresDialect);

        let users = ddl.create_table("users").unwrap();
        assert_eq!(
            users.create,
            "CREATE TABLE users(id serial NOT NULL, name character varying, team_id INTEGER, \
             CONSTRAINT users_pkey PRIMARY KEY (id))"
        );
        assert_eq!(
            users.constraints,
            vec![
                "ALTER TABLE users ADD CONSTRAINT users_team_id_fkey FOREIGN KEY (team_id) \
                 REFERENCES teams (team_id) MATCH SIMPLE ON UPDATE NO ACTION ON DELETE NO ACTION"
                    .to_string()
            ]
        );
    }

    fn membership_schema() -> Schema {
        SchemaParser::parse_json(
            r#"{ "tables": {
                "teams": { "columns": {
                    "team_id": { "type": ["INTEGER", "PRIMARY KEY"] }
                } },
                "memberships": { "columns": {
                    "team_id": { "type": ["INTEGER", "PRIMARY KEY", "FOREIGN KEY"], "foreign_key": { "table": "teams" } },
                    "user_id": { "type": ["INTEGER", "PRIMARY KEY"] },
                    "role": { "type": "TEXT NOT NULL" }
                } }
            } }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_postgres_composite_primary_key() {
        let schema = membership_schema();
        let ddl = DdlGenerator::new(&schema, &PostgresDialect)
            .create_table("memberships")
            .unwrap();

        assert_eq!(
            ddl.create,
            "CREATE TABLE memberships(team_id INTEGER, user_id INTEGER, role TEXT NOT NULL, \
             CONSTRAINT memberships_pkey PRIMARY KEY (team_id, user_id))"
        );
        assert_eq!(ddl.create.matches("PRIMARY KEY").count(), 1);
        assert_eq!(ddl.constraints.len(), 1);
    }

    #[test]
    fn test_sqlite_composite_primary_key() {
        let schema = membership_schema();
        let ddl = DdlGenerator::new(&schema, &SqliteDialect)
            .create_table("memberships")
            .unwrap();

        assert_eq!(
            ddl.create,
            "CREATE TABLE memberships(team_id INTEGER, user_id INTEGER, role TEXT NOT NULL, \
             PRIMARY KEY (team_id, user_id), FOREIGN KEY(team_id) REFERENCES teams(team_id))"
        );

        let teams = DdlGenerator::new(&schema, &SqliteDialect)
            .create_table("teams")
            .unwrap();
        assert_eq!(teams.create, "CREATE TABLE teams(team_id INTEGER PRIMARY KEY)");
    }

    #[test]
    fn test_schema_script_orders_constraints_last() {
        let schema = sample_schema();
        let ddl = DdlGenerator::new(&schema, &PostgresDialect).generate().unwrap();

        let statements = ddl.statements();
        assert_eq!(statements.len(), 3);
        assert!(statements[0].starts_with("CREATE TABLE teams("));
        assert!(statements[1].starts_with("CREATE TABLE users("));
        assert!(statements[2].starts_with("ALTER TABLE users"));

        let script = ddl.script();
        assert!(script.ends_with("ON DELETE NO ACTION;"));
        assert_eq!(script.matches("; ").count(), 2);
    }

    #[test]
    fn test_drop_tables_reverse_order() {
        let schema = sample_schema();
        assert_eq!(
            DdlGenerator::new(&schema, &SqliteDialect).drop_tables(),
            vec!["DROP TABLE IF EXISTS users", "DROP TABLE IF EXISTS teams"]
        );
        assert_eq!(
            DdlGenerator::new(&schema, &PostgresDialect).drop_tables(),
            vec![
                "DROP TABLE IF EXISTS users CASCADE",
                "DROP TABLE IF EXISTS teams CASCADE"
            ]
        );
    }

    #[test]
    fn test_create_unknown_table() {
        let schema = sample_schema();
        let ddl = DdlGenerator::new(&schema, &SqliteDialect);
        assert!(ddl.create_table("posts").is_err());
    }

    #[test]
    fn test_empty_schema_script() {
        let schema = Schema::default();
        let ddl = DdlGenerator::new(&schema, &SqliteDialect).generate().unwrap();
        assert!(ddl.tables.is_empty());
        assert_eq!(ddl.script(), "");
    }
}
