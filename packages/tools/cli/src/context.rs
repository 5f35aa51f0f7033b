//! 실행 컨텍스트
//!
//! 설정에서 스키마를 로드하고, 필요할 때만 DB에 연결합니다.

use dbm_core::schema::{Schema, SchemaParser};
use dbm_sql::{Dialect, DialectKind, Executor, PgExecutor, SqliteExecutor};

use crate::config::Config;

/// 스키마 + dialect
pub struct Context {
    pub schema: Schema,
    pub dialect: &'static dyn Dialect,
    pub kind: DialectKind,
}

impl Context {
    pub fn load(config: &Config) -> anyhow::Result<Self> {
        let schema = SchemaParser::load(&config.schema_path).map_err(|e| {
            anyhow::anyhow!("Failed to load schema {}: {}", config.schema_path.display(), e)
        })?;
        let kind = config.dialect()?;

        tracing::debug!(
            path = %config.schema_path.display(),
            tables = schema.len(),
            dialect = %kind,
            "Loaded schema"
        );

        Ok(Self {
            schema,
            dialect: kind.dialect(),
            kind,
        })
    }
}

/// 연결된 DB
pub enum Database {
    Sqlite(SqliteExecutor),
    Postgres(PgExecutor),
}

impl Database {
    pub async fn connect(config: &Config, kind: DialectKind) -> anyhow::Result<Self> {
        let url = config.require_database_url()?;
        let database = match kind {
            DialectKind::Sqlite => Database::Sqlite(SqliteExecutor::connect(url).await?),
            DialectKind::Postgres => Database::Postgres(PgExecutor::connect(url).await?),
        };
        Ok(database)
    }

    pub fn executor(&mut self) -> &mut dyn Executor {
        match self {
            Database::Sqlite(db) => db as &mut dyn Executor,
            Database::Postgres(db) => db as &mut dyn Executor,
        }
    }

    /// 스키마 조회가 가능한 실행기 (현재 SQLite만)
    pub fn introspector(&mut self) -> anyhow::Result<&mut SqliteExecutor> {
        match self {
            Database::Sqlite(db) => Ok(db),
            Database::Postgres(_) => {
                anyhow::bail!("Schema introspection is only supported for SQLite databases")
            }
        }
    }
}
