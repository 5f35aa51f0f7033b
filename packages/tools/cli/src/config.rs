//! CLI 설정
//!
//! 환경변수(`.env` 포함)에서 읽고, 전역 CLI 옵션이 있으면 덮어씁니다.

use std::env;
use std::path::PathBuf;

use dbm_sql::DialectKind;

/// CLI 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 데이터베이스 URL (`DBM_DATABASE_URL`)
    pub database_url: Option<String>,

    /// 스키마 설명 파일 (`DBM_SCHEMA`)
    pub schema_path: PathBuf,

    /// SQL dialect (`DBM_DIALECT`, 없으면 URL에서 추론)
    pub dialect: Option<DialectKind>,

    /// 빈 DB에 스키마 자동 생성 (`DBM_AUTO_CREATE`)
    pub auto_create: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DBM_DATABASE_URL").ok(),

            schema_path: env::var("DBM_SCHEMA")
                .unwrap_or_else(|_| "schema.json".to_string())
                .into(),

            dialect: env::var("DBM_DIALECT")
                .ok()
                .map(|v| v.parse::<DialectKind>())
                .transpose()
                .map_err(anyhow::Error::msg)?,

            auto_create: env::var("DBM_AUTO_CREATE")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        })
    }

    /// 전역 CLI 옵션 적용
    pub fn with_overrides(
        mut self,
        database_url: Option<String>,
        schema_path: Option<PathBuf>,
        dialect: Option<DialectKind>,
    ) -> Self {
        if database_url.is_some() {
            self.database_url = database_url;
        }
        if let Some(path) = schema_path {
            self.schema_path = path;
        }
        if dialect.is_some() {
            self.dialect = dialect;
        }
        self
    }

    /// 사용할 dialect 결정 (명시 > URL 추론)
    pub fn dialect(&self) -> anyhow::Result<DialectKind> {
        self.dialect
            .or_else(|| self.database_url.as_deref().and_then(DialectKind::from_url))
            .ok_or_else(|| {
                anyhow::anyhow!("Dialect not configured. Use --dialect or set DBM_DIALECT / DBM_DATABASE_URL")
            })
    }

    /// DB URL 필수 검증
    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Database URL not configured. Use --database-url or set DBM_DATABASE_URL"))
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            database_url: None,
            schema_path: "schema.json".into(),
            dialect: None,
            auto_create: true,
        }
    }

    #[test]
    fn test_dialect_resolution() {
        assert!(config().dialect().is_err());

        let from_url = config().with_overrides(Some("sqlite://app.db".to_string()), None, None);
        assert_eq!(from_url.dialect().unwrap(), DialectKind::Sqlite);

        let explicit = from_url.with_overrides(None, None, Some(DialectKind::Postgres));
        assert_eq!(explicit.dialect().unwrap(), DialectKind::Postgres);
        assert_eq!(explicit.require_database_url().unwrap(), "sqlite://app.db");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("FALSE"));
        assert!(!parse_flag(" off "));
    }
}
