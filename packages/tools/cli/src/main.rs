//! dbmangler CLI (`dbm`)
//!
//! 스키마 설명 파일에서 DDL/DML을 생성하고, DB 스키마를 확인하는 Operator 도구입니다.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dbm_sql::DialectKind;

mod commands;
mod config;
mod context;

use config::Config;
use context::Context;

#[derive(Parser)]
#[command(name = "dbm")]
#[command(author, version, about = "dbmangler CLI - schema driven SQL for PostgreSQL and SQLite", long_about = None)]
struct Cli {
    /// Database URL (overrides DBM_DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Schema description file (.json, .toml, .yaml)
    #[arg(long, global = true)]
    schema: Option<PathBuf>,

    /// SQL dialect (overrides DBM_DIALECT)
    #[arg(long, global = true, value_parser = parse_dialect)]
    dialect: Option<DialectKind>,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    // ─────────────────────────────────────────────────────────────────────────
    // Offline
    // ─────────────────────────────────────────────────────────────────────────
    /// Print CREATE TABLE statements for the whole schema
    Ddl,

    /// Print DROP TABLE statements for the whole schema
    Drop,

    /// Print SELECT/INSERT/UPDATE/DELETE statements for a table
    Statements {
        /// Table name
        table: String,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Database
    // ─────────────────────────────────────────────────────────────────────────
    /// Compare the schema with the database (creates it when the database is empty)
    Check {
        /// Report an empty database instead of creating tables
        #[arg(long)]
        no_create: bool,
    },

    /// Drop every schema table and create it again
    Reset,

    /// Show the tables that exist in the database
    Inspect,
}

fn parse_dialect(value: &str) -> Result<DialectKind, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 로깅 초기화
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dbm=info,dbm_sql=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // 설정 결정 (CLI 옵션 > 환경변수)
    let config = Config::from_env()?.with_overrides(cli.database_url, cli.schema, cli.dialect);
    let ctx = Context::load(&config)?;

    match cli.command {
        Commands::Ddl => commands::ddl::ddl(&ctx, cli.format),
        Commands::Drop => commands::ddl::drop(&ctx, cli.format),
        Commands::Statements { table } => {
            commands::statements::statements(&ctx, &table, cli.format)
        }
        Commands::Check { no_create } => {
            commands::database::check(&config, &ctx, no_create, cli.format).await
        }
        Commands::Reset => commands::database::reset(&config, &ctx).await,
        Commands::Inspect => commands::database::inspect(&config, &ctx, cli.format).await,
    }
}
