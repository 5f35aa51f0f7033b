//! DB 대상 명령어 (check / reset / inspect)

use dbm_sql::{outline_table, Reconciliation, SchemaIntrospector, SchemaReconciler};

use crate::config::Config;
use crate::context::{Context, Database};
use crate::OutputFormat;

/// 스키마 확인 (빈 DB면 생성)
pub async fn check(
    config: &Config,
    ctx: &Context,
    no_create: bool,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut db = Database::connect(config, ctx.kind).await?;
    let auto_create = config.auto_create && !no_create;

    let result = SchemaReconciler::new(&ctx.schema, ctx.dialect)
        .reconcile(db.introspector()?, auto_create)
        .await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => match &result {
            Reconciliation::Ok => println!("Schema is up to date"),
            Reconciliation::Created => {
                println!("Created {} tables", ctx.schema.len())
            }
            Reconciliation::Mismatch(mismatch) => println!("Schema mismatch: {}", mismatch),
        },
    }

    if let Reconciliation::Mismatch(mismatch) = result {
        anyhow::bail!("Schema check failed: {}", mismatch);
    }
    Ok(())
}

/// 모든 테이블 DROP 후 다시 생성
pub async fn reset(config: &Config, ctx: &Context) -> anyhow::Result<()> {
    let mut db = Database::connect(config, ctx.kind).await?;

    SchemaReconciler::new(&ctx.schema, ctx.dialect)
        .reset(db.executor())
        .await?;

    println!("Reset {} tables", ctx.schema.len());
    Ok(())
}

/// DB에 있는 테이블 개요 출력
pub async fn inspect(config: &Config, ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let mut db = Database::connect(config, ctx.kind).await?;
    let ddl = db.introspector()?.existing_table_ddl().await?;

    let outlines: Vec<_> = ddl.iter().filter_map(|sql| outline_table(sql)).collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outlines)?),
        OutputFormat::Text => {
            if outlines.is_empty() {
                println!("No tables");
            }
            for table in outlines {
                let marker = if ctx.schema.has_table(&table.name) {
                    ""
                } else {
                    " (not in schema)"
                };
                println!("{}{}", table.name, marker);
                for column in table.columns {
                    println!("  - {} {}", column.name, column.definition);
                }
            }
        }
    }
    Ok(())
}
