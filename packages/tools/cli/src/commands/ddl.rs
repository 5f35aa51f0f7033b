//! DDL 출력 명령어

use dbm_sql::DdlGenerator;

use crate::context::Context;
use crate::OutputFormat;

/// CREATE TABLE 스크립트 출력
pub fn ddl(ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let ddl = DdlGenerator::new(&ctx.schema, ctx.dialect).generate()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ddl)?),
        OutputFormat::Text => {
            for statement in ddl.statements() {
                println!("{};", statement);
            }
        }
    }
    Ok(())
}

/// DROP TABLE 문 출력
pub fn drop(ctx: &Context, format: OutputFormat) -> anyhow::Result<()> {
    let statements = DdlGenerator::new(&ctx.schema, ctx.dialect).drop_tables();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&statements)?),
        OutputFormat::Text => {
            for statement in statements {
                println!("{};", statement);
            }
        }
    }
    Ok(())
}
