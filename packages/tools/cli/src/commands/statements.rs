//! 테이블 DML 미리보기

use serde_json::json;

use dbm_sql::{Error, StatementBuilder};

use crate::context::Context;
use crate::OutputFormat;

pub fn statements(ctx: &Context, table: &str, format: OutputFormat) -> anyhow::Result<()> {
    let builder = StatementBuilder::new(&ctx.schema, ctx.dialect);

    let select = builder.select(table, &[])?;
    let insert = builder.insert(table)?;
    // 데이터 컬럼이 없는 테이블은 UPDATE/DELETE가 없음
    let update = optional(builder.update(table))?;
    let delete = optional(builder.delete(table))?;

    match format {
        OutputFormat::Json => {
            let out = json!({
                "table": table,
                "dialect": ctx.kind.to_string(),
                "select": select,
                "insert": insert,
                "update": update,
                "delete": delete,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!("-- {} ({})", table, ctx.kind);
            println!("{};", select);
            println!("{};", insert);
            for statement in [update, delete].into_iter().flatten() {
                println!("{};", statement);
            }
        }
    }
    Ok(())
}

fn optional(result: dbm_sql::Result<String>) -> anyhow::Result<Option<String>> {
    match result {
        Ok(sql) => Ok(Some(sql)),
        Err(Error::NoDataColumns { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
