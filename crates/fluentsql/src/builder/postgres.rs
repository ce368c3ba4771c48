//! PostgreSQL compiler.

use super::{SqlBuilder, nested_list, quote_with};
use crate::error::SqlResult;
use crate::qb::context::{BuildContext, Placeholder};
use crate::qb::select::SelectInfo;
use crate::value::{Value, hex};

#[derive(Clone, Copy, Debug, Default)]
pub struct PostgresBuilder;

impl SqlBuilder for PostgresBuilder {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote(&self, ident: &str) -> String {
        quote_with(ident, '"', '"')
    }

    fn placeholder(&self) -> Placeholder {
        Placeholder::Dollar
    }

    fn write_like(&self, ctx: &mut BuildContext, value: Value) {
        ctx.push(" LIKE '%'||").push_param(value).push("||'%'");
    }

    fn literal(&self, value: &Value) -> SqlResult<String> {
        match value {
            Value::Bool(b) => Ok(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Value::Bytes(bytes) => Ok(format!("'\\x{}'::bytea", hex(bytes))),
            other => other.to_literal().ok_or_else(nested_list),
        }
    }

    /// `LIMIT t OFFSET s`, each part omitted when zero.
    fn write_limit(&self, ctx: &mut BuildContext, info: &SelectInfo) -> SqlResult<()> {
        if info.take > 0 {
            ctx.push_fmt(format_args!(" LIMIT {}", info.take));
        }
        if info.skip > 0 {
            ctx.push_fmt(format_args!(" OFFSET {}", info.skip));
        }
        Ok(())
    }
}
