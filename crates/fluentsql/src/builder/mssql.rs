//! SQL Server 2012+ compiler.

use super::{SqlBuilder, nested_list, quote_with};
use crate::error::SqlResult;
use crate::qb::context::BuildContext;
use crate::qb::select::SelectInfo;
use crate::value::{Value, hex};

#[derive(Clone, Copy, Debug, Default)]
pub struct MssqlBuilder;

/// `[ident]` with `]` doubled.
pub(crate) fn quote_bracket(ident: &str) -> String {
    quote_with(ident, '[', ']')
}

pub(crate) fn write_like_concat(ctx: &mut BuildContext, value: Value) {
    ctx.push(" LIKE '%'+").push_param(value).push("+'%'");
}

/// Binary literals use the `0x...` form.
pub(crate) fn mssql_literal(value: &Value) -> SqlResult<String> {
    match value {
        Value::Bytes(bytes) => Ok(format!("0x{}", hex(bytes))),
        other => other.to_literal().ok_or_else(nested_list),
    }
}

impl SqlBuilder for MssqlBuilder {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn quote(&self, ident: &str) -> String {
        quote_bracket(ident)
    }

    fn write_like(&self, ctx: &mut BuildContext, value: Value) {
        write_like_concat(ctx, value);
    }

    fn literal(&self, value: &Value) -> SqlResult<String> {
        mssql_literal(value)
    }

    /// `OFFSET s ROWS [FETCH NEXT t ROWS ONLY]`. OFFSET requires an ORDER BY,
    /// so `ORDER BY (SELECT NULL)` stands in when none was given.
    fn write_limit(&self, ctx: &mut BuildContext, info: &SelectInfo) -> SqlResult<()> {
        if info.skip == 0 && info.take == 0 {
            return Ok(());
        }
        if info.orders.is_empty() {
            ctx.push(" ORDER BY (SELECT NULL)");
        }
        ctx.push_fmt(format_args!(" OFFSET {} ROWS", info.skip));
        if info.take > 0 {
            ctx.push_fmt(format_args!(" FETCH NEXT {} ROWS ONLY", info.take));
        }
        Ok(())
    }
}
