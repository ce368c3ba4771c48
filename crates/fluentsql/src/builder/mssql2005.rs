//! SQL Server 2005/2008 compiler.
//!
//! These versions have no OFFSET/FETCH. A plain `take` becomes `TOP t`; as
//! soon as rows are skipped the whole statement is wrapped in a derived table
//! numbered with `ROW_NUMBER()`:
//!
//! ```text
//! SELECT <outer> FROM (SELECT <cols>,ROW_NUMBER() OVER(ORDER BY <order>) AS _N
//!   FROM ... WHERE ... GROUP BY ... HAVING ...) AS _T WHERE _N>skip AND _N<=skip+take
//! ```
//!
//! The outer list re-selects every inner column by its output name, so
//! expression columns must carry an alias and no two columns may share an
//! output name. Either violation is reported as [`SqlError::Unsupported`].

use super::mssql::{mssql_literal, quote_bracket, write_like_concat};
use super::{SqlBuilder, ensure_columns};
use crate::error::{SqlError, SqlResult};
use crate::qb::context::BuildContext;
use crate::qb::select::SelectInfo;
use crate::qb::table::{Column, Columns};
use crate::value::Value;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, Default)]
pub struct Mssql2005Builder;

impl Mssql2005Builder {
    /// Output names of the inner select list, quoted. Each name must be
    /// unique (case-insensitively) to be selectable from the derived table.
    fn outer_columns(&self, columns: &Columns) -> SqlResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut outer = Vec::with_capacity(columns.len());
        for column in columns.items() {
            let name = match column {
                Column::Bound { name, alias, .. } => alias.as_deref().unwrap_or(name),
                Column::Expr { sql, alias } => match alias {
                    Some(alias) => alias.as_str(),
                    None => {
                        return Err(self.unsupported(format!(
                            "expression column `{sql}` needs an alias when rows are skipped"
                        )));
                    }
                },
            };
            if !seen.insert(name.to_lowercase()) {
                return Err(self.unsupported(format!(
                    "output column `{name}` appears more than once; alias one of them when rows are skipped"
                )));
            }
            outer.push(self.quote(name));
        }
        Ok(outer)
    }

    fn unsupported(&self, message: String) -> SqlError {
        SqlError::Unsupported {
            dialect: self.name(),
            message,
        }
    }
}

impl SqlBuilder for Mssql2005Builder {
    fn name(&self) -> &'static str {
        "mssql2005"
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

    /// Pagination is folded into the statement head by `build_select`.
    fn write_limit(&self, _ctx: &mut BuildContext, _info: &SelectInfo) -> SqlResult<()> {
        Ok(())
    }

    fn build_select(&self, ctx: &mut BuildContext, info: &SelectInfo) -> SqlResult<()> {
        ensure_columns(&info.columns)?;

        if info.skip == 0 {
            ctx.push("SELECT ");
            if info.columns.is_distinct() {
                ctx.push("DISTINCT ");
            }
            if info.take > 0 {
                ctx.push_fmt(format_args!("TOP {} ", info.take));
            }
            self.write_columns(ctx, &info.columns);
            self.write_source(ctx, info)?;
            self.write_order_by(ctx, &info.orders);
            return Ok(());
        }

        let outer = self.outer_columns(&info.columns)?;
        ctx.push("SELECT ").push(&outer.join(",")).push(" FROM (SELECT ");
        if info.columns.is_distinct() {
            ctx.push("DISTINCT ");
        }
        self.write_columns(ctx, &info.columns);
        ctx.push(",ROW_NUMBER() OVER(ORDER BY ");
        if info.orders.is_empty() {
            ctx.push("(SELECT NULL)");
        } else {
            self.write_order_terms(ctx, &info.orders);
        }
        ctx.push(") AS _N");
        self.write_source(ctx, info)?;
        ctx.push_fmt(format_args!(") AS _T WHERE _N>{}", info.skip));
        if info.take > 0 {
            let last = u64::from(info.skip) + u64::from(info.take);
            ctx.push_fmt(format_args!(" AND _N<={last}"));
        }
        Ok(())
    }
}
