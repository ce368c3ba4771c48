//! MySQL / MariaDB compiler.

use super::{SqlBuilder, quote_with};
use crate::error::{SqlError, SqlResult};
use crate::qb::context::BuildContext;
use crate::qb::select::SelectInfo;
use crate::qb::table::JoinKind;
use crate::value::Value;

/// Row count MySQL documents for "all remaining rows" in `LIMIT offset,count`.
const MAX_ROWS: u64 = 18_446_744_073_709_551_615;

#[derive(Clone, Copy, Debug, Default)]
pub struct MysqlBuilder;

impl SqlBuilder for MysqlBuilder {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote(&self, ident: &str) -> String {
        quote_with(ident, '`', '`')
    }

    fn write_like(&self, ctx: &mut BuildContext, value: Value) {
        ctx.push(" LIKE CONCAT('%',").push_param(value).push(",'%')");
    }

    fn check_join(&self, kind: JoinKind) -> SqlResult<()> {
        if kind == JoinKind::Full {
            return Err(SqlError::Unsupported {
                dialect: self.name(),
                message: "FULL JOIN".to_string(),
            });
        }
        Ok(())
    }

    /// `LIMIT skip,take`
    fn write_limit(&self, ctx: &mut BuildContext, info: &SelectInfo) -> SqlResult<()> {
        match (info.skip, info.take) {
            (0, 0) => {}
            (skip, 0) => {
                ctx.push_fmt(format_args!(" LIMIT {skip},{MAX_ROWS}"));
            }
            (skip, take) => {
                ctx.push_fmt(format_args!(" LIMIT {skip},{take}"));
            }
        }
        Ok(())
    }
}
