//! Dialect compilers.
//!
//! A [`SqlBuilder`] walks a statement descriptor plus its filter trees and
//! writes SQL text and parameters into a [`BuildContext`]. The shared grammar
//! (column lists, FROM/JOIN, WHERE, GROUP BY/HAVING, ORDER BY, filters, INSERT,
//! UPDATE, DELETE) lives in the trait's default methods; each dialect supplies
//! identifier quoting, placeholder style, the LIKE form, literal rendering and
//! its pagination strategy.
//!
//! | Dialect | Quoting | Placeholders | Pagination |
//! |---|---|---|---|
//! | [`Dialect::Mssql`] | `[x]` | `?` | `OFFSET s ROWS FETCH NEXT t ROWS ONLY` |
//! | [`Dialect::Mssql2005`] | `[x]` | `?` | `TOP t`, ROW_NUMBER() derived table when skipping |
//! | [`Dialect::Mysql`] | `` `x` `` | `?` | `LIMIT s,t` |
//! | [`Dialect::Postgres`] | `"x"` | `$n` | `LIMIT t OFFSET s` |
//!
//! Compilation is all-or-nothing: [`Dialect::compile_select`] and friends
//! return a [`BuiltQuery`] only on success and drop the partial buffer on error.

pub mod mssql;
pub mod mssql2005;
pub mod mysql;
pub mod postgres;

pub use mssql::MssqlBuilder;
pub use mssql2005::Mssql2005Builder;
pub use mysql::MysqlBuilder;
pub use postgres::PostgresBuilder;

use crate::error::{SqlError, SqlResult};
use crate::qb::context::{BuildContext, BuiltQuery, Placeholder};
use crate::qb::delete::DeleteInfo;
use crate::qb::filter::{Filter, Leaf, Node, Op};
use crate::qb::insert::InsertInfo;
use crate::qb::select::SelectInfo;
use crate::qb::table::{Column, Columns, Groupers, JoinKind, Sorters, Table};
use crate::qb::update::{UpdateInfo, UpdateValue};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

/// Per-dialect statement compiler.
pub trait SqlBuilder: Send + Sync {
    /// Dialect name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Quote an identifier.
    fn quote(&self, ident: &str) -> String;

    fn placeholder(&self) -> Placeholder {
        Placeholder::Question
    }

    /// Write the pagination tail of a SELECT (after ORDER BY).
    fn write_limit(&self, ctx: &mut BuildContext, info: &SelectInfo) -> SqlResult<()>;

    /// Write ` LIKE <pattern>` binding `value` as a contains-match.
    fn write_like(&self, ctx: &mut BuildContext, value: Value);

    /// Render a value as an inline literal (for `IN` lists).
    fn literal(&self, value: &Value) -> SqlResult<String> {
        value.to_literal().ok_or_else(nested_list)
    }

    /// Reject join kinds the dialect cannot express.
    fn check_join(&self, _kind: JoinKind) -> SqlResult<()> {
        Ok(())
    }

    // ==================== Statements ====================

    fn build_select(&self, ctx: &mut BuildContext, info: &SelectInfo) -> SqlResult<()> {
        ensure_columns(&info.columns)?;
        ctx.push("SELECT ");
        if info.columns.is_distinct() {
            ctx.push("DISTINCT ");
        }
        self.write_columns(ctx, &info.columns);
        self.write_source(ctx, info)?;
        self.write_order_by(ctx, &info.orders);
        self.write_limit(ctx, info)
    }

    fn build_insert(&self, ctx: &mut BuildContext, info: &InsertInfo) -> SqlResult<()> {
        if info.values.is_empty() {
            return Err(SqlError::invalid_statement(format!(
                "INSERT INTO {} has no values",
                info.table
            )));
        }

        ctx.push("INSERT INTO ").push(&self.quote(&info.table)).push("(");
        for (i, (column, _)) in info.values.iter().enumerate() {
            if i > 0 {
                ctx.push(",");
            }
            ctx.push(&self.quote(column));
        }
        ctx.push(") VALUES(");
        for (i, (column, value)) in info.values.iter().enumerate() {
            ensure_bindable(column, value)?;
            if i > 0 {
                ctx.push(",");
            }
            ctx.push_param(value.clone());
        }
        ctx.push(")");
        Ok(())
    }

    fn build_update(&self, ctx: &mut BuildContext, info: &UpdateInfo) -> SqlResult<()> {
        if info.values.is_empty() {
            return Err(SqlError::invalid_statement(format!(
                "UPDATE {} has no SET values",
                info.table
            )));
        }

        ctx.push("UPDATE ").push(&self.quote(&info.table)).push(" SET ");
        for (i, (column, value)) in info.values.iter().enumerate() {
            if i > 0 {
                ctx.push(",");
            }
            let col = self.quote(column);
            match value {
                UpdateValue::Assign(v) => {
                    ensure_bindable(column, v)?;
                    ctx.push(&col).push("=").push_param(v.clone());
                }
                UpdateValue::Increment(v) => {
                    ensure_bindable(column, v)?;
                    ctx.push(&col).push("=").push(&col).push("+").push_param(v.clone());
                }
                UpdateValue::Raw(expr) => {
                    ctx.push(&col).push("=").push(expr);
                }
            }
        }
        self.write_where(ctx, info.filter.as_ref())
    }

    fn build_delete(&self, ctx: &mut BuildContext, info: &DeleteInfo) -> SqlResult<()> {
        ctx.push("DELETE FROM ").push(&self.quote(&info.table));
        self.write_where(ctx, info.filter.as_ref())
    }

    // ==================== Clauses ====================

    /// `[prefix].[column]`, or just `[column]` without a table.
    fn qualified(&self, table: Option<&Table>, column: &str) -> String {
        match table {
            Some(t) => format!("{}.{}", self.quote(t.prefix()), self.quote(column)),
            None => self.quote(column),
        }
    }

    fn write_column(&self, ctx: &mut BuildContext, column: &Column) {
        match column {
            Column::Bound { table, name, .. } => {
                ctx.push(&self.qualified(table.as_ref(), name));
            }
            Column::Expr { sql, .. } => {
                ctx.push(sql);
            }
        }
        if let Some(alias) = column.alias() {
            ctx.push(" AS ").push(&self.quote(alias));
        }
    }

    fn write_columns(&self, ctx: &mut BuildContext, columns: &Columns) {
        for (i, column) in columns.items().iter().enumerate() {
            if i > 0 {
                ctx.push(",");
            }
            self.write_column(ctx, column);
        }
    }

    /// `[name]` plus ` AS [alias]`.
    fn write_table(&self, ctx: &mut BuildContext, table: &Table) {
        ctx.push(&self.quote(table.name()));
        if let Some(alias) = table.alias() {
            ctx.push(" AS ").push(&self.quote(alias));
        }
    }

    /// FROM, JOINs, WHERE, GROUP BY and HAVING.
    fn write_source(&self, ctx: &mut BuildContext, info: &SelectInfo) -> SqlResult<()> {
        ctx.push(" FROM ");
        self.write_table(ctx, &info.table);

        for join in &info.joins {
            self.check_join(join.kind)?;
            ctx.push(" ").push(join.kind.as_sql()).push(" ");
            self.write_table(ctx, &join.table);
            ctx.push(" ON ");
            self.build_filter(ctx, &join.on)?;
        }

        self.write_where(ctx, info.filter.as_ref())?;
        self.write_group_by(ctx, &info.groups, info.having.as_ref())
    }

    fn write_where(&self, ctx: &mut BuildContext, filter: Option<&Filter>) -> SqlResult<()> {
        match filter {
            Some(f) if !f.is_empty() => {
                ctx.push(" WHERE ");
                self.build_filter(ctx, f)
            }
            _ => Ok(()),
        }
    }

    /// GROUP BY list; HAVING is only written when a GROUP BY is.
    fn write_group_by(
        &self,
        ctx: &mut BuildContext,
        groups: &Groupers,
        having: Option<&Filter>,
    ) -> SqlResult<()> {
        if groups.is_empty() {
            if having.is_some() {
                tracing::debug!(
                    target: "fluentsql.sql",
                    dialect = self.name(),
                    "HAVING without GROUP BY is not emitted"
                );
            }
            return Ok(());
        }

        ctx.push(" GROUP BY ");
        let mut first = true;
        for grouper in groups.items() {
            for column in &grouper.columns {
                if !first {
                    ctx.push(",");
                }
                first = false;
                ctx.push(&self.qualified(grouper.table.as_ref(), column));
            }
        }

        match having {
            Some(h) if !h.is_empty() => {
                ctx.push(" HAVING ");
                self.build_filter(ctx, h)
            }
            _ => Ok(()),
        }
    }

    /// Comma-separated ordering terms without the `ORDER BY` keyword.
    fn write_order_terms(&self, ctx: &mut BuildContext, orders: &Sorters) {
        let mut first = true;
        for sorter in orders.items() {
            for column in &sorter.columns {
                if !first {
                    ctx.push(",");
                }
                first = false;
                ctx.push(&self.qualified(sorter.table.as_ref(), column))
                    .push(" ")
                    .push(sorter.order.as_sql());
            }
        }
    }

    fn write_order_by(&self, ctx: &mut BuildContext, orders: &Sorters) {
        if !orders.is_empty() {
            ctx.push(" ORDER BY ");
            self.write_order_terms(ctx, orders);
        }
    }

    // ==================== Filters ====================

    /// Compile a filter tree. AND/OR parenthesize each operand.
    fn build_filter(&self, ctx: &mut BuildContext, filter: &Filter) -> SqlResult<()> {
        match filter.node() {
            Node::Leaves(leaves) => {
                if leaves.is_empty() {
                    ctx.push("1=1");
                }
                for (i, leaf) in leaves.iter().enumerate() {
                    if i > 0 {
                        ctx.push(" AND ");
                    }
                    self.build_leaf(ctx, leaf)?;
                }
                Ok(())
            }
            Node::Not(inner) => {
                ctx.push("NOT(");
                self.build_filter(ctx, inner)?;
                ctx.push(")");
                Ok(())
            }
            Node::And(left, right) => self.build_binary(ctx, left, "AND", right),
            Node::Or(left, right) => self.build_binary(ctx, left, "OR", right),
        }
    }

    /// `(<left>) KEYWORD (<right>)`
    fn build_binary(
        &self,
        ctx: &mut BuildContext,
        left: &Filter,
        keyword: &str,
        right: &Filter,
    ) -> SqlResult<()> {
        ctx.push("(");
        self.build_filter(ctx, left)?;
        ctx.push(") ").push(keyword).push(" (");
        self.build_filter(ctx, right)?;
        ctx.push(")");
        Ok(())
    }

    fn build_leaf(&self, ctx: &mut BuildContext, leaf: &Leaf) -> SqlResult<()> {
        match leaf {
            Leaf::Column {
                table,
                column,
                op,
                value,
            } => self.build_column_leaf(ctx, table.as_ref(), column, *op, value),
            Leaf::Columns {
                left,
                left_column,
                op,
                right,
                right_column,
            } => {
                if matches!(op, Op::In | Op::Like) {
                    return Err(SqlError::invalid_filter(format!(
                        "{} is not valid between columns {}.{} and {}.{}",
                        op.as_sql(),
                        left.prefix(),
                        left_column,
                        right.prefix(),
                        right_column
                    )));
                }
                ctx.push(&self.qualified(Some(left), left_column))
                    .push(op.as_sql())
                    .push(&self.qualified(Some(right), right_column));
                Ok(())
            }
            Leaf::Expr(sql) => {
                ctx.push(sql);
                Ok(())
            }
        }
    }

    fn build_column_leaf(
        &self,
        ctx: &mut BuildContext,
        table: Option<&Table>,
        column: &str,
        op: Op,
        value: &Value,
    ) -> SqlResult<()> {
        let col = self.qualified(table, column);
        match (op, value) {
            (Op::Eq, Value::Null) => {
                ctx.push(&col).push(" IS NULL");
            }
            (Op::Ne, Value::Null) => {
                ctx.push(&col).push(" IS NOT NULL");
            }
            (Op::In, value) => {
                let items = match value {
                    Value::List(items) => items.as_slice(),
                    single => std::slice::from_ref(single),
                };
                if items.is_empty() {
                    ctx.push("1=0");
                    return Ok(());
                }
                let literals = items
                    .iter()
                    .map(|v| self.literal(v))
                    .collect::<SqlResult<Vec<_>>>()?;
                ctx.push(&col).push(" IN(").push(&literals.join(",")).push(")");
            }
            (Op::Like, value) => {
                ensure_bindable(column, value)?;
                ctx.push(&col);
                self.write_like(ctx, value.clone());
            }
            (op, value) => {
                ensure_bindable(column, value)?;
                ctx.push(&col).push(op.as_sql()).push_param(value.clone());
            }
        }
        Ok(())
    }
}

pub(crate) fn ensure_columns(columns: &Columns) -> SqlResult<()> {
    if columns.is_empty() {
        return Err(SqlError::invalid_statement("SELECT requires at least one column"));
    }
    Ok(())
}

/// List values are only valid as an `IN` operand.
fn ensure_bindable(column: &str, value: &Value) -> SqlResult<()> {
    if matches!(value, Value::List(_)) {
        return Err(SqlError::invalid_filter(format!(
            "list value for column {column} can only be used with IN"
        )));
    }
    Ok(())
}

pub(crate) fn nested_list() -> SqlError {
    SqlError::invalid_filter("nested lists cannot be rendered inside an IN list")
}

/// Quote `ident` between `open`/`close`, doubling embedded `close` characters.
pub(crate) fn quote_with(ident: &str, open: char, close: char) -> String {
    let mut out = String::with_capacity(ident.len() + 2);
    out.push(open);
    for ch in ident.chars() {
        if ch == close {
            out.push(close);
        }
        out.push(ch);
    }
    out.push(close);
    out
}

// ==================== Dialect ====================

static MSSQL: MssqlBuilder = MssqlBuilder;
static MSSQL2005: Mssql2005Builder = Mssql2005Builder;
static MYSQL: MysqlBuilder = MysqlBuilder;
static POSTGRES: PostgresBuilder = PostgresBuilder;

/// Supported SQL dialects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// SQL Server 2012+ (OFFSET/FETCH).
    Mssql,
    /// SQL Server 2005/2008 (TOP, ROW_NUMBER() paging).
    Mssql2005,
    /// MySQL / MariaDB (LIMIT offset,count).
    Mysql,
    /// PostgreSQL (LIMIT/OFFSET, `$n` placeholders).
    Postgres,
}

impl Dialect {
    /// Select the dialect for a configuration provider identifier.
    pub fn from_provider(provider: &str) -> SqlResult<Self> {
        match provider.trim().to_ascii_lowercase().as_str() {
            "mssql" => Ok(Dialect::Mssql),
            "mssql2005" => Ok(Dialect::Mssql2005),
            "mysql" => Ok(Dialect::Mysql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            _ => Err(SqlError::UnsupportedProvider(provider.to_string())),
        }
    }

    pub fn builder(self) -> &'static dyn SqlBuilder {
        match self {
            Dialect::Mssql => &MSSQL,
            Dialect::Mssql2005 => &MSSQL2005,
            Dialect::Mysql => &MYSQL,
            Dialect::Postgres => &POSTGRES,
        }
    }

    pub fn name(self) -> &'static str {
        self.builder().name()
    }

    fn compile(
        self,
        build: impl FnOnce(&dyn SqlBuilder, &mut BuildContext) -> SqlResult<()>,
    ) -> SqlResult<BuiltQuery> {
        let builder = self.builder();
        let mut ctx = BuildContext::new(builder.placeholder());
        build(builder, &mut ctx)?;
        Ok(ctx.finish())
    }

    pub fn compile_select(self, info: &SelectInfo) -> SqlResult<BuiltQuery> {
        self.compile(|b, ctx| b.build_select(ctx, info))
    }

    pub fn compile_insert(self, info: &InsertInfo) -> SqlResult<BuiltQuery> {
        self.compile(|b, ctx| b.build_insert(ctx, info))
    }

    pub fn compile_update(self, info: &UpdateInfo) -> SqlResult<BuiltQuery> {
        self.compile(|b, ctx| b.build_update(ctx, info))
    }

    pub fn compile_delete(self, info: &DeleteInfo) -> SqlResult<BuiltQuery> {
        self.compile(|b, ctx| b.build_delete(ctx, info))
    }
}

impl FromStr for Dialect {
    type Err = SqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dialect::from_provider(s)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
