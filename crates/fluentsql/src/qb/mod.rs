//! Statement builders.
//!
//! Each statement kind is a chain of types that only exposes the clauses that
//! may legally come next:
//!
//! ```ignore
//! let u = Table::aliased("users", "u");
//! let rows = db
//!     .select(u.columns(&["id", "name"]))
//!     .from(u.clone())
//!     .filter(Filters::new().add_on(&u, "id", Op::Gt, 5))
//!     .order_by(u.sort(SortOrder::Asc, &["name"]))
//!     .limit(10, 5)
//!     .query()
//!     .await?;
//! ```
//!
//! Every position after the statement head can `build()` its SQL without
//! running it. Out-of-order clauses do not compile:
//!
//! ```compile_fail
//! use fluentsql::{Database, Dialect, Filters, Table};
//!
//! let db = Database::offline(Dialect::Mssql);
//! let t = Table::new("t");
//! let _ = db
//!     .select(t.columns(&["a"]))
//!     .from(t)
//!     .filter(Filters::new().eq("a", 1))
//!     .inner_join(Table::new("x"), Filters::new());
//! ```
//!
//! and neither does executing a statement built from an offline database:
//!
//! ```compile_fail
//! use fluentsql::{Database, Dialect, Table};
//!
//! async fn run() {
//!     let db = Database::offline(Dialect::Mysql);
//!     let t = Table::new("t");
//!     let _ = db.select(t.columns(&["a"])).from(t).query().await;
//! }
//! ```

pub mod context;
pub mod delete;
pub mod execute;
pub mod filter;
pub mod insert;
pub mod select;
pub mod state;
pub mod table;
pub mod update;

pub use context::{BuildContext, BuiltQuery, Placeholder};
pub use delete::{Delete, DeleteInfo};
pub use execute::Execute;
pub use filter::{Filter, Filters, Leaf, Node, Op};
pub use insert::{Insert, InsertInfo, InsertQuery, InsertValues};
pub use select::{Join, Select, SelectInfo, SelectQuery};
pub use table::{Column, Columns, Grouper, Groupers, JoinKind, SortOrder, Sorter, Sorters, Table};
pub use update::{Update, UpdateInfo, UpdateQuery, UpdateValue, UpdateValues};

use crate::builder::Dialect;
use crate::error::SqlResult;
use crate::executor::{ExecResult, Executor};
use crate::record::{FieldMapCache, FromRecord, Record, Rows};

/// What a statement chain needs to compile and run: the executor, the
/// dialect and the record field-map cache.
#[derive(Debug)]
pub struct Scope<'e, E> {
    pub(crate) exe: &'e E,
    pub(crate) dialect: Dialect,
    pub(crate) fields: &'e FieldMapCache,
}

impl<E> Clone for Scope<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Scope<'_, E> {}

impl<'e, E> Scope<'e, E> {
    pub(crate) fn new(exe: &'e E, dialect: Dialect, fields: &'e FieldMapCache) -> Self {
        Self {
            exe,
            dialect,
            fields,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Log the outcome of compiling a `statement`.
    pub(crate) fn compiled(
        &self,
        statement: &'static str,
        result: SqlResult<BuiltQuery>,
    ) -> SqlResult<BuiltQuery> {
        match &result {
            Ok(query) => tracing::debug!(
                target: "fluentsql.sql",
                dialect = self.dialect.name(),
                statement,
                sql = %query.sql,
                params = query.params.len(),
                "compiled statement"
            ),
            Err(error) => tracing::debug!(
                target: "fluentsql.sql",
                dialect = self.dialect.name(),
                statement,
                %error,
                "statement failed to compile"
            ),
        }
        result
    }
}

impl<E: Executor> Scope<'_, E> {
    pub(crate) async fn execute(&self, query: BuiltQuery) -> SqlResult<ExecResult> {
        self.exe.execute(&query).await
    }

    pub(crate) async fn query(&self, query: BuiltQuery) -> SqlResult<Rows> {
        self.exe.query(&query).await.map(Rows::new)
    }

    pub(crate) async fn query_one(&self, query: BuiltQuery) -> SqlResult<Record> {
        self.exe.query_one(&query).await
    }

    pub(crate) async fn fetch_one<T: FromRecord>(&self, query: BuiltQuery) -> SqlResult<T> {
        self.query_one(query).await?.scan(self.fields)
    }

    pub(crate) async fn fetch_all<T: FromRecord>(&self, query: BuiltQuery) -> SqlResult<Vec<T>> {
        self.query(query).await?.all(self.fields)
    }
}
