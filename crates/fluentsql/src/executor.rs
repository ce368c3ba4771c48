//! Executor boundary.
//!
//! The statement builders never talk to a driver directly. They compile into a
//! [`BuiltQuery`] and hand it to an [`Executor`], which may be a plain
//! connection, a pool, or an open transaction; the builders cannot tell the
//! difference.

use crate::error::{SqlError, SqlResult};
use crate::qb::context::BuiltQuery;
use crate::record::Record;
use std::future::Future;

/// Outcome of a statement executed for its side effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExecResult {
    pub rows_affected: u64,
    /// Generated key of the last inserted row, when the driver reports one.
    pub last_insert_id: Option<i64>,
}

impl ExecResult {
    pub fn new(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            last_insert_id: None,
        }
    }

    pub fn with_last_insert_id(mut self, id: i64) -> Self {
        self.last_insert_id = Some(id);
        self
    }
}

/// Runs compiled statements.
pub trait Executor: Send + Sync {
    /// Execute a statement and report affected rows.
    fn execute(&self, query: &BuiltQuery) -> impl Future<Output = SqlResult<ExecResult>> + Send;

    /// Execute a query and return all rows.
    fn query(&self, query: &BuiltQuery) -> impl Future<Output = SqlResult<Vec<Record>>> + Send;

    /// Execute a query and return the **first** row.
    ///
    /// Returns [`SqlError::NotFound`] if no rows are returned; extra rows are
    /// ignored.
    fn query_one(&self, query: &BuiltQuery) -> impl Future<Output = SqlResult<Record>> + Send {
        async move {
            self.query(query)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| SqlError::not_found("query returned no rows"))
        }
    }
}

impl<E: Executor> Executor for &E {
    fn execute(&self, query: &BuiltQuery) -> impl Future<Output = SqlResult<ExecResult>> + Send {
        (**self).execute(query)
    }

    fn query(&self, query: &BuiltQuery) -> impl Future<Output = SqlResult<Vec<Record>>> + Send {
        (**self).query(query)
    }

    fn query_one(&self, query: &BuiltQuery) -> impl Future<Output = SqlResult<Record>> + Send {
        (**self).query_one(query)
    }
}

/// An executor that can open a transaction.
pub trait Transactional: Executor {
    type Tx<'a>: Transaction
    where
        Self: 'a;

    fn begin(&mut self) -> impl Future<Output = SqlResult<Self::Tx<'_>>> + Send;
}

/// An open transaction. Dropping it without `commit` rolls back.
pub trait Transaction: Executor {
    fn commit(self) -> impl Future<Output = SqlResult<()>> + Send;

    fn rollback(self) -> impl Future<Output = SqlResult<()>> + Send;
}
