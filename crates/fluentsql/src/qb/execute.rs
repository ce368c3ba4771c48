//! Hand-written SQL passed straight to the executor.

use super::Scope;
use super::context::BuiltQuery;
use crate::error::SqlResult;
use crate::executor::{ExecResult, Executor};
use crate::record::{FromRecord, Record, Rows};

/// A raw statement with positional parameters in the dialect's placeholder
/// style. The text is not inspected.
pub struct Execute<'e, E> {
    scope: Scope<'e, E>,
    query: BuiltQuery,
}

impl<'e, E> Execute<'e, E> {
    pub(crate) fn new(scope: Scope<'e, E>, query: BuiltQuery) -> Self {
        Self { scope, query }
    }

    pub fn build(&self) -> SqlResult<BuiltQuery> {
        self.scope.compiled("raw", Ok(self.query.clone()))
    }
}

impl<E: Executor> Execute<'_, E> {
    pub async fn execute(self) -> SqlResult<ExecResult> {
        let query = self.build()?;
        self.scope.execute(query).await
    }

    pub async fn query(self) -> SqlResult<Rows> {
        let query = self.build()?;
        self.scope.query(query).await
    }

    pub async fn query_one(self) -> SqlResult<Record> {
        let query = self.build()?;
        self.scope.query_one(query).await
    }

    pub async fn fetch_one<T: FromRecord>(self) -> SqlResult<T> {
        let query = self.build()?;
        self.scope.fetch_one(query).await
    }

    pub async fn fetch_all<T: FromRecord>(self) -> SqlResult<Vec<T>> {
        let query = self.build()?;
        self.scope.fetch_all(query).await
    }
}
