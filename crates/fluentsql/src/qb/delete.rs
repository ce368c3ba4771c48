//! DELETE: filter? → terminal.
//!
//! A DELETE without `filter` removes every row of the table.

use super::Scope;
use super::context::BuiltQuery;
use super::filter::Filter;
use super::state::{Filtered, Unfiltered};
use crate::error::SqlResult;
use crate::executor::{ExecResult, Executor};
use std::marker::PhantomData;

/// DELETE statement descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteInfo {
    pub table: String,
    pub filter: Option<Filter>,
}

/// A DELETE at grammar position `S`.
pub struct Delete<'e, E, S> {
    scope: Scope<'e, E>,
    info: DeleteInfo,
    _state: PhantomData<S>,
}

impl<'e, E> Delete<'e, E, Unfiltered> {
    pub(crate) fn new(scope: Scope<'e, E>, table: String) -> Self {
        Self {
            scope,
            info: DeleteInfo {
                table,
                filter: None,
            },
            _state: PhantomData,
        }
    }

    pub fn filter(mut self, filter: impl Into<Filter>) -> Delete<'e, E, Filtered> {
        self.info.filter = Some(filter.into());
        Delete {
            scope: self.scope,
            info: self.info,
            _state: PhantomData,
        }
    }
}

impl<E, S> Delete<'_, E, S> {
    pub fn info(&self) -> &DeleteInfo {
        &self.info
    }

    pub fn build(&self) -> SqlResult<BuiltQuery> {
        self.scope
            .compiled("delete", self.scope.dialect.compile_delete(&self.info))
    }
}

impl<E: Executor, S> Delete<'_, E, S> {
    pub async fn execute(self) -> SqlResult<ExecResult> {
        let query = self.build()?;
        self.scope.execute(query).await
    }
}
