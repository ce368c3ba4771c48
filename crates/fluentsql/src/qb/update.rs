//! UPDATE: `set` → filter? → terminal.

use super::Scope;
use super::context::BuiltQuery;
use super::filter::Filter;
use super::state::{Assigned, Filtered};
use crate::error::SqlResult;
use crate::executor::{ExecResult, Executor};
use crate::value::Value;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Right-hand side of one SET entry.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateValue {
    /// `col=?`
    Assign(Value),
    /// `col=col+?`
    Increment(Value),
    /// `col=<sql>`, emitted verbatim.
    Raw(String),
}

/// Column → new value map of an UPDATE, emitted in lexicographic column order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateValues(BTreeMap<String, UpdateValue>);

impl UpdateValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), UpdateValue::Assign(value.into()));
        self
    }

    pub fn increment(mut self, column: impl Into<String>, by: impl Into<Value>) -> Self {
        self.0.insert(column.into(), UpdateValue::Increment(by.into()));
        self
    }

    pub fn raw(mut self, column: impl Into<String>, sql: impl Into<String>) -> Self {
        self.0.insert(column.into(), UpdateValue::Raw(sql.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UpdateValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// UPDATE statement descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateInfo {
    pub table: String,
    pub values: UpdateValues,
    pub filter: Option<Filter>,
}

/// Table chosen, SET list not yet.
pub struct UpdateQuery<'e, E> {
    scope: Scope<'e, E>,
    table: String,
}

impl<'e, E> UpdateQuery<'e, E> {
    pub(crate) fn new(scope: Scope<'e, E>, table: String) -> Self {
        Self { scope, table }
    }

    pub fn set(self, values: UpdateValues) -> Update<'e, E, Assigned> {
        Update {
            scope: self.scope,
            info: UpdateInfo {
                table: self.table,
                values,
                filter: None,
            },
            _state: PhantomData,
        }
    }
}

/// An UPDATE at grammar position `S`.
pub struct Update<'e, E, S> {
    scope: Scope<'e, E>,
    info: UpdateInfo,
    _state: PhantomData<S>,
}

impl<'e, E> Update<'e, E, Assigned> {
    pub fn filter(mut self, filter: impl Into<Filter>) -> Update<'e, E, Filtered> {
        self.info.filter = Some(filter.into());
        Update {
            scope: self.scope,
            info: self.info,
            _state: PhantomData,
        }
    }
}

impl<E, S> Update<'_, E, S> {
    pub fn info(&self) -> &UpdateInfo {
        &self.info
    }

    pub fn build(&self) -> SqlResult<BuiltQuery> {
        self.scope
            .compiled("update", self.scope.dialect.compile_update(&self.info))
    }
}

impl<E: Executor, S> Update<'_, E, S> {
    pub async fn execute(self) -> SqlResult<ExecResult> {
        let query = self.build()?;
        self.scope.execute(query).await
    }
}
