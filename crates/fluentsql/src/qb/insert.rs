//! INSERT: `values` → terminal.

use super::Scope;
use super::context::BuiltQuery;
use crate::error::SqlResult;
use crate::executor::{ExecResult, Executor};
use crate::value::Value;
use std::collections::BTreeMap;

/// Column → value map of an INSERT.
///
/// Columns are emitted in lexicographic order, so the same input always
/// compiles to the same SQL text.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InsertValues(BTreeMap<String, Value>);

impl InsertValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column` to `value`; a repeated column keeps the last value.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for InsertValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// INSERT statement descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct InsertInfo {
    pub table: String,
    pub values: InsertValues,
}

/// Table chosen, values not yet.
pub struct InsertQuery<'e, E> {
    scope: Scope<'e, E>,
    table: String,
}

impl<'e, E> InsertQuery<'e, E> {
    pub(crate) fn new(scope: Scope<'e, E>, table: String) -> Self {
        Self { scope, table }
    }

    pub fn values(self, values: InsertValues) -> Insert<'e, E> {
        Insert {
            scope: self.scope,
            info: InsertInfo {
                table: self.table,
                values,
            },
        }
    }
}

/// A complete INSERT.
pub struct Insert<'e, E> {
    scope: Scope<'e, E>,
    info: InsertInfo,
}

impl<E> Insert<'_, E> {
    pub fn info(&self) -> &InsertInfo {
        &self.info
    }

    pub fn build(&self) -> SqlResult<BuiltQuery> {
        self.scope
            .compiled("insert", self.scope.dialect.compile_insert(&self.info))
    }
}

impl<E: Executor> Insert<'_, E> {
    pub async fn execute(self) -> SqlResult<ExecResult> {
        let query = self.build()?;
        self.scope.execute(query).await
    }
}
