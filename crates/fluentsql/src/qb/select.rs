//! SELECT: `from` → join* → filter? → group_by? → having? → order_by? → limit?

use super::Scope;
use super::context::BuiltQuery;
use super::filter::Filter;
use super::state::{BeforeGroup, BeforeLimit, BeforeOrder, Filtered, Grouped, Having, Joining, Limited, Ordered};
use super::table::{Columns, Groupers, JoinKind, Sorters, Table};
use crate::error::SqlResult;
use crate::executor::Executor;
use crate::record::{FromRecord, Record, Rows};
use std::marker::PhantomData;

/// One JOIN entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: Table,
    pub on: Filter,
}

/// SELECT statement descriptor.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectInfo {
    pub table: Table,
    pub columns: Columns,
    pub joins: Vec<Join>,
    pub filter: Option<Filter>,
    pub groups: Groupers,
    pub having: Option<Filter>,
    pub orders: Sorters,
    pub skip: u32,
    /// Zero means no row limit.
    pub take: u32,
}

impl SelectInfo {
    pub fn new(table: Table, columns: Columns) -> Self {
        Self {
            table,
            columns,
            joins: Vec::new(),
            filter: None,
            groups: Groupers::default(),
            having: None,
            orders: Sorters::default(),
            skip: 0,
            take: 0,
        }
    }
}

/// Column list chosen, table not yet.
pub struct SelectQuery<'e, E> {
    scope: Scope<'e, E>,
    columns: Columns,
}

impl<'e, E> SelectQuery<'e, E> {
    pub(crate) fn new(scope: Scope<'e, E>, columns: Columns) -> Self {
        Self { scope, columns }
    }

    pub fn from(self, table: Table) -> Select<'e, E, Joining> {
        Select {
            scope: self.scope,
            info: SelectInfo::new(table, self.columns),
            _state: PhantomData,
        }
    }
}

/// A SELECT at grammar position `S`.
pub struct Select<'e, E, S> {
    scope: Scope<'e, E>,
    info: SelectInfo,
    _state: PhantomData<S>,
}

impl<'e, E, S> Select<'e, E, S> {
    fn into_state<T>(self) -> Select<'e, E, T> {
        Select {
            scope: self.scope,
            info: self.info,
            _state: PhantomData,
        }
    }

    /// The descriptor built so far.
    pub fn info(&self) -> &SelectInfo {
        &self.info
    }

    /// Compile without executing.
    pub fn build(&self) -> SqlResult<BuiltQuery> {
        self.scope
            .compiled("select", self.scope.dialect.compile_select(&self.info))
    }
}

impl<'e, E> Select<'e, E, Joining> {
    pub fn join(mut self, kind: JoinKind, table: Table, on: impl Into<Filter>) -> Self {
        self.info.joins.push(Join {
            kind,
            table,
            on: on.into(),
        });
        self
    }

    pub fn inner_join(self, table: Table, on: impl Into<Filter>) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    pub fn left_join(self, table: Table, on: impl Into<Filter>) -> Self {
        self.join(JoinKind::Left, table, on)
    }

    pub fn right_join(self, table: Table, on: impl Into<Filter>) -> Self {
        self.join(JoinKind::Right, table, on)
    }

    pub fn full_join(self, table: Table, on: impl Into<Filter>) -> Self {
        self.join(JoinKind::Full, table, on)
    }

    /// WHERE clause.
    pub fn filter(mut self, filter: impl Into<Filter>) -> Select<'e, E, Filtered> {
        self.info.filter = Some(filter.into());
        self.into_state()
    }
}

impl<'e, E, S: BeforeGroup> Select<'e, E, S> {
    pub fn group_by(mut self, groups: Groupers) -> Select<'e, E, Grouped> {
        self.info.groups = groups;
        self.into_state()
    }
}

impl<'e, E> Select<'e, E, Grouped> {
    pub fn having(mut self, filter: impl Into<Filter>) -> Select<'e, E, Having> {
        self.info.having = Some(filter.into());
        self.into_state()
    }
}

impl<'e, E, S: BeforeOrder> Select<'e, E, S> {
    pub fn order_by(mut self, orders: Sorters) -> Select<'e, E, Ordered> {
        self.info.orders = orders;
        self.into_state()
    }
}

impl<'e, E, S: BeforeLimit> Select<'e, E, S> {
    /// Skip `skip` rows and return at most `take` (`0` = no limit).
    pub fn limit(mut self, skip: u32, take: u32) -> Select<'e, E, Limited> {
        self.info.skip = skip;
        self.info.take = take;
        self.into_state()
    }
}

impl<E: Executor, S> Select<'_, E, S> {
    /// First row, or [`SqlError::NotFound`](crate::SqlError::NotFound).
    pub async fn query_one(self) -> SqlResult<Record> {
        let query = self.build()?;
        self.scope.query_one(query).await
    }

    pub async fn query(self) -> SqlResult<Rows> {
        let query = self.build()?;
        self.scope.query(query).await
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
