//! Convenient imports for typical `fluentsql` usage.
//!
//! ```ignore
//! use fluentsql::prelude::*;
//! ```

pub use crate::{
    Columns, Database, Dialect, Executor, Filter, Filters, FromRecord, Groupers, InsertValues,
    JoinKind, Op, Record, Rows, SortOrder, Sorters, SqlError, SqlResult, Table, UpdateValues,
    Value,
};

#[cfg(feature = "postgres")]
pub use crate::PgConnector;

#[cfg(feature = "pool")]
pub use crate::PoolConnector;
