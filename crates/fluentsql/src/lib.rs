//! # fluentsql
//!
//! A type-state SQL statement builder with per-dialect compilers.
//!
//! ## Features
//!
//! - **Grammar in the types**: each builder position only exposes the clauses
//!   that may legally follow, so `filter(..).join(..)` does not compile
//! - **Dialects**: SQL Server 2012+, SQL Server 2005 (ROW_NUMBER() paging),
//!   MySQL and PostgreSQL
//! - **Parameterized output**: placeholders are written together with their
//!   parameters, so text and parameter list never disagree
//! - **Executor agnostic**: statements run on anything implementing
//!   [`Executor`], including open transactions
//! - **Record mapping**: `#[derive(FromRecord)]` with per-type cached field maps
//!
//! ```ignore
//! use fluentsql::prelude::*;
//!
//! let db = Database::new(client, Dialect::Postgres);
//! let u = Table::aliased("users", "u");
//!
//! let users: Vec<User> = db
//!     .select(u.columns(&["id", "name"]))
//!     .from(u.clone())
//!     .filter(Filters::new().add_on(&u, "status", Op::Eq, "active"))
//!     .order_by(u.sort(SortOrder::Asc, &["name"]))
//!     .limit(0, 20)
//!     .fetch_all()
//!     .await?;
//!
//! db.update("users")
//!     .set(UpdateValues::new().set("status", "inactive").increment("version", 1))
//!     .filter(Filters::new().eq("id", 7))
//!     .execute()
//!     .await?;
//!
//! // Compile without a connection
//! let q = Database::offline(Dialect::Mssql2005)
//!     .delete("sessions")
//!     .filter(Filters::new().lt("expires", now))
//!     .build()?;
//! ```

pub mod builder;
pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod qb;
pub mod record;
pub mod transaction;
pub mod value;

pub use builder::{Dialect, SqlBuilder};
pub use config::{ConfigSet, DatabaseConfig, Settings};
pub use database::{Connector, Database, Offline, Registry};
pub use error::{SqlError, SqlResult};
pub use executor::{ExecResult, Executor, Transaction, Transactional};
pub use qb::{
    BuiltQuery, Column, Columns, Filter, Filters, Groupers, InsertValues, JoinKind, Op,
    SortOrder, Sorters, Table, UpdateValue, UpdateValues,
};
pub use record::{FieldMap, FieldMapCache, FromRecord, Record, Rows};
pub use value::{FromValue, Value, ValueError};

#[cfg(feature = "postgres")]
pub mod pg;

#[cfg(feature = "postgres")]
pub use pg::PgConnector;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{PoolConnector, create_pool};

#[cfg(feature = "derive")]
pub use fluentsql_derive::FromRecord;
