//! Connection pool executor (deadpool-postgres).

use crate::config::DatabaseConfig;
use crate::database::Connector;
use crate::error::{SqlError, SqlResult};
use crate::executor::{ExecResult, Executor, Transaction, Transactional};
use crate::pg::{ensure_postgres, impl_pg_executor};
use crate::qb::context::BuiltQuery;
use crate::record::Record;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Pool size used when `max_open_conns` is unset or 0. deadpool needs a
/// bound, so "unlimited" is capped here.
pub const DEFAULT_MAX_SIZE: usize = 16;

/// Create a pool (no TLS) from a connection string.
pub fn create_pool(conn_string: &str, max_size: usize) -> SqlResult<Pool> {
    let pg_config: tokio_postgres::Config = conn_string
        .parse()
        .map_err(|e: tokio_postgres::Error| SqlError::Connection(e.to_string()))?;

    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(max_size)
        .build()
        .map_err(|e| SqlError::Pool(e.to_string()))
}

/// Each statement checks a client out of the pool for its duration.
impl Executor for Pool {
    async fn execute(&self, query: &BuiltQuery) -> SqlResult<ExecResult> {
        let client = self.get().await?;
        Executor::execute(&client, query).await
    }

    async fn query(&self, query: &BuiltQuery) -> SqlResult<Vec<Record>> {
        let client = self.get().await?;
        Executor::query(&client, query).await
    }
}

impl_pg_executor!(deadpool_postgres::Client, tokio_postgres::Client);
impl_pg_executor!(deadpool_postgres::Transaction<'_>, tokio_postgres::Transaction);

impl Transactional for deadpool_postgres::Client {
    type Tx<'a> = deadpool_postgres::Transaction<'a>;

    async fn begin(&mut self) -> SqlResult<Self::Tx<'_>> {
        Ok(self.transaction().await?)
    }
}

impl Transaction for deadpool_postgres::Transaction<'_> {
    async fn commit(self) -> SqlResult<()> {
        Ok(deadpool_postgres::Transaction::commit(self).await?)
    }

    async fn rollback(self) -> SqlResult<()> {
        Ok(deadpool_postgres::Transaction::rollback(self).await?)
    }
}

/// Builds one pool per configured database, sized by `max_open_conns`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PoolConnector;

impl Connector for PoolConnector {
    type Executor = Pool;

    async fn connect(&self, config: &DatabaseConfig) -> SqlResult<Pool> {
        ensure_postgres(config)?;
        let max_size = config.max_open_conns().unwrap_or(DEFAULT_MAX_SIZE);
        create_pool(config.conn_string()?, max_size)
    }
}
