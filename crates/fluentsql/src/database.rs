//! Database handles and the registry of opened databases.

use crate::builder::Dialect;
use crate::config::{ConfigSet, DatabaseConfig};
use crate::error::SqlResult;
use crate::executor::{Executor, Transaction, Transactional};
use crate::qb::context::BuiltQuery;
use crate::qb::delete::Delete;
use crate::qb::execute::Execute;
use crate::qb::insert::InsertQuery;
use crate::qb::select::SelectQuery;
use crate::qb::state::Unfiltered;
use crate::qb::table::Columns;
use crate::qb::update::UpdateQuery;
use crate::qb::Scope;
use crate::record::FieldMapCache;
use crate::value::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Executor placeholder for [`Database::offline`]. It does not implement
/// [`Executor`], so statements built from an offline database can only be
/// compiled.
#[derive(Clone, Copy, Debug, Default)]
pub struct Offline;

/// An executor bound to a dialect.
#[derive(Debug)]
pub struct Database<E> {
    exe: E,
    dialect: Dialect,
    fields: Arc<FieldMapCache>,
}

impl<E> Database<E> {
    pub fn new(exe: E, dialect: Dialect) -> Self {
        Self::with_fields(exe, dialect, Arc::new(FieldMapCache::new()))
    }

    /// Share an existing field-map cache.
    pub fn with_fields(exe: E, dialect: Dialect, fields: Arc<FieldMapCache>) -> Self {
        Self {
            exe,
            dialect,
            fields,
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn executor(&self) -> &E {
        &self.exe
    }

    pub fn fields(&self) -> &Arc<FieldMapCache> {
        &self.fields
    }

    pub fn into_executor(self) -> E {
        self.exe
    }

    fn scope(&self) -> Scope<'_, E> {
        Scope::new(&self.exe, self.dialect, &self.fields)
    }

    pub fn select(&self, columns: Columns) -> SelectQuery<'_, E> {
        SelectQuery::new(self.scope(), columns)
    }

    pub fn insert(&self, table: impl Into<String>) -> InsertQuery<'_, E> {
        InsertQuery::new(self.scope(), table.into())
    }

    pub fn update(&self, table: impl Into<String>) -> UpdateQuery<'_, E> {
        UpdateQuery::new(self.scope(), table.into())
    }

    pub fn delete(&self, table: impl Into<String>) -> Delete<'_, E, Unfiltered> {
        Delete::new(self.scope(), table.into())
    }

    /// Raw SQL using this dialect's placeholder style.
    pub fn execute(&self, sql: impl Into<String>, params: Vec<Value>) -> Execute<'_, E> {
        Execute::new(self.scope(), BuiltQuery::new(sql, params))
    }
}

impl Database<Offline> {
    /// A database that can only build statements.
    pub fn offline(dialect: Dialect) -> Self {
        Self::new(Offline, dialect)
    }
}

impl<E: Transactional> Database<E> {
    /// Open a transaction; statements built from the returned database run
    /// inside it.
    pub async fn begin(&mut self) -> SqlResult<Database<E::Tx<'_>>> {
        let dialect = self.dialect;
        let fields = Arc::clone(&self.fields);
        let tx = self.exe.begin().await?;
        Ok(Database::with_fields(tx, dialect, fields))
    }
}

impl<E: Transaction> Database<E> {
    pub async fn commit(self) -> SqlResult<()> {
        self.exe.commit().await
    }

    pub async fn rollback(self) -> SqlResult<()> {
        self.exe.rollback().await
    }
}

// ==================== Registry ====================

/// Opens an executor for a configured database.
pub trait Connector: Send + Sync {
    type Executor: Executor + 'static;

    fn connect(
        &self,
        config: &DatabaseConfig,
    ) -> impl Future<Output = SqlResult<Self::Executor>> + Send;
}

/// Opened databases by logical name.
///
/// Each name is connected at most once; later `open` calls return the same
/// handle. All databases share one [`FieldMapCache`].
pub struct Registry<C: Connector> {
    configs: ConfigSet,
    connector: C,
    fields: Arc<FieldMapCache>,
    open: Mutex<HashMap<String, Arc<Database<C::Executor>>>>,
}

impl<C: Connector> Registry<C> {
    pub fn new(configs: ConfigSet, connector: C) -> Self {
        Self {
            configs,
            connector,
            fields: Arc::new(FieldMapCache::new()),
            open: Mutex::new(HashMap::new()),
        }
    }

    pub fn configs(&self) -> &ConfigSet {
        &self.configs
    }

    pub async fn open(&self, name: &str) -> SqlResult<Arc<Database<C::Executor>>> {
        if let Some(db) = self.open.lock().await.get(name) {
            return Ok(Arc::clone(db));
        }

        let config = self.configs.get(name)?;
        let dialect = config.dialect()?;

        let mut open = self.open.lock().await;
        if let Some(db) = open.get(name) {
            return Ok(Arc::clone(db));
        }

        let exe = self.connector.connect(config).await?;
        tracing::info!(
            target: "fluentsql.sql",
            database = name,
            provider = %config.provider,
            driver = config.driver(),
            dialect = dialect.name(),
            "opened database"
        );
        let db = Arc::new(Database::with_fields(exe, dialect, Arc::clone(&self.fields)));
        open.insert(name.to_string(), Arc::clone(&db));
        Ok(db)
    }

    /// Whether `name` has been opened.
    pub async fn is_open(&self, name: &str) -> bool {
        self.open.lock().await.contains_key(name)
    }
}
