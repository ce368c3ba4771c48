//! Transaction wrapper.
//!
//! Use the [`transaction!`](crate::transaction!) macro to run a block inside a
//! transaction:
//!
//! ```ignore
//! let order_id = fluentsql::transaction!(db, tx, {
//!     tx.insert("orders").values(InsertValues::new().set("total", 30)).execute().await?;
//!     tx.update("stock")
//!         .set(UpdateValues::new().increment("qty", -1))
//!         .filter(Filters::new().eq("sku", "A1"))
//!         .execute()
//!         .await?;
//!     Ok(42)
//! })?;
//! ```
//!
//! The block must evaluate to `SqlResult<T>`. `Ok` commits, `Err` rolls back,
//! and a panic inside the block is caught, rolled back and returned as
//! [`SqlError::Panicked`].

use crate::database::Database;
use crate::error::{SqlError, SqlResult};
use crate::executor::Transaction;
use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Runs the given block inside a database transaction.
///
/// - Begins a transaction via `$db.begin().await`.
/// - Commits on `Ok(_)`.
/// - Rolls back on `Err(_)` or on a panic.
#[macro_export]
macro_rules! transaction {
    ($db:expr, $tx:ident, $body:block) => {{
        #[allow(unused_mut)]
        let mut $tx = ($db).begin().await?;
        let __fluentsql_tx_result = $crate::transaction::guard(async { $body }).await;
        $crate::transaction::settle($tx, __fluentsql_tx_result).await
    }};
}

/// Await `body`, turning a panic into [`SqlError::Panicked`].
pub async fn guard<T, F>(body: F) -> SqlResult<T>
where
    F: Future<Output = SqlResult<T>>,
{
    match AssertUnwindSafe(body).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(
                target: "fluentsql.sql",
                panic = %message,
                "transaction body panicked, rolling back"
            );
            Err(SqlError::Panicked(message))
        }
    }
}

/// Commit on `Ok`, roll back on `Err`.
pub async fn settle<X, T>(tx: Database<X>, result: SqlResult<T>) -> SqlResult<T>
where
    X: Transaction,
{
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => match tx.rollback().await {
            Ok(()) => Err(error),
            Err(rollback_err) => {
                tracing::warn!(
                    target: "fluentsql.sql",
                    %error,
                    %rollback_err,
                    "rollback failed"
                );
                Err(SqlError::Other(format!(
                    "{error} (rollback failed: {rollback_err})"
                )))
            }
        },
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
