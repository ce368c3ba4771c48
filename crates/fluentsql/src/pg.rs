//! tokio-postgres executor.
//!
//! `tokio_postgres::Client` runs statements directly and opens
//! `tokio_postgres::Transaction`s. Parameters are bound through the
//! [`ToSql`] impl of [`Value`]; result columns are decoded into the fixed
//! value kinds.

use crate::builder::Dialect;
use crate::config::DatabaseConfig;
use crate::database::Connector;
use crate::error::{SqlError, SqlResult};
use crate::executor::{ExecResult, Executor, Transaction, Transactional};
use crate::qb::context::BuiltQuery;
use crate::record::Record;
use crate::value::{Value, ValueError};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use std::error::Error;
use std::sync::Arc;
use tokio_postgres::NoTls;
use tokio_postgres::Row;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

impl ToSql for Value {
    /// Each kind is written through the checked path of its Rust type, so a
    /// value bound to a column of another type is a driver error.
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Bytes(v) => v.to_sql_checked(ty, out),
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => match *ty {
                Type::TIMESTAMPTZ => Utc.from_utc_datetime(v).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::List(_) => Err("list values can only be used with IN".into()),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

pub(crate) fn params(query: &BuiltQuery) -> Vec<&(dyn ToSql + Sync)> {
    query
        .params
        .iter()
        .map(|p| p as &(dyn ToSql + Sync))
        .collect()
}

/// Convert driver rows into records sharing one column-name list.
pub(crate) fn records(rows: Vec<Row>) -> SqlResult<Vec<Record>> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };
    let columns: Arc<[String]> = first
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();

    rows.iter()
        .map(|row| {
            let values = (0..row.len())
                .map(|idx| cell(row, idx))
                .collect::<SqlResult<Vec<_>>>()?;
            Ok(Record::new(Arc::clone(&columns), values))
        })
        .collect()
}

fn cell(row: &Row, idx: usize) -> SqlResult<Value> {
    let column = &row.columns()[idx];
    let decoded = match *column.type_() {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx).map(Value::from),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx).map(Value::from),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx).map(Value::from),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx).map(Value::from),
        Type::OID => row.try_get::<_, Option<u32>>(idx).map(Value::from),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx).map(Value::from),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx).map(Value::from),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx).map(Value::from),
        Type::TIMESTAMP => row.try_get::<_, Option<NaiveDateTime>>(idx).map(Value::from),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .map(|v| Value::from(v.map(|t| t.naive_utc()))),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)
            .map(|v| Value::from(v.map(|d| d.and_time(NaiveTime::MIN)))),
        // text-like columns and anything else the driver can read as a string
        ref ty if <String as tokio_postgres::types::FromSql>::accepts(ty) => {
            row.try_get::<_, Option<String>>(idx).map(Value::from)
        }
        ref ty => {
            return Err(SqlError::decode(
                column.name(),
                ValueError::UnsupportedType(ty.name().to_string()),
            ));
        }
    };
    decoded.map_err(SqlError::from)
}

/// Implements [`Executor`] for a tokio-postgres client type; `$inner` is the
/// tokio-postgres type whose inherent methods run the statement.
macro_rules! impl_pg_executor {
    ($ty:ty, $inner:path) => {
        impl $crate::executor::Executor for $ty {
            async fn execute(
                &self,
                query: &$crate::qb::context::BuiltQuery,
            ) -> $crate::error::SqlResult<$crate::executor::ExecResult> {
                let params = $crate::pg::params(query);
                let n = <$inner>::execute(self, query.sql.as_str(), &params).await?;
                Ok($crate::executor::ExecResult::new(n))
            }

            async fn query(
                &self,
                query: &$crate::qb::context::BuiltQuery,
            ) -> $crate::error::SqlResult<Vec<$crate::record::Record>> {
                let params = $crate::pg::params(query);
                let rows = <$inner>::query(self, query.sql.as_str(), &params).await?;
                $crate::pg::records(rows)
            }
        }
    };
}

pub(crate) use impl_pg_executor;

impl_pg_executor!(tokio_postgres::Client, tokio_postgres::Client);
impl_pg_executor!(tokio_postgres::Transaction<'_>, tokio_postgres::Transaction);

impl Transactional for tokio_postgres::Client {
    type Tx<'a> = tokio_postgres::Transaction<'a>;

    async fn begin(&mut self) -> SqlResult<Self::Tx<'_>> {
        Ok(tokio_postgres::Client::transaction(self).await?)
    }
}

impl Transaction for tokio_postgres::Transaction<'_> {
    async fn commit(self) -> SqlResult<()> {
        Ok(tokio_postgres::Transaction::commit(self).await?)
    }

    async fn rollback(self) -> SqlResult<()> {
        Ok(tokio_postgres::Transaction::rollback(self).await?)
    }
}

/// Opens a single `tokio_postgres::Client` (no TLS) per configured database.
#[derive(Clone, Copy, Debug, Default)]
pub struct PgConnector;

impl Connector for PgConnector {
    type Executor = tokio_postgres::Client;

    async fn connect(&self, config: &DatabaseConfig) -> SqlResult<Self::Executor> {
        ensure_postgres(config)?;
        let (client, connection) = tokio_postgres::connect(config.conn_string()?, NoTls)
            .await
            .map_err(|e| SqlError::Connection(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(error) = connection.await {
                tracing::error!(target: "fluentsql.sql", %error, "postgres connection closed");
            }
        });
        Ok(client)
    }
}

pub(crate) fn ensure_postgres(config: &DatabaseConfig) -> SqlResult<()> {
    match config.dialect()? {
        Dialect::Postgres => Ok(()),
        other => Err(SqlError::config(format!(
            "provider '{}' ({other}) cannot be opened with the tokio-postgres driver",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_is_not_bindable() {
        let mut buf = BytesMut::new();
        assert!(Value::list([1, 2]).to_sql(&Type::INT8, &mut buf).is_err());
    }

    #[test]
    fn test_int_narrows_to_column_type() {
        let mut buf = BytesMut::new();
        assert!(Value::Int(7).to_sql(&Type::INT4, &mut buf).is_ok());
        assert_eq!(buf.len(), 4);
        assert!(Value::Int(i64::MAX).to_sql(&Type::INT2, &mut BytesMut::new()).is_err());
    }

    #[test]
    fn test_mismatched_column_type_is_rejected() {
        assert!(Value::Float(1.5).to_sql(&Type::INT8, &mut BytesMut::new()).is_err());
        assert!(Value::Int(5).to_sql(&Type::TIMESTAMP, &mut BytesMut::new()).is_err());
        assert!(Value::from("abc").to_sql(&Type::INT8, &mut BytesMut::new()).is_err());
        assert!(Value::Bool(true).to_sql(&Type::TEXT, &mut BytesMut::new()).is_err());

        assert!(Value::Int(5).to_sql(&Type::INT8, &mut BytesMut::new()).is_ok());
        assert!(Value::Float(1.5).to_sql(&Type::FLOAT4, &mut BytesMut::new()).is_ok());
        assert!(Value::from("abc").to_sql(&Type::VARCHAR, &mut BytesMut::new()).is_ok());
    }

    #[test]
    fn test_null_binds_as_null() {
        let r = Value::Null.to_sql(&Type::TEXT, &mut BytesMut::new()).unwrap();
        assert!(matches!(r, IsNull::Yes));
    }

    #[test]
    fn test_connector_rejects_other_providers() {
        let config = DatabaseConfig::new("mysql").with_setting("conn_string", "x");
        assert!(matches!(ensure_postgres(&config), Err(SqlError::Config(_))));
        assert!(ensure_postgres(&DatabaseConfig::new("postgresql")).is_ok());
    }
}
