//! In-memory executor that records every statement it is given.

#![allow(dead_code)]

use fluentsql::{
    BuiltQuery, ExecResult, Executor, Record, SqlError, SqlResult, Transaction, Transactional,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Shared event log: statements plus BEGIN/COMMIT/ROLLBACK markers.
#[derive(Clone, Debug, Default)]
pub struct Log(Arc<Mutex<Vec<String>>>);

impl Log {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Debug, Default)]
pub struct Recorder {
    pub log: Log,
    pub queries: Mutex<Vec<BuiltQuery>>,
    results: Mutex<VecDeque<Vec<Record>>>,
    pub rows_affected: u64,
    pub fail_with: Option<String>,
    pub fail_commit: bool,
    pub fail_rollback: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result set for the next `query` call.
    pub fn returning(self, rows: Vec<Record>) -> Self {
        self.results.lock().unwrap().push_back(rows);
        self
    }

    pub fn affecting(mut self, n: u64) -> Self {
        self.rows_affected = n;
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub fn last(&self) -> BuiltQuery {
        self.queries.lock().unwrap().last().cloned().unwrap()
    }

    pub fn count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    fn record(&self, query: &BuiltQuery) -> SqlResult<()> {
        self.queries.lock().unwrap().push(query.clone());
        self.log.push(query.sql.clone());
        match &self.fail_with {
            Some(message) => Err(SqlError::execution(std::io::Error::other(message.clone()))),
            None => Ok(()),
        }
    }
}

impl Executor for Recorder {
    async fn execute(&self, query: &BuiltQuery) -> SqlResult<ExecResult> {
        self.record(query)?;
        Ok(ExecResult::new(self.rows_affected).with_last_insert_id(42))
    }

    async fn query(&self, query: &BuiltQuery) -> SqlResult<Vec<Record>> {
        self.record(query)?;
        Ok(self.results.lock().unwrap().pop_front().unwrap_or_default())
    }
}

pub struct RecorderTx<'a> {
    parent: &'a Recorder,
}

impl Executor for RecorderTx<'_> {
    async fn execute(&self, query: &BuiltQuery) -> SqlResult<ExecResult> {
        self.parent.execute(query).await
    }

    async fn query(&self, query: &BuiltQuery) -> SqlResult<Vec<Record>> {
        self.parent.query(query).await
    }
}

impl Transactional for Recorder {
    type Tx<'a> = RecorderTx<'a>;

    async fn begin(&mut self) -> SqlResult<Self::Tx<'_>> {
        self.log.push("BEGIN");
        Ok(RecorderTx { parent: self })
    }
}

impl Transaction for RecorderTx<'_> {
    async fn commit(self) -> SqlResult<()> {
        if self.parent.fail_commit {
            return Err(SqlError::Other("commit refused".into()));
        }
        self.parent.log.push("COMMIT");
        Ok(())
    }

    async fn rollback(self) -> SqlResult<()> {
        if self.parent.fail_rollback {
            return Err(SqlError::Other("connection lost".into()));
        }
        self.parent.log.push("ROLLBACK");
        Ok(())
    }
}
