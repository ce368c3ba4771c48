//! Result rows and record mapping.
//!
//! Executors hand back [`Record`]s: column names shared across a result set
//! plus one [`Value`] per column. Destination types implement [`FromRecord`]
//! (normally through `#[derive(FromRecord)]`), which declares the column each
//! field binds to. Column matching is case-insensitive and goes through a
//! per-type field map cached in a [`FieldMapCache`].

use crate::error::{SqlError, SqlResult};
use crate::value::{FromValue, Value, ValueError};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// A single result row.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Record {
    /// Create a record. `values` must line up with `columns`.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    /// Build a record from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self::new(columns.into(), values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value at position `idx`.
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Value of the first column named `name` (case-insensitive).
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
            .map(|i| &self.values[i])
    }

    /// Convert the column named `name` into `T`.
    pub fn try_get<T: FromValue>(&self, name: &str) -> SqlResult<T> {
        let value = self
            .get_by_name(name)
            .ok_or_else(|| SqlError::decode(name, ValueError::Missing))?;
        T::from_value(value).map_err(|e| SqlError::decode(name, e))
    }

    /// Map this record onto `T` using the cached field map for `T`.
    pub fn scan<T: FromRecord>(&self, fields: &FieldMapCache) -> SqlResult<T> {
        let map = fields.get::<T>();
        let mut out = T::default();
        for (column, value) in self.columns.iter().zip(&self.values) {
            let Some(field) = map.field(column) else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            out.assign(field, value)
                .map_err(|e| SqlError::decode(column.as_str(), e))?;
        }
        Ok(out)
    }
}

/// A type that can be populated from a [`Record`].
///
/// `bindings()[i]` is the column bound to field `i`; `assign(i, value)` stores
/// a converted value into that field. Fields whose column is absent from the
/// result, or NULL, keep their `Default` value.
pub trait FromRecord: Default + Send + 'static {
    fn bindings() -> &'static [&'static str];

    fn assign(&mut self, field: usize, value: &Value) -> Result<(), ValueError>;
}

/// Lowercased column name -> field index for one record type.
#[derive(Debug, Default)]
pub struct FieldMap {
    fields: HashMap<String, usize>,
}

impl FieldMap {
    pub fn of<T: FromRecord>() -> Self {
        let mut fields = HashMap::with_capacity(T::bindings().len());
        for (idx, column) in T::bindings().iter().enumerate() {
            // first binding wins on duplicates
            fields.entry(column.to_ascii_lowercase()).or_insert(idx);
        }
        Self { fields }
    }

    pub fn field(&self, column: &str) -> Option<usize> {
        if let Some(idx) = self.fields.get(column) {
            return Some(*idx);
        }
        self.fields.get(&column.to_ascii_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Field maps keyed by record type, built on first use and never evicted.
#[derive(Debug, Default)]
pub struct FieldMapCache {
    maps: Mutex<HashMap<TypeId, Arc<FieldMap>>>,
}

impl FieldMapCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<T: FromRecord>(&self) -> Arc<FieldMap> {
        let mut maps = self.maps.lock().unwrap_or_else(PoisonError::into_inner);
        maps.entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::new(FieldMap::of::<T>()))
            .clone()
    }

    /// Number of record types mapped so far.
    pub fn len(&self) -> usize {
        self.maps.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Multi-row cursor over a result set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rows {
    records: Vec<Record>,
}

impl Rows {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn first(&self) -> Option<&Record> {
        self.records.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Visit each row in order, stopping at the first error.
    pub fn for_each<F>(&self, mut f: F) -> SqlResult<()>
    where
        F: FnMut(&Record) -> SqlResult<()>,
    {
        for record in &self.records {
            f(record)?;
        }
        Ok(())
    }

    /// Map every row onto `T`.
    pub fn all<T: FromRecord>(&self, fields: &FieldMapCache) -> SqlResult<Vec<T>> {
        self.records.iter().map(|r| r.scan(fields)).collect()
    }

    pub fn into_vec(self) -> Vec<Record> {
        self.records
    }
}

impl From<Vec<Record>> for Rows {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl IntoIterator for Rows {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a Rows {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct User {
        id: i64,
        name: String,
        score: Option<f64>,
    }

    impl FromRecord for User {
        fn bindings() -> &'static [&'static str] {
            &["id", "user_name", "score"]
        }

        fn assign(&mut self, field: usize, value: &Value) -> Result<(), ValueError> {
            match field {
                0 => self.id = FromValue::from_value(value)?,
                1 => self.name = FromValue::from_value(value)?,
                2 => self.score = FromValue::from_value(value)?,
                _ => {}
            }
            Ok(())
        }
    }

    fn row() -> Record {
        Record::from_pairs([
            ("ID", Value::Int(7)),
            ("User_Name", Value::from("ann")),
            ("score", Value::Null),
            ("extra", Value::Bool(true)),
        ])
    }

    #[test]
    fn test_scan_matches_case_insensitively() {
        let cache = FieldMapCache::new();
        let user: User = row().scan(&cache).unwrap();
        assert_eq!(
            user,
            User {
                id: 7,
                name: "ann".into(),
                score: None
            }
        );
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_field_map_is_cached_per_type() {
        let cache = FieldMapCache::new();
        let a = cache.get::<User>();
        let b = cache.get::<User>();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.field("USER_NAME"), Some(1));
        assert_eq!(a.field("missing"), None);
    }

    #[test]
    fn test_scan_reports_column_on_mismatch() {
        let cache = FieldMapCache::new();
        let bad = Record::from_pairs([("id", Value::from("x"))]);
        let err = bad.scan::<User>(&cache).unwrap_err();
        match err {
            SqlError::Decode { column, .. } => assert_eq!(column, "id"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_try_get() {
        let r = row();
        assert_eq!(r.try_get::<i64>("id").unwrap(), 7);
        assert_eq!(r.try_get::<Option<f64>>("SCORE").unwrap(), None);
        assert!(r.try_get::<i64>("nope").is_err());
    }

    #[test]
    fn test_rows_for_each_stops_on_error() {
        let rows = Rows::new(vec![row(), row(), row()]);
        let mut seen = 0;
        let result = rows.for_each(|_| {
            seen += 1;
            if seen == 2 {
                Err(SqlError::Other("stop".into()))
            } else {
                Ok(())
            }
        });
        assert!(result.is_err());
        assert_eq!(seen, 2);
    }
}
