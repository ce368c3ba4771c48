//! Database configuration.
//!
//! ```toml
//! [databases.main]
//! provider = "mssql"
//!
//! [databases.main.settings]
//! conn_string = "server=db;user id=app"
//! max_open_conns = 20
//!
//! [databases.reports]
//! provider = "postgres"
//! driver = "tokio-postgres"
//! settings = { conn_string = "host=localhost user=app dbname=reports" }
//! ```

use crate::builder::Dialect;
use crate::error::{SqlError, SqlResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Settings key holding the driver connection string.
pub const CONN_STRING: &str = "conn_string";
pub const MAX_OPEN_CONNS: &str = "max_open_conns";
pub const MAX_IDLE_CONNS: &str = "max_idle_conns";

/// All configured databases, by logical name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSet {
    #[serde(default)]
    databases: BTreeMap<String, DatabaseConfig>,
}

impl ConfigSet {
    pub fn from_toml_str(raw: &str) -> SqlResult<Self> {
        toml::from_str(raw).map_err(|e| SqlError::config(format!("failed to parse config: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> SqlResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SqlError::config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            SqlError::Config(msg) => SqlError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Look up a database by logical name.
    pub fn get(&self, name: &str) -> SqlResult<&DatabaseConfig> {
        self.databases
            .get(name)
            .ok_or_else(|| SqlError::config(format!("database '{name}' is not configured")))
    }

    pub fn insert(&mut self, name: impl Into<String>, config: DatabaseConfig) {
        self.databases.insert(name.into(), config);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.databases.keys().map(String::as_str)
    }
}

/// One `[databases.<name>]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub provider: String,
    #[serde(default)]
    driver: Option<String>,
    #[serde(default)]
    pub settings: Settings,
}

impl DatabaseConfig {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            driver: None,
            settings: Settings::default(),
        }
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = Some(driver.into());
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.0.insert(key.into(), value.into());
        self
    }

    /// Driver identifier; defaults to the provider.
    pub fn driver(&self) -> &str {
        self.driver.as_deref().unwrap_or(&self.provider)
    }

    pub fn dialect(&self) -> SqlResult<Dialect> {
        Dialect::from_provider(&self.provider)
    }

    /// The required connection string.
    pub fn conn_string(&self) -> SqlResult<&str> {
        self.settings
            .get(CONN_STRING)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SqlError::config(format!("setting '{CONN_STRING}' is missing")))
    }

    /// Pool size limit; `None` means unlimited.
    pub fn max_open_conns(&self) -> Option<usize> {
        positive(self.settings.int(MAX_OPEN_CONNS, 0))
    }

    pub fn max_idle_conns(&self) -> Option<usize> {
        positive(self.settings.int(MAX_IDLE_CONNS, 0))
    }
}

fn positive(n: i64) -> Option<usize> {
    usize::try_from(n).ok().filter(|n| *n > 0)
}

/// Free-form string settings. Non-string TOML scalars are kept as their text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, SettingValue>")]
pub struct Settings(BTreeMap<String, String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum SettingValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<BTreeMap<String, SettingValue>> for Settings {
    fn from(raw: BTreeMap<String, SettingValue>) -> Self {
        Settings(
            raw.into_iter()
                .map(|(k, v)| {
                    let v = match v {
                        SettingValue::Text(s) => s,
                        SettingValue::Int(n) => n.to_string(),
                        SettingValue::Float(n) => n.to_string(),
                        SettingValue::Bool(b) => b.to_string(),
                    };
                    (k, v)
                })
                .collect(),
        )
    }
}

impl Settings {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Integer setting; absent or unparseable values give `default`.
    pub fn int(&self, key: &str, default: i64) -> i64 {
        self.get(key)
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = r#"
[databases.main]
provider = "mssql2005"

[databases.main.settings]
conn_string = "server=db"
max_open_conns = 8
max_idle_conns = "x"

[databases.reports]
provider = "postgres"
driver = "tokio-postgres"
settings = { conn_string = "host=localhost" }

[databases.legacy]
provider = "oracle"
"#;

    #[test]
    fn test_parse_and_lookup() {
        let set = ConfigSet::from_toml_str(RAW).unwrap();
        let main = set.get("main").unwrap();
        assert_eq!(main.driver(), "mssql2005");
        assert_eq!(main.dialect().unwrap(), Dialect::Mssql2005);
        assert_eq!(main.conn_string().unwrap(), "server=db");
        assert_eq!(main.max_open_conns(), Some(8));
        assert_eq!(main.max_idle_conns(), None);

        let reports = set.get("reports").unwrap();
        assert_eq!(reports.driver(), "tokio-postgres");
        assert_eq!(reports.dialect().unwrap(), Dialect::Postgres);
    }

    #[test]
    fn test_unknown_provider_and_name() {
        let set = ConfigSet::from_toml_str(RAW).unwrap();
        assert!(matches!(
            set.get("legacy").unwrap().dialect(),
            Err(SqlError::UnsupportedProvider(p)) if p == "oracle"
        ));
        assert!(matches!(set.get("nope"), Err(SqlError::Config(_))));
        assert!(set.get("legacy").unwrap().conn_string().is_err());
    }

    #[test]
    fn test_settings_defaults() {
        let s = DatabaseConfig::new("mysql").with_setting("timeout", "30").settings;
        assert_eq!(s.int("timeout", 5), 30);
        assert_eq!(s.int("missing", 5), 5);
        assert_eq!(s.string("missing", "d"), "d");
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            ConfigSet::from_toml_str("[databases.main"),
            Err(SqlError::Config(_))
        ));
    }
}
