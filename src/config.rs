use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;

/// Which adapter backs the user and thought stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(Self::Postgres),
            "memory" | "mem" => Ok(Self::Memory),
            other => anyhow::bail!("unknown store backend {other:?}"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: StoreBackend,
    /// Present only for the postgres backend.
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match get("APP_PORT") {
            Some(v) => v.parse::<u16>().context("APP_PORT must be a port number")?,
            None => 8080,
        };
        let backend = match get("STORE_BACKEND") {
            Some(v) => v.parse::<StoreBackend>().context("STORE_BACKEND")?,
            None => StoreBackend::Postgres,
        };

        let database = match backend {
            StoreBackend::Postgres => {
                let url = get("DATABASE_URL")
                    .context("DATABASE_URL is required when STORE_BACKEND=postgres")?;
                let max_connections = match get("DB_MAX_CONNECTIONS") {
                    Some(v) => v
                        .parse::<u32>()
                        .context("DB_MAX_CONNECTIONS must be a positive integer")?,
                    None => 10,
                };
                Some(DatabaseConfig { url, max_connections })
            }
            StoreBackend::Memory => None,
        };

        Ok(Self { host, port, backend, database })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_for_memory_backend() {
        let cfg = AppConfig::from_lookup(lookup(&[("STORE_BACKEND", "memory")])).unwrap();
        assert_eq!(cfg.backend, StoreBackend::Memory);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:8080");
        assert!(cfg.database.is_none());
    }

    #[test]
    fn postgres_requires_database_url() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn reads_postgres_settings() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/thoughts"),
            ("DB_MAX_CONNECTIONS", "3"),
            ("APP_PORT", "9000"),
        ]))
        .unwrap();
        let db = cfg.database.expect("database config");
        assert_eq!(db.url, "postgres://localhost/thoughts");
        assert_eq!(db.max_connections, 3);
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn rejects_unknown_backend_and_bad_port() {
        assert!(AppConfig::from_lookup(lookup(&[("STORE_BACKEND", "mongo")])).is_err());
        assert!(AppConfig::from_lookup(lookup(&[
            ("STORE_BACKEND", "memory"),
            ("APP_PORT", "eighty")
        ]))
        .is_err());
    }
}
