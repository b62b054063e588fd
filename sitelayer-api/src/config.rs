//! Configuration management for the sitelayer API

use std::{env, fmt, str::FromStr};

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub backend: StoreKind,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub name: String,
}

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    MongoDb,
    Memory,
}

impl FromStr for StoreKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreKind::MongoDb),
            "memory" => Ok(StoreKind::Memory),
            other => Err(AppError::Config(format!(
                "unknown STORE_BACKEND '{}', expected 'mongodb' or 'memory'",
                other
            ))),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::MongoDb => f.write_str("mongodb"),
            StoreKind::Memory => f.write_str("memory"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "mongodb://localhost:27017".to_string(),
                name: "appdb".to_string(),
            },
            backend: StoreKind::MongoDb,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source, falling back to defaults.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: var("SERVER_PORT")
                    .and_then(|port| port.parse().ok())
                    .unwrap_or(defaults.server.port),
            },
            database: DatabaseConfig {
                url: var("DATABASE_URL").unwrap_or(defaults.database.url),
                name: var("DATABASE_NAME").unwrap_or(defaults.database.name),
            },
            backend: match var("STORE_BACKEND") {
                Some(kind) => kind.parse()?,
                None => defaults.backend,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_mongodb() {
        let config = Config::from_vars(vars(&[])).unwrap();

        assert_eq!(config.database.url, "mongodb://localhost:27017");
        assert_eq!(config.database.name, "appdb");
        assert_eq!(config.backend, StoreKind::MongoDb);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_vars(vars(&[
            ("DATABASE_URL", "mongodb://db:27017"),
            ("DATABASE_NAME", "chantiers"),
            ("STORE_BACKEND", "Memory"),
            ("SERVER_HOST", "127.0.0.1"),
            ("SERVER_PORT", "9090"),
        ]))
        .unwrap();

        assert_eq!(config.database.url, "mongodb://db:27017");
        assert_eq!(config.database.name, "chantiers");
        assert_eq!(config.backend, StoreKind::Memory);
        assert_eq!(config.bind_address(), "127.0.0.1:9090");
    }

    #[test]
    fn unparseable_port_falls_back_to_default() {
        let config = Config::from_vars(vars(&[("SERVER_PORT", "eighty")])).unwrap();

        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = Config::from_vars(vars(&[("STORE_BACKEND", "postgres")])).unwrap_err();

        assert!(matches!(err, AppError::Config(message) if message.contains("postgres")));
    }
}
