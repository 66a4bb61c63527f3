use std::env;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::db::create_pool;
use crate::domain::errors::StorageError;
use crate::domain::ports::Storage;
use crate::infrastructure::{MemoryStore, RemoteStore, SqliteStore};
use crate::run_migrations;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has an invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Which backend sits behind the `Storage` port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Sqlite { database_url: String },
    Remote { base_url: String, timeout: Duration },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: StorageBackend,
    pub host: String,
    pub port: u16,
}

impl Settings {
    /// Reads settings from the process environment (after `.env` is loaded).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_name = lookup("STORAGE_BACKEND").unwrap_or_else(|| "sqlite".to_string());
        let backend = match backend_name.as_str() {
            "memory" => StorageBackend::Memory,
            "sqlite" => StorageBackend::Sqlite {
                database_url: lookup("DATABASE_URL").unwrap_or_else(|| "canteen.db".to_string()),
            },
            "remote" => {
                let base_url =
                    lookup("RECORD_SERVICE_URL").ok_or(ConfigError::Missing("RECORD_SERVICE_URL"))?;
                let timeout = parse(&lookup, "REMOTE_TIMEOUT_SECS", 30u64)?;
                StorageBackend::Remote {
                    base_url,
                    timeout: Duration::from_secs(timeout),
                }
            }
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    value: other.to_string(),
                    reason: "expected memory, sqlite or remote".to_string(),
                })
            }
        };

        Ok(Self {
            backend,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&lookup, "PORT", 8080u16)?,
        })
    }

    /// Opens the configured backend. SQLite databases are migrated first.
    pub fn build_storage(&self) -> Result<Arc<dyn Storage>, ConfigError> {
        match &self.backend {
            StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
            StorageBackend::Sqlite { database_url } => {
                let pool = create_pool(database_url).map_err(StorageError::from)?;
                run_migrations(&pool)?;
                Ok(Arc::new(SqliteStore::new(pool)))
            }
            StorageBackend::Remote { base_url, timeout } => {
                Ok(Arc::new(RemoteStore::new(base_url.clone(), *timeout)?))
            }
        }
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = lookup(name) else {
        return Ok(default);
    };
    match value.parse::<T>() {
        Ok(parsed) => Ok(parsed),
        Err(e) => Err(ConfigError::Invalid {
            name,
            reason: e.to_string(),
            value,
        }),
    }
}
