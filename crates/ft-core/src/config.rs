//! Configuration types and loading
//!
//! Environment-driven configuration for the central store connection, the
//! local embedded store, and sync tuning knobs.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Top-level engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Central relational store connection
    pub central: CentralConfig,

    /// Local embedded cache
    pub local: LocalConfig,

    /// Sync engine tuning
    pub sync: SyncConfig,
}

/// Central store (PostgreSQL) connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CentralConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for CentralConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/fieldtrack".to_string(),
            max_connections: 5,
            connect_timeout_secs: 30,
        }
    }
}

/// Local embedded store (SQLite) settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalConfig {
    /// SQLite connection URL, e.g. `sqlite://fieldtrack.db` or
    /// `sqlite::memory:` in tests
    pub url: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://fieldtrack.db".to_string(),
        }
    }
}

/// Sync engine tuning knobs
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SyncConfig {
    /// Keys per ownership-lookup round trip, kept under relational
    /// parameter-count limits
    pub ownership_chunk_size: usize,

    /// Rows applied per local write batch during pull
    pub pull_batch_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            ownership_chunk_size: 500,
            pull_batch_size: 1000,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults. A `.env` file is honored when present.
    pub fn from_env() -> Result<Self, EngineError> {
        let _ = dotenvy::dotenv();

        let central = CentralConfig {
            url: std::env::var("FT_CENTRAL_URL")
                .unwrap_or_else(|_| CentralConfig::default().url),
            max_connections: env_parse("FT_CENTRAL_MAX_CONNECTIONS", 5)?,
            connect_timeout_secs: env_parse("FT_CENTRAL_CONNECT_TIMEOUT", 30)?,
        };

        let local = LocalConfig {
            url: std::env::var("FT_LOCAL_URL").unwrap_or_else(|_| LocalConfig::default().url),
        };

        let sync = SyncConfig {
            ownership_chunk_size: env_parse("FT_OWNERSHIP_CHUNK_SIZE", 500)?,
            pull_batch_size: env_parse("FT_PULL_BATCH_SIZE", 1000)?,
        };

        Ok(Self {
            central,
            local,
            sync,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, EngineError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| EngineError::Config(format!("{key} is not a valid value: {raw}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_defaults() {
        let sync = SyncConfig::default();
        assert_eq!(sync.ownership_chunk_size, 500);
        assert_eq!(sync.pull_batch_size, 1000);
    }

    #[test]
    fn test_env_parse_rejects_garbage() {
        std::env::set_var("FT_TEST_CHUNK", "not-a-number");
        let result: Result<usize, _> = env_parse("FT_TEST_CHUNK", 1);
        assert!(result.is_err());
        std::env::remove_var("FT_TEST_CHUNK");
    }
}
