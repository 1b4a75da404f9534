//! Configuration loading and representation.
//!
//! Everything comes from environment variables; `from_lookup` takes any
//! key lookup so tests don't have to touch the process environment.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_JWT_SECRET: &str = "dev-secret";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is required when {reason}")]
    Missing { key: &'static str, reason: &'static str },

    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Which catalog store backs the service.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

impl core::fmt::Debug for StoreBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreBackend::InMemory => f.write_str("InMemory"),
            // The URL may embed credentials.
            StoreBackend::Postgres {
                max_connections, ..
            } => f
                .debug_struct("Postgres")
                .field("max_connections", max_connections)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub store: StoreBackend,
    /// Upsert the default catalog at startup.
    pub seed_catalog: bool,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("store", &self.store)
            .field("seed_catalog", &self.seed_catalog)
            .finish()
    }
}

impl AppConfig {
    /// In-memory configuration with the given signing secret (tests/dev).
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            store: StoreBackend::InMemory,
            seed_catalog: false,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let jwt_secret = match get("JWT_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let store = if parse_flag("USE_PERSISTENT_STORES", get("USE_PERSISTENT_STORES"))? {
            let database_url = get("DATABASE_URL")
                .filter(|s| !s.is_empty())
                .ok_or(ConfigError::Missing {
                    key: "DATABASE_URL",
                    reason: "USE_PERSISTENT_STORES=true",
                })?;
            let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                None => DEFAULT_MAX_CONNECTIONS,
                Some(raw) => match raw.trim().parse::<u32>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        return Err(ConfigError::Invalid {
                            key: "DATABASE_MAX_CONNECTIONS",
                            value: raw,
                            reason: "expected a positive integer".to_string(),
                        });
                    }
                },
            };
            StoreBackend::Postgres {
                database_url,
                max_connections,
            }
        } else {
            StoreBackend::InMemory
        };

        let seed_catalog = parse_flag("SEED_CATALOG", get("SEED_CATALOG"))?;

        Ok(Self {
            bind_addr,
            jwt_secret,
            store,
            seed_catalog,
        })
    }
}

fn parse_flag(key: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    let Some(raw) = raw else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" => Ok(false),
        "1" | "true" | "yes" => Ok(true),
        _ => Err(ConfigError::Invalid {
            key,
            value: raw,
            reason: "expected true or false".to_string(),
        }),
    }
}
