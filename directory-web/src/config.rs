use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use directory_store::DeletePolicy;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub pool_size: u32,
    pub delete_policy: DeletePolicy,
    /// Seed fixture to load instead of the bundled one.
    pub seed_fixture: Option<PathBuf>,
    /// Directory served for paths no route matches.
    pub public_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "directory.db".to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            pool_size: 8,
            delete_policy: DeletePolicy::Orphan,
            seed_fixture: None,
            public_dir: None,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = match var("BIND_ADDR") {
            Some(addr) => addr.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: format!("{e}"),
            })?,
            None => defaults.bind_addr,
        };
        let pool_size = match var("DB_POOL_SIZE") {
            Some(size) => match size.parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "DB_POOL_SIZE",
                        reason: format!("`{size}` is not a positive integer"),
                    });
                }
            },
            None => defaults.pool_size,
        };
        let delete_policy = match var("DELETE_POLICY") {
            Some(policy) => policy.parse::<DeletePolicy>().map_err(|reason| ConfigError::Invalid {
                name: "DELETE_POLICY",
                reason,
            })?,
            None => defaults.delete_policy,
        };

        Ok(Settings {
            database_url: var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr,
            pool_size,
            delete_policy,
            seed_fixture: var("SEED_FIXTURE").map(PathBuf::from),
            public_dir: var("PUBLIC_DIR").map(PathBuf::from),
        })
    }
}
