//! Server settings read from the environment (after `.env` is loaded).

use crate::error::ConfigError;
use std::collections::HashMap;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/database.db";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ServerConfig {
    /// Read `DATABASE_URL`, `HOST`, `PORT`, `DATABASE_MAX_CONNECTIONS` and `BODY_LIMIT_BYTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Same as [`ServerConfig::from_env`] over an explicit variable map. Missing or empty vars fall back to defaults.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());
        let defaults = Self::default();
        Ok(Self {
            database_url: get("DATABASE_URL")
                .map(str::to_string)
                .unwrap_or(defaults.database_url),
            host: get("HOST").map(str::to_string).unwrap_or(defaults.host),
            port: parse_var("PORT", get("PORT"))?.unwrap_or(defaults.port),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", get("DATABASE_MAX_CONNECTIONS"))?
                .unwrap_or(defaults.max_connections),
            body_limit_bytes: parse_var("BODY_LIMIT_BYTES", get("BODY_LIMIT_BYTES"))?
                .unwrap_or(defaults.body_limit_bytes),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(var: &'static str, raw: Option<&str>) -> Result<Option<T>, ConfigError> {
    raw.map(|v| {
        v.parse().map_err(|_| ConfigError::InvalidVar {
            var,
            value: v.to_string(),
        })
    })
    .transpose()
}
