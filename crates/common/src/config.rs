//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables once at startup;
//! nothing in the request path reads the environment.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Which backend serves the entity stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbBackend {
    /// Process-local maps; data does not survive a restart.
    #[default]
    Memory,
    /// SQLite is accepted for development but currently served by the
    /// in-memory store set; selecting it logs a warning at startup.
    Sqlite,
    Postgres,
}

impl DbBackend {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => DbBackend::Postgres,
            "sqlite" => DbBackend::Sqlite,
            _ => DbBackend::Memory,
        }
    }
}

/// Redis connection settings for the shared rate-limit counter store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub addr: String,
    pub password: String,
    pub db: i64,
    /// Advertised RESP protocol version (`REDIS_PROTOCOL`, default 3).
    /// Informational: the client library negotiates the protocol on
    /// connect; values other than 3 are logged at startup.
    pub protocol: i64,
}

impl RedisConfig {
    /// Build a `redis://` connection URL from the individual fields.
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}/{}", self.addr, self.db)
        } else {
            format!("redis://:{}@{}/{}", self.password, self.addr, self.db)
        }
    }
}

/// Bootstrap admin identity created by `bifrost init-admin`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    pub api_key: String,
    pub name: String,
    pub email: String,
    pub org_name: String,
    pub org_domain: String,
    pub org_email: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on (`BIFROST_PORT`, default 3333).
    pub port: u16,

    /// Entity-store backend (`BIFROST_DB`).
    pub db: DbBackend,

    /// Deployment mode label (`BIFROST_MODE`), e.g. `test`. Informational;
    /// it never relaxes authentication by itself.
    pub mode: String,

    /// Postgres DSN (`DATABASE_DSN`); required when `db` is `postgres`.
    pub database_dsn: String,

    /// Shared counter store.
    pub redis: RedisConfig,

    /// Base64-encoded 32-byte token signing key (`BIFROST_SIGNING_KEY`).
    /// Missing or malformed values fall back to a fresh random key.
    pub signing_key: Option<String>,

    /// Static requester credential honoured only in `--insecure-dev` mode
    /// (`BIFROST_STATIC_API_KEY`).
    pub static_api_key: String,

    /// Prometheus exposition toggle (`BIFROST_ENABLE_METRICS`).
    pub enable_metrics: bool,

    /// Runtime logging configuration.
    pub log_level: String,
    pub log_format: String,

    pub admin: AdminConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            port: env::var("BIFROST_PORT")
                .unwrap_or_else(|_| "3333".to_string())
                .parse()
                .unwrap_or(3333),

            db: DbBackend::parse(&env::var("BIFROST_DB").unwrap_or_default()),

            mode: env::var("BIFROST_MODE").unwrap_or_default(),

            database_dsn: env::var("DATABASE_DSN").unwrap_or_default(),

            redis: RedisConfig {
                addr: env::var("REDIS_ADDR").unwrap_or_else(|_| "localhost:6379".to_string()),
                password: env::var("REDIS_PASSWORD").unwrap_or_default(),
                db: env::var("REDIS_DB")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0),
                protocol: env::var("REDIS_PROTOCOL")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(3),
            },

            signing_key: env::var("BIFROST_SIGNING_KEY").ok().filter(|v| !v.is_empty()),

            static_api_key: env::var("BIFROST_STATIC_API_KEY").unwrap_or_default(),

            enable_metrics: truthy(&env::var("BIFROST_ENABLE_METRICS").unwrap_or_default()),

            log_level: env::var("BIFROST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format: env::var("BIFROST_LOG_FORMAT").unwrap_or_else(|_| "json".to_string()),

            admin: AdminConfig {
                api_key: env::var("BIFROST_ADMIN_API_KEY").unwrap_or_default(),
                name: env::var("BIFROST_ADMIN_NAME").unwrap_or_else(|_| "Admin".to_string()),
                email: env::var("BIFROST_ADMIN_EMAIL")
                    .unwrap_or_else(|_| "admin@example.com".to_string()),
                org_name: env::var("BIFROST_ADMIN_ORG_NAME")
                    .unwrap_or_else(|_| "Admin".to_string()),
                org_domain: env::var("BIFROST_ADMIN_ORG_DOMAIN")
                    .unwrap_or_else(|_| "example.com".to_string()),
                org_email: env::var("BIFROST_ADMIN_ORG_EMAIL")
                    .unwrap_or_else(|_| "admin@example.com".to_string()),
                role: env::var("BIFROST_ADMIN_ROLE").unwrap_or_else(|_| "owner".to_string()),
            },
        };

        Ok(config)
    }
}

fn truthy(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "True" | "yes" | "YES")
}
