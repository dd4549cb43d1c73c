//! Configuration management for the Authgate backend
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: AUTHGATE__)
//! 4. The bare `PORT` variable, which wins over everything for the listen port

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::env;

/// Identity tokens are valid for one day
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

/// Application configuration
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub store: StoreConfig,
}

/// Server configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: SecretString,
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Deserialize)]
pub struct JwtConfig {
    /// Signing secret; token operations are impossible without it
    #[serde(default)]
    pub secret: Option<SecretString>,
    pub token_ttl_secs: i64,
}

/// Which user store implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Store selection
#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                name: "authgate".to_string(),
                user: "postgres".to_string(),
                password: SecretString::new("postgres".to_string()),
                max_connections: 10,
            },
            jwt: JwtConfig {
                secret: None,
                token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            },
            store: StoreConfig {
                backend: StoreBackend::Postgres,
            },
        }
    }
}

impl DatabaseConfig {
    /// Connection options built from the credential pair
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(self.password.expose_secret())
            .application_name("authgate")
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on RUST_ENV (development.toml or production.toml)
    /// 3. Environment variables with AUTHGATE__ prefix
    /// 4. PORT
    pub fn load() -> Result<Self> {
        let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let config_file = format!("config/{}.toml", env);
        let defaults = AppConfig::default();

        let mut builder = config::Config::builder()
            // Start with defaults
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("database.host", defaults.database.host)?
            .set_default("database.port", i64::from(defaults.database.port))?
            .set_default("database.name", defaults.database.name)?
            .set_default("database.user", defaults.database.user)?
            .set_default("database.password", "postgres")?
            .set_default("database.max_connections", i64::from(defaults.database.max_connections))?
            .set_default("jwt.token_ttl_secs", defaults.jwt.token_ttl_secs)?
            .set_default("store.backend", "postgres")?
            // Load from environment-specific config file
            .add_source(config::File::with_name(&config_file).required(false))
            // Override with environment variables (AUTHGATE__ prefix)
            // e.g., AUTHGATE__JWT__SECRET=... sets jwt.secret
            .add_source(config::Environment::with_prefix("AUTHGATE").separator("__"));

        if let Ok(port) = env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// The token signing secret, or an error if none was configured
    pub fn jwt_secret(&self) -> Result<&SecretString> {
        self.jwt
            .secret
            .as_ref()
            .context("JWT signing secret is not configured (set AUTHGATE__JWT__SECRET)")
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production")
            .unwrap_or(false)
    }
}
