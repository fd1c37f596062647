//! Configuration types and loading

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Document store configuration
    pub database: DatabaseConfig,

    /// Server configuration
    pub server: ServerConfig,

    /// Search behaviour shared by every repository
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// MongoDB connection string
    pub uri: String,
    /// Database holding the platform collections
    pub name: String,
    pub max_pool_size: u32,
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    pub max_body_size_bytes: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Fields stripped from every search projection
    pub hidden_fields: Vec<String>,
    /// Fields the user listing never returns
    pub user_excluded_fields: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                uri: "mongodb://localhost:27017".to_string(),
                name: "hire".to_string(),
                max_pool_size: 10,
                connect_timeout_seconds: 10,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                request_timeout_seconds: 60,
                max_body_size_bytes: 10 * 1024 * 1024,
            },
            search: SearchConfig {
                hidden_fields: vec!["__v".to_string()],
                user_excluded_fields: vec!["__v".to_string(), "password".to_string()],
            },
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        // Database
        if let Some(uri) = var("MONGODB_URI").or_else(|| var("DATABASE_URL")) {
            config.database.uri = uri;
        }
        if let Some(name) = var("MONGODB_DATABASE") {
            config.database.name = name;
        }
        if let Some(size) = var("MONGODB_MAX_POOL_SIZE") {
            config.database.max_pool_size = parse_var("MONGODB_MAX_POOL_SIZE", &size)?;
        }
        if let Some(secs) = var("MONGODB_CONNECT_TIMEOUT_SECONDS") {
            config.database.connect_timeout_seconds =
                parse_var("MONGODB_CONNECT_TIMEOUT_SECONDS", &secs)?;
        }

        // Server
        if let Some(host) = var("HOST") {
            config.server.host = host;
        }
        if let Some(port) = var("PORT") {
            config.server.port = parse_var("PORT", &port)?;
        }
        if let Some(secs) = var("REQUEST_TIMEOUT_SECONDS") {
            config.server.request_timeout_seconds = parse_var("REQUEST_TIMEOUT_SECONDS", &secs)?;
        }

        // Search
        if let Some(fields) = var("SEARCH_HIDDEN_FIELDS") {
            config.search.hidden_fields = split_list(&fields);
        }
        if let Some(fields) = var("USER_EXCLUDED_FIELDS") {
            config.search.user_excluded_fields = split_list(&fields);
        }

        Ok(config)
    }

    /// Get the server socket address
    pub fn server_addr(&self) -> std::net::SocketAddr {
        use std::net::SocketAddr;
        let ip: std::net::IpAddr = self.server.host.parse().unwrap_or([0, 0, 0, 0].into());
        SocketAddr::new(ip, self.server.port)
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
