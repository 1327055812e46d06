//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::net::{IpAddr, SocketAddr};

use billsplit_shared::constants::{DEFAULT_API_PORT, DEFAULT_MAX_IMAGES_PER_BILL};
use billsplit_store::Database;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port for the HTTP API.
    /// Env: `API_PORT`
    /// Default: `8000`
    pub port: u16,

    /// Interface to bind.
    /// Env: `API_HOST`
    /// Default: `0.0.0.0`
    pub host: IpAddr,

    /// Document store connection string (`sqlite://<path>`, a bare path,
    /// or `:memory:`).
    /// Env: `API_DATABASE_URL`
    /// Default: `sqlite://<platform data dir>/bill-split.db`
    pub database_url: String,

    /// Maximum number of images a single bill may hold.
    /// Env: `API_MAX_IMAGES_PER_BILL`
    /// Default: `32`
    pub max_images_per_bill: usize,

    /// Maximum accepted request body size in bytes.
    /// Env: `API_MAX_BODY_BYTES`
    /// Default: 32 MiB
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let database_url = match Database::default_path() {
            Ok(path) => format!("sqlite://{}", path.display()),
            Err(_) => "sqlite://bill-split.db".to_string(),
        };

        Self {
            port: DEFAULT_API_PORT,
            host: IpAddr::from([0, 0, 0, 0]),
            database_url,
            max_images_per_bill: DEFAULT_MAX_IMAGES_PER_BILL,
            max_body_bytes: 32 * 1024 * 1024, // 32 MiB
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Overlay the values returned by `lookup` on the defaults.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("API_PORT") {
            match val.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => tracing::warn!(value = %val, "Invalid API_PORT, using default"),
            }
        }

        if let Some(val) = lookup("API_HOST") {
            match val.parse::<IpAddr>() {
                Ok(host) => config.host = host,
                Err(_) => tracing::warn!(value = %val, "Invalid API_HOST, using default"),
            }
        }

        if let Some(url) = lookup("API_DATABASE_URL") {
            if !url.is_empty() {
                config.database_url = url;
            }
        }

        if let Some(val) = lookup("API_MAX_IMAGES_PER_BILL") {
            match val.parse::<usize>() {
                Ok(n) => config.max_images_per_bill = n,
                Err(_) => {
                    tracing::warn!(value = %val, "Invalid API_MAX_IMAGES_PER_BILL, using default")
                }
            }
        }

        if let Some(val) = lookup("API_MAX_BODY_BYTES") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_body_bytes = n,
                _ => tracing::warn!(value = %val, "Invalid API_MAX_BODY_BYTES, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> ServerConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr(), ([0, 0, 0, 0], 8000).into());
        assert_eq!(config.max_images_per_bill, 32);
        assert!(config.database_url.starts_with("sqlite://"));
        assert!(config.database_url.ends_with("bill-split.db"));
    }

    #[test]
    fn test_env_overrides() {
        let config = from_pairs(&[
            ("API_PORT", "9000"),
            ("API_HOST", "127.0.0.1"),
            ("API_DATABASE_URL", ":memory:"),
            ("API_MAX_IMAGES_PER_BILL", "4"),
        ]);
        assert_eq!(config.http_addr(), ([127, 0, 0, 1], 9000).into());
        assert_eq!(config.database_url, ":memory:");
        assert_eq!(config.max_images_per_bill, 4);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = from_pairs(&[
            ("API_PORT", "eighty"),
            ("API_HOST", "localhost:80"),
            ("API_MAX_BODY_BYTES", "0"),
        ]);
        let default = ServerConfig::default();
        assert_eq!(config.port, default.port);
        assert_eq!(config.host, default.host);
        assert_eq!(config.max_body_bytes, default.max_body_bytes);
    }
}
