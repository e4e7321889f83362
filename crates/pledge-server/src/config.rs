//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8080`
    pub http_addr: SocketAddr,

    /// Explicit SQLite database path.  When unset the platform data
    /// directory is used.
    /// Env: `DATABASE_PATH`
    pub database_path: Option<PathBuf>,

    /// Bearer token granting superAdmin access without a session.
    /// Env: `ADMIN_TOKEN`
    /// Default: empty (token auth disabled; sessions only).
    pub admin_token: Option<String>,

    /// TTL for the dashboard summary cache, in seconds.
    /// Env: `DASHBOARD_CACHE_TTL_SECS`
    /// Default: `300` (5 minutes)
    pub dashboard_cache_ttl_secs: u64,

    /// Session lifetime, in hours.
    /// Env: `SESSION_TTL_HOURS`
    /// Default: `72`
    pub session_ttl_hours: u64,
}

// Hand-rolled so the admin token never lands in logs; only its presence
// is printed.
impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("http_addr", &self.http_addr)
            .field("database_path", &self.database_path)
            .field("admin_token_set", &self.admin_token.is_some())
            .field("dashboard_cache_ttl_secs", &self.dashboard_cache_ttl_secs)
            .field("session_ttl_hours", &self.session_ttl_hours)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], 8080).into(),
            database_path: None,
            admin_token: None,
            dashboard_cache_ttl_secs: 300,
            session_ttl_hours: 72,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Ok(path) = std::env::var("DATABASE_PATH") {
            config.database_path = Some(PathBuf::from(path));
        }

        if let Ok(token) = std::env::var("ADMIN_TOKEN") {
            if !token.is_empty() {
                config.admin_token = Some(token);
            }
        }

        if let Ok(val) = std::env::var("DASHBOARD_CACHE_TTL_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => config.dashboard_cache_ttl_secs = secs,
                Err(_) => {
                    tracing::warn!(value = %val, "Invalid DASHBOARD_CACHE_TTL_SECS, using default")
                }
            }
        }

        if let Ok(val) = std::env::var("SESSION_TTL_HOURS") {
            match val.parse::<u64>() {
                Ok(hours) => config.session_ttl_hours = hours,
                Err(_) => {
                    tracing::warn!(value = %val, "Invalid SESSION_TTL_HOURS, using default")
                }
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_contains_admin_token() {
        let config = ServerConfig {
            admin_token: Some("hunter2-super-secret".to_string()),
            ..ServerConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2-super-secret"));
        assert!(rendered.contains("admin_token_set: true"));
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.http_addr, ([0, 0, 0, 0], 8080).into());
        assert_eq!(config.dashboard_cache_ttl_secs, 300);
        assert!(config.admin_token.is_none());
    }
}
