//! API Configuration Module
//!
//! Listener address and CORS settings, loaded from environment variables
//! with development-friendly defaults.

use std::net::{IpAddr, SocketAddr};

use crate::error::{ApiError, ApiResult};

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// HTTP surface configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    // ========================================================================
    // Listener
    // ========================================================================
    /// Interface to bind, e.g. "0.0.0.0" or "127.0.0.1".
    pub bind_host: String,

    /// TCP port. `PORT` takes precedence over `TASKNOTE_API_PORT`.
    pub port: u16,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(), // Empty = allow all
            cors_allow_credentials: false,
            cors_max_age_secs: 86400, // 24 hours
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// - `TASKNOTE_API_BIND`: interface (default: 0.0.0.0)
    /// - `PORT` / `TASKNOTE_API_PORT`: port (default: 3000)
    /// - `TASKNOTE_CORS_ORIGINS`: comma-separated origins (default: allow all)
    /// - `TASKNOTE_CORS_ALLOW_CREDENTIALS`: "true" to allow credentials
    /// - `TASKNOTE_CORS_MAX_AGE_SECS`: preflight cache (default: 86400)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("PORT")
            .or_else(|| lookup("TASKNOTE_API_PORT"))
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        let cors_origins = lookup("TASKNOTE_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            bind_host: lookup("TASKNOTE_API_BIND")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.bind_host),
            port,
            cors_origins,
            cors_allow_credentials: lookup("TASKNOTE_CORS_ALLOW_CREDENTIALS")
                .map(|s| s.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            cors_max_age_secs: lookup("TASKNOTE_CORS_MAX_AGE_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.cors_max_age_secs),
        }
    }

    /// Address the server listens on.
    pub fn socket_addr(&self) -> ApiResult<SocketAddr> {
        let ip: IpAddr = self.bind_host.parse().map_err(|e| {
            ApiError::internal_error(format!(
                "Invalid TASKNOTE_API_BIND '{}': {}",
                self.bind_host, e
            ))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ApiConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ApiConfig::default());
        assert!(!config.is_production());
    }

    #[test]
    fn test_port_precedence() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("TASKNOTE_API_PORT", "9090"),
        ]));
        assert_eq!(config.port, 8080);

        let config = ApiConfig::from_lookup(lookup(&[("TASKNOTE_API_PORT", "9090")]));
        assert_eq!(config.port, 9090);

        let config = ApiConfig::from_lookup(lookup(&[("PORT", "not-a-port")]));
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_cors_origins_parsing() {
        let config = ApiConfig::from_lookup(lookup(&[(
            "TASKNOTE_CORS_ORIGINS",
            "https://notes.example.com, ,https://admin.example.com",
        )]));
        assert_eq!(config.cors_origins.len(), 2);
        assert!(config.is_production());
        assert_eq!(config.cors_origins[1], "https://admin.example.com");
    }

    #[test]
    fn test_socket_addr() -> ApiResult<()> {
        let config = ApiConfig::from_lookup(lookup(&[
            ("TASKNOTE_API_BIND", "127.0.0.1"),
            ("TASKNOTE_API_PORT", "4000"),
        ]));
        assert_eq!(config.socket_addr()?.to_string(), "127.0.0.1:4000");

        let bad = ApiConfig {
            bind_host: "localhost:80".to_string(),
            ..ApiConfig::default()
        };
        assert!(bad.socket_addr().is_err());
        Ok(())
    }
}
