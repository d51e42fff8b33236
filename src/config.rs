// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;
use std::time::Duration;

/// Name of the session cookie carrying the JWT.
pub const SESSION_COOKIE: &str = "hub_session";

/// Which `ContentStore` adapter to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

impl StoreBackend {
    fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", raw.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL for CORS and post-login redirects
    pub frontend_url: String,
    /// Public URL of this service, used to build the OAuth callback
    pub site_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Persistence adapter
    pub store_backend: StoreBackend,
    /// Base URL of the identity provider (GoTrue-compatible)
    pub auth_url: String,
    /// Path to the static concept catalog
    pub catalog_path: String,
    /// How long an engagement snapshot may be served from the route cache
    pub route_cache_ttl: Duration,

    // --- Secrets ---
    /// Public API key for the identity provider
    pub auth_anon_key: String,
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key for signing the OAuth state parameter
    pub oauth_state_key: Vec<u8>,
}

impl Config {
    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            site_url: "http://localhost:8080".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store_backend: StoreBackend::Memory,
            auth_url: "http://localhost:9999".to_string(),
            catalog_path: "data/concepts.json".to_string(),
            route_cache_ttl: Duration::from_secs(60),
            auth_anon_key: "test_anon_key".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            oauth_state_key: b"test_oauth_state_key".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file is read first if present, which is the usual setup for
    /// local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => StoreBackend::parse(&raw)?,
            Err(_) => StoreBackend::Firestore,
        };

        let route_cache_ttl = env::var("ROUTE_CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(60));

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            site_url: env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            store_backend,
            auth_url: env::var("AUTH_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("AUTH_URL"))?,
            catalog_path: env::var("CATALOG_PATH")
                .unwrap_or_else(|_| "data/concepts.json".to_string()),
            route_cache_ttl,

            auth_anon_key: env::var("AUTH_ANON_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("AUTH_ANON_KEY"))?,
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            oauth_state_key: env::var("OAUTH_STATE_KEY")
                .map_err(|_| ConfigError::Missing("OAUTH_STATE_KEY"))?
                .into_bytes(),
        })
    }

    /// Absolute URL the identity provider redirects back to after OAuth.
    pub fn oauth_callback_url(&self) -> String {
        format!("{}/auth/callback", self.site_url.trim_end_matches('/'))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("AUTH_URL", "https://auth.example.com/");
        env::set_var("AUTH_ANON_KEY", " anon ");
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("OAUTH_STATE_KEY", "state_key");
        env::set_var("STORE_BACKEND", "Memory");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.auth_url, "https://auth.example.com");
        assert_eq!(config.auth_anon_key, "anon");
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_store_backend_rejects_unknown() {
        assert!(matches!(
            StoreBackend::parse("postgres"),
            Err(ConfigError::Invalid("STORE_BACKEND", _))
        ));
        assert_eq!(
            StoreBackend::parse(" firestore ").unwrap(),
            StoreBackend::Firestore
        );
    }

    #[test]
    fn test_oauth_callback_url() {
        let mut config = Config::test_default();
        config.site_url = "https://hub.example.com/".to_string();
        assert_eq!(
            config.oauth_callback_url(),
            "https://hub.example.com/auth/callback"
        );
    }
}
