//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup; there is no runtime reloading.

use std::env;

/// Access token lifetime default: 15 minutes.
const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;

/// Refresh token lifetime default: 7 days.
const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// GCP project ID (Firestore). Local dev points the client at the
    /// emulator via FIRESTORE_EMULATOR_HOST instead.
    pub gcp_project_id: String,
    /// Frontend URL, used for the CORS allow-origin predicate
    pub frontend_url: String,
    /// "development" or "production"; controls cookie Secure/SameSite
    pub environment: String,
    /// HS256 secret for access tokens
    pub jwt_access_secret: Vec<u8>,
    /// HS256 secret for refresh tokens (distinct from the access secret)
    pub jwt_refresh_secret: Vec<u8>,
    /// Access token lifetime in seconds
    pub access_token_ttl_secs: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_secs: i64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            jwt_access_secret: env::var("JWT_ACCESS_SECRET")
                .map_err(|_| ConfigError::Missing("JWT_ACCESS_SECRET"))?
                .into_bytes(),
            jwt_refresh_secret: env::var("JWT_REFRESH_SECRET")
                .map_err(|_| ConfigError::Missing("JWT_REFRESH_SECRET"))?
                .into_bytes(),
            access_token_ttl_secs: parse_ttl("ACCESS_TOKEN_EXPIRES_IN", DEFAULT_ACCESS_TOKEN_TTL_SECS)?,
            refresh_token_ttl_secs: parse_ttl(
                "REFRESH_TOKEN_EXPIRES_IN",
                DEFAULT_REFRESH_TOKEN_TTL_SECS,
            )?,
        })
    }

    /// Whether cookies should be issued with production attributes.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            gcp_project_id: "test-project".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            environment: "development".to_string(),
            jwt_access_secret: b"test_access_key_32_bytes_minimum".to_vec(),
            jwt_refresh_secret: b"test_refresh_key_32_bytes_minim!".to_vec(),
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: DEFAULT_REFRESH_TOKEN_TTL_SECS,
        }
    }
}

/// Parse a TTL env var as whole seconds.
fn parse_ttl(name: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(default),
        Ok(raw) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::Invalid(name)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
