//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honored for local development.

use std::env;
use std::str::FromStr;

/// Where records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-process tables; contents are lost on exit
    Memory,
    /// Google Cloud Firestore
    Firestore,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "firestore" => Ok(StorageBackend::Firestore),
            _ => Err(()),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    pub storage: StorageBackend,
    /// GCP project ID (required for Firestore)
    pub gcp_project_id: Option<String>,
    /// Bearer key for admin endpoints. Admin endpoints are closed when unset.
    pub admin_api_key: Option<String>,
    /// Periodic leaderboard rebuild interval in seconds (0 = disabled)
    pub leaderboard_refresh_secs: u64,
    /// Populate the store with sample data at startup
    pub seed_on_startup: bool,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:3000".to_string(),
            port: 8080,
            storage: StorageBackend::Memory,
            gcp_project_id: None,
            admin_api_key: Some("test_admin_key".to_string()),
            leaderboard_refresh_secs: 0,
            seed_on_startup: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let storage = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                var: "STORAGE_BACKEND",
                value: raw,
            })?,
            Err(_) => StorageBackend::Memory,
        };

        let gcp_project_id = non_empty_var("GCP_PROJECT_ID");
        if storage == StorageBackend::Firestore && gcp_project_id.is_none() {
            return Err(ConfigError::Missing("GCP_PROJECT_ID"));
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            port: parse_var("PORT", 8080)?,
            storage,
            gcp_project_id,
            admin_api_key: non_empty_var("ADMIN_API_KEY"),
            leaderboard_refresh_secs: parse_var("LEADERBOARD_REFRESH_SECS", 0)?,
            seed_on_startup: parse_var("SEED_ON_STARTUP", false)?,
        })
    }
}

fn non_empty_var(var: &'static str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match non_empty_var(var) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}
