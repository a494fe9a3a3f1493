use std::{env, fmt::Display, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::error::{Result, SearchError};

/// Where downloadable files come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveMode {
    /// Catalog only, downloads are demo placeholders
    Local,
    /// Files listed from a cloud drive folder
    Drive,
}

impl FromStr for DriveMode {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "local" => Ok(DriveMode::Local),
            "drive" => Ok(DriveMode::Drive),
            other => Err(SearchError::Config(format!("unknown DRIVE_MODE '{}'", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub drive_mode: DriveMode,
    pub folder_id: Option<String>,
    /// Service account key as inline JSON
    pub service_account_json: Option<String>,
    /// Service account key as base64-encoded JSON
    pub service_account_base64: Option<String>,
    /// Path to a service account key file
    pub service_account_path: Option<String>,
    /// Plain bearer token, used when no service account is configured
    pub drive_access_token: Option<String>,
    pub db_path: Option<String>,
    pub listing_cache_ttl: Duration,
    pub host: String,
    pub port: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            drive_mode: DriveMode::Local,
            folder_id: None,
            service_account_json: None,
            service_account_base64: None,
            service_account_path: None,
            drive_access_token: None,
            db_path: None,
            listing_cache_ttl: Duration::from_secs(60),
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            drive_mode: try_load("DRIVE_MODE", "local")?,
            folder_id: optional("GOOGLE_FOLDER_ID"),
            service_account_json: optional("GOOGLE_SERVICE_ACCOUNT_JSON"),
            service_account_base64: optional("GOOGLE_SERVICE_ACCOUNT_BASE64"),
            service_account_path: optional("GOOGLE_SERVICE_ACCOUNT_PATH"),
            drive_access_token: optional("DRIVE_ACCESS_TOKEN"),
            db_path: optional("DB_PATH"),
            listing_cache_ttl: Duration::from_secs(try_load("LISTING_CACHE_TTL_SECS", "60")?),
            host: try_load("HOST", "0.0.0.0")?,
            port: try_load("PORT", "3000")?,
        })
    }

    /// Drive folder, required in drive mode
    pub fn require_folder_id(&self) -> Result<&str> {
        self.folder_id
            .as_deref()
            .ok_or_else(|| SearchError::Config("Missing GOOGLE_FOLDER_ID".to_string()))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = optional(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        SearchError::Config(format!("invalid {key}: {e}"))
    })
}
