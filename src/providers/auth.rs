//! Drive credentials.
//!
//! A service account key is the normal setup: it arrives as inline JSON,
//! base64-encoded JSON, or a key file path, checked in that order. A bare
//! bearer token is still accepted for short-lived local runs.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use gcp_auth::{CustomServiceAccount, TokenProvider};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::error::{Result, SearchError};

/// Read-only access to the hosted files
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

/// Hands out bearer tokens for Drive requests
#[async_trait]
pub trait AccessTokenSource: Send + Sync {
    /// A token valid right now; called once per request
    async fn access_token(&self) -> Result<String>;

    fn name(&self) -> &str;
}

/// Fixed bearer token, never refreshed
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Service account key exchanged for short-lived tokens.
///
/// `gcp_auth` keeps the current token and only signs a new grant once it
/// is about to expire.
pub struct ServiceAccountToken {
    account: CustomServiceAccount,
}

impl ServiceAccountToken {
    pub fn from_json(json: &str) -> Result<Self> {
        let account = CustomServiceAccount::from_json(json)
            .map_err(|e| SearchError::Config(format!("invalid service account key: {}", e)))?;
        Ok(Self { account })
    }

    pub fn from_base64(encoded: &str) -> Result<Self> {
        Self::from_json(&decode_key(encoded)?)
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let account = CustomServiceAccount::from_file(&path).map_err(|e| {
            SearchError::Config(format!("invalid service account file {}: {}", path.display(), e))
        })?;
        Ok(Self { account })
    }
}

#[async_trait]
impl AccessTokenSource for ServiceAccountToken {
    async fn access_token(&self) -> Result<String> {
        let token = self
            .account
            .token(&[DRIVE_SCOPE])
            .await
            .map_err(|e| SearchError::provider("drive", format!("Token request failed: {}", e)))?;
        Ok(token.as_str().to_string())
    }

    fn name(&self) -> &str {
        "service-account"
    }
}

fn decode_key(encoded: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| SearchError::Config(format!("invalid GOOGLE_SERVICE_ACCOUNT_BASE64: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| SearchError::Config(format!("invalid GOOGLE_SERVICE_ACCOUNT_BASE64: {}", e)))
}

/// Which configured credential the Drive listing will use
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveCredentials {
    ServiceAccountJson(String),
    ServiceAccountBase64(String),
    ServiceAccountFile(PathBuf),
    AccessToken(String),
}

impl DriveCredentials {
    /// First configured credential, service account forms first
    pub fn from_config(config: &EngineConfig) -> Option<Self> {
        if let Some(json) = &config.service_account_json {
            return Some(Self::ServiceAccountJson(json.clone()));
        }
        if let Some(encoded) = &config.service_account_base64 {
            return Some(Self::ServiceAccountBase64(encoded.clone()));
        }
        if let Some(path) = &config.service_account_path {
            return Some(Self::ServiceAccountFile(PathBuf::from(path)));
        }
        config.drive_access_token.clone().map(Self::AccessToken)
    }

    pub fn into_source(self) -> Result<Arc<dyn AccessTokenSource>> {
        let source: Arc<dyn AccessTokenSource> = match self {
            Self::ServiceAccountJson(json) => Arc::new(ServiceAccountToken::from_json(&json)?),
            Self::ServiceAccountBase64(encoded) => Arc::new(ServiceAccountToken::from_base64(&encoded)?),
            Self::ServiceAccountFile(path) => Arc::new(ServiceAccountToken::from_file(path)?),
            Self::AccessToken(token) => Arc::new(StaticToken::new(token)),
        };
        tracing::info!("Drive credentials: {}", source.name());
        Ok(source)
    }
}
