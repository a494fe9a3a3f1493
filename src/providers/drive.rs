use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{listing_key, ListingCache, DEFAULT_LISTING_TTL};
use crate::core::FileCandidate;
use crate::error::{Result, SearchError};
use crate::providers::{AccessTokenSource, FileListing, StaticToken};

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const PAGE_SIZE: &str = "1000";
const LIST_FIELDS: &str = "nextPageToken, files(id, name, size, modifiedTime)";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFileList {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<FileCandidate>,
}

/// Google Drive folder listing (v3 REST API, bearer token auth)
pub struct DriveProvider {
    client: Client,
    tokens: Arc<dyn AccessTokenSource>,
    base_url: String,
    cache: Option<Arc<dyn ListingCache>>,
    ttl: Duration,
}

impl DriveProvider {
    /// Create new Drive provider; every page request asks `tokens` for a bearer token
    pub fn new(tokens: Arc<dyn AccessTokenSource>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            tokens,
            base_url: DRIVE_FILES_URL.to_string(),
            cache: None,
            ttl: DEFAULT_LISTING_TTL,
        })
    }

    /// Provider authenticating with a fixed bearer token
    pub fn with_access_token(access_token: impl Into<String>) -> Result<Self> {
        Self::new(Arc::new(StaticToken::new(access_token)))
    }

    /// Serve repeated listings of the same folder from `cache` for `ttl`
    pub fn with_cache(mut self, cache: Arc<dyn ListingCache>, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.ttl = ttl;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_page(&self, folder_id: &str, page_token: Option<&str>) -> Result<DriveFileList> {
        let filter = format!("'{}' in parents and trashed = false", folder_id);
        let mut params = vec![
            ("q", filter.as_str()),
            ("fields", LIST_FIELDS),
            ("pageSize", PAGE_SIZE),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let access_token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(&self.base_url)
            .bearer_auth(access_token)
            .query(&params)
            .send()
            .await
            .map_err(|e| SearchError::provider("drive", format!("List request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SearchError::provider("drive", format!("HTTP {}", response.status())));
        }

        response
            .json()
            .await
            .map_err(|e| SearchError::provider("drive", format!("Invalid JSON: {}", e)))
    }

    async fn fetch_all(&self, folder_id: &str) -> Result<Vec<FileCandidate>> {
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(folder_id, page_token.as_deref()).await?;
            files.extend(page.files);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        tracing::debug!("Drive folder {} listed {} files", folder_id, files.len());
        Ok(files)
    }
}

#[async_trait]
impl FileListing for DriveProvider {
    async fn list_files(&self, folder_id: &str) -> Result<Vec<FileCandidate>> {
        let key = listing_key(folder_id);

        if let Some(cache) = &self.cache {
            match cache.get(&key).await {
                Ok(Some(files)) => return Ok(files),
                Ok(None) => {}
                Err(e) => tracing::warn!("Listing cache read failed: {}", e),
            }
        }

        let files = self.fetch_all(folder_id.trim()).await?;

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(&key, &files, self.ttl).await {
                tracing::warn!("Failed to cache listing for {}: {}", key, e);
            }
        }

        Ok(files)
    }

    fn name(&self) -> &str {
        "drive"
    }
}

/// Fixed listing returned for every folder (demo mode, tests)
pub struct StaticListing {
    files: Vec<FileCandidate>,
}

impl StaticListing {
    pub fn new(files: Vec<FileCandidate>) -> Self {
        Self { files }
    }

    /// Parse a Drive-style JSON array of files
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }
}

#[async_trait]
impl FileListing for StaticListing {
    async fn list_files(&self, _folder_id: &str) -> Result<Vec<FileCandidate>> {
        Ok(self.files.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
