use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::core::StoreApp;
use crate::providers::Storefront;
use crate::error::{Result, SearchError};
use crate::ranking::is_numeric_id;

const STORE_BASE_URL: &str = "https://store.steampowered.com";
const SEARCH_TIMEOUT: Duration = Duration::from_millis(6500);
const DETAILS_TIMEOUT: Duration = Duration::from_secs(5);

/// Steam store provider
pub struct SteamProvider {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct StoreSearchResponse {
    #[serde(default)]
    items: Vec<StoreSearchItem>,
}

#[derive(Debug, Deserialize)]
struct StoreSearchItem {
    id: u64,
    #[serde(default)]
    name: String,
    #[serde(default)]
    tiny_image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AppDetailsData {
    success: bool,
    #[serde(default)]
    data: Option<SteamAppDetails>,
}

#[derive(Debug, Deserialize, Default)]
struct SteamAppDetails {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "type")]
    app_type: Option<String>,
    #[serde(default)]
    header_image: Option<String>,
}

impl SteamProvider {
    /// Create new Steam provider
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: STORE_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn search_item_to_app(item: StoreSearchItem) -> StoreApp {
        let app_id = item.id.to_string();
        let name = if item.name.is_empty() {
            format!("App {}", app_id)
        } else {
            item.name
        };
        let mut app = StoreApp::new(app_id, name);
        app.header_image = item.tiny_image.filter(|url| !url.is_empty());
        app
    }

    fn details_to_app(app_id: &str, details: SteamAppDetails) -> StoreApp {
        let mut app = StoreApp::new(app_id, details.name);
        app.header_image = details.header_image.filter(|url| !url.is_empty());
        app.app_type = details.app_type.filter(|t| !t.is_empty());
        app
    }
}

#[async_trait]
impl Storefront for SteamProvider {
    async fn search_by_name(&self, query: &str, limit: usize) -> Result<Vec<StoreApp>> {
        let term = query.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/api/storesearch/?term={}&l=english&cc=us",
            self.base_url,
            urlencoding::encode(term)
        );

        let response = self.client
            .get(&url)
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await
            .map_err(|e| SearchError::provider("steam", format!("Search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(SearchError::provider("steam", format!("HTTP {}", response.status())));
        }

        let payload: StoreSearchResponse = response
            .json()
            .await
            .map_err(|e| SearchError::provider("steam", format!("Invalid JSON: {}", e)))?;

        Ok(payload
            .items
            .into_iter()
            .take(limit.max(1))
            .map(Self::search_item_to_app)
            .collect())
    }

    async fn app_details(&self, app_id: &str) -> Result<Option<StoreApp>> {
        let id = app_id.trim();
        if !is_numeric_id(id) {
            return Ok(None);
        }

        let url = format!("{}/api/appdetails?appids={}&l=english", self.base_url, id);

        let response = self.client
            .get(&url)
            .timeout(DETAILS_TIMEOUT)
            .send()
            .await
            .map_err(|e| SearchError::provider("steam", format!("Details request failed: {}", e)))?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let mut payload: HashMap<String, AppDetailsData> = response
            .json()
            .await
            .map_err(|e| SearchError::provider("steam", format!("Invalid JSON: {}", e)))?;

        Ok(payload
            .remove(id)
            .filter(|entry| entry.success)
            .and_then(|entry| entry.data)
            .map(|details| Self::details_to_app(id, details)))
    }

    fn name(&self) -> &str {
        "steam"
    }
}
