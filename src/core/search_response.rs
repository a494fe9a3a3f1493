use serde::{Deserialize, Serialize};
use crate::core::{RankedResult, StoreApp};

/// Where the result rows were ranked from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    /// Local catalog (demo placeholder downloads)
    Local,
    /// Cloud drive file listing
    Drive,
}

impl SearchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSource::Local => "local",
            SearchSource::Drive => "drive",
        }
    }
}

/// Search response with ranked rows and their origin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Ranking origin
    pub source: SearchSource,

    /// Ordered, deduplicated rows
    #[serde(default)]
    pub results: Vec<RankedResult>,
}

impl SearchResponse {
    pub fn new(source: SearchSource, results: Vec<RankedResult>) -> Self {
        Self { source, results }
    }

    pub fn empty(source: SearchSource) -> Self {
        Self::new(source, Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Get display string for logging
    pub fn display(&self) -> String {
        let top = self
            .results
            .first()
            .map(|r| r.game_name.clone().unwrap_or_else(|| r.name.clone()))
            .unwrap_or_else(|| "-".to_string());
        format!("{} result(s) from {} [top: {}]", self.results.len(), self.source.as_str(), top)
    }
}

/// Body of a single storefront app lookup: `{"app": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppDetailsResponse {
    pub app: StoreApp,
}

impl From<StoreApp> for AppDetailsResponse {
    fn from(app: StoreApp) -> Self {
        Self { app }
    }
}
