use crate::cache::{ListingCache, MemoryCache, SqliteCache};
use crate::config::{DriveMode, EngineConfig};
use crate::core::{CatalogEntry, RankedResult, SearchResponse, SearchSource, StoreApp};
use crate::error::{Result, SearchError};
use crate::providers::mapping::DEFAULT_MAPPING_LIMIT;
use crate::providers::{
    CatalogLoader, CatalogSource, DriveCredentials, DriveProvider, FileListing, MappingStore, SqliteMappingStore,
    SteamProvider, Storefront,
};
use crate::ranking::{
    is_numeric_id, merge_games, merge_results, rank_catalog, rank_files, resolve_file_id, CatalogIndex,
};
use std::sync::Arc;
use std::time::Instant;

/// Search orchestration knobs
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub drive_mode: DriveMode,
    pub folder_id: Option<String>,
    /// Mapping records pulled ahead of every search
    pub mapping_limit: usize,
    /// Below this many results a name query is enriched from the storefront
    pub sparse_threshold: usize,
    /// Storefront matches used to relabel drive files
    pub drive_enrich_limit: usize,
    /// Storefront matches appended to local results
    pub local_enrich_limit: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            drive_mode: DriveMode::Local,
            folder_id: None,
            mapping_limit: DEFAULT_MAPPING_LIMIT,
            sparse_threshold: 5,
            drive_enrich_limit: 120,
            local_enrich_limit: 40,
        }
    }
}

/// What a download request resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    /// Local mode: a generated placeholder for the app id
    Demo(String),
    /// Drive mode: the hosted file id
    DriveFile(String),
}

/// Main search orchestrator: gathers candidates from every source and hands
/// them to the ranking functions.
pub struct SearchEngine {
    catalog: Arc<dyn CatalogSource>,
    listing: Option<Arc<dyn FileListing>>,
    storefront: Option<Arc<dyn Storefront>>,
    mappings: Option<Arc<dyn MappingStore>>,
    options: SearchOptions,
}

impl SearchEngine {
    pub fn new(catalog: Arc<dyn CatalogSource>) -> Self {
        Self {
            catalog,
            listing: None,
            storefront: None,
            mappings: None,
            options: SearchOptions::default(),
        }
    }

    /// Wire the default providers described by `config`
    pub async fn from_config(config: &EngineConfig) -> Result<Self> {
        let mut engine = Self::new(Arc::new(CatalogLoader::from_env()))
            .with_storefront(Arc::new(SteamProvider::new()?))
            .with_options(SearchOptions {
                drive_mode: config.drive_mode,
                folder_id: config.folder_id.clone(),
                ..SearchOptions::default()
            });

        if let Some(db_path) = &config.db_path {
            engine = engine.with_mappings(Arc::new(SqliteMappingStore::new(db_path).await?));
            tracing::info!("Mapping store: {}", db_path);
        }

        if config.drive_mode == DriveMode::Drive {
            config.require_folder_id()?;
            let tokens = DriveCredentials::from_config(config)
                .ok_or_else(|| {
                    SearchError::Config(
                        "Missing GOOGLE_SERVICE_ACCOUNT_JSON, GOOGLE_SERVICE_ACCOUNT_BASE64, \
                         GOOGLE_SERVICE_ACCOUNT_PATH or DRIVE_ACCESS_TOKEN"
                            .to_string(),
                    )
                })?
                .into_source()?;
            let cache: Arc<dyn ListingCache> = match &config.db_path {
                Some(db_path) => Arc::new(SqliteCache::new(db_path).await?),
                None => Arc::new(MemoryCache::new()),
            };
            let drive = DriveProvider::new(tokens)?.with_cache(cache, config.listing_cache_ttl);
            engine = engine.with_listing(Arc::new(drive));
        }

        Ok(engine)
    }

    pub fn with_listing(mut self, listing: Arc<dyn FileListing>) -> Self {
        self.listing = Some(listing);
        self
    }

    pub fn with_storefront(mut self, storefront: Arc<dyn Storefront>) -> Self {
        self.storefront = Some(storefront);
        self
    }

    pub fn with_mappings(mut self, mappings: Arc<dyn MappingStore>) -> Self {
        self.mappings = Some(mappings);
        self
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Search every configured source for `query`
    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        let start = Instant::now();
        let query = query.trim();

        let response = if query.is_empty() {
            SearchResponse::empty(self.source())
        } else {
            let mapped = self.mapping_matches(query).await;
            match self.options.drive_mode {
                DriveMode::Drive => self.search_drive(query, mapped).await?,
                DriveMode::Local => self.search_local(query, mapped).await?,
            }
        };

        tracing::debug!(
            "search '{}' → {} in {:.2}ms",
            query,
            response.display(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(response)
    }

    /// Storefront details for a single numeric app id
    pub async fn app_details(&self, app_id: &str) -> Result<Option<StoreApp>> {
        let app_id = app_id.trim();
        if !is_numeric_id(app_id) {
            return Err(SearchError::InvalidInput(format!("invalid appId '{}'", app_id)));
        }
        match &self.storefront {
            Some(storefront) => storefront.app_details(app_id).await,
            None => Ok(None),
        }
    }

    /// Resolve a download id (file id or app id) to what should be served.
    ///
    /// A numeric id with a mapped `file_id` resolves to that file without
    /// listing the folder; otherwise the listing decides, and `None` means 404.
    pub async fn resolve_download(&self, requested: &str) -> Result<Option<DownloadTarget>> {
        let requested = requested.trim();
        if requested.is_empty() {
            return Err(SearchError::InvalidInput("missing file id".to_string()));
        }

        if self.options.drive_mode == DriveMode::Local {
            return Ok(Some(DownloadTarget::Demo(requested.to_string())));
        }

        if is_numeric_id(requested) {
            if let Some(mappings) = &self.mappings {
                if let Some(file_id) = mappings.find(requested).await?.and_then(|m| m.file_id) {
                    return Ok(Some(DownloadTarget::DriveFile(file_id)));
                }
            }
        }

        let files = self.list_files().await?;
        Ok(resolve_file_id(&files, requested).map(DownloadTarget::DriveFile))
    }

    fn source(&self) -> SearchSource {
        match self.options.drive_mode {
            DriveMode::Drive => SearchSource::Drive,
            DriveMode::Local => SearchSource::Local,
        }
    }

    async fn list_files(&self) -> Result<Vec<crate::core::FileCandidate>> {
        let folder_id = self
            .options
            .folder_id
            .as_deref()
            .ok_or_else(|| SearchError::Config("Missing GOOGLE_FOLDER_ID".to_string()))?;
        let listing = self
            .listing
            .as_ref()
            .ok_or_else(|| SearchError::Config("No file listing configured".to_string()))?;
        listing.list_files(folder_id).await
    }

    async fn mapping_matches(&self, query: &str) -> Vec<RankedResult> {
        let Some(mappings) = &self.mappings else {
            return Vec::new();
        };
        match mappings.search(query, self.options.mapping_limit).await {
            Ok(records) => {
                tracing::debug!("Mapping store returned {} records", records.len());
                records.into_iter().map(RankedResult::from).collect()
            }
            Err(e) => {
                tracing::warn!("Mapping search failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn store_matches(&self, query: &str, limit: usize) -> Vec<StoreApp> {
        let Some(storefront) = &self.storefront else {
            return Vec::new();
        };
        match storefront.search_by_name(query, limit).await {
            Ok(apps) => {
                tracing::debug!("Provider {} returned {} results", storefront.name(), apps.len());
                apps
            }
            Err(e) => {
                tracing::warn!("Provider {} failed: {}", storefront.name(), e);
                Vec::new()
            }
        }
    }

    async fn placeholder(&self, app_id: &str) -> RankedResult {
        let details = match &self.storefront {
            Some(storefront) => storefront.app_details(app_id).await.unwrap_or_else(|e| {
                tracing::warn!("Provider {} details failed: {}", storefront.name(), e);
                None
            }),
            None => None,
        };
        RankedResult::placeholder(app_id, details.as_ref())
    }

    fn is_sparse(&self, query: &str, results: &[RankedResult]) -> bool {
        !is_numeric_id(query) && results.len() < self.options.sparse_threshold
    }

    async fn search_drive(&self, query: &str, mapped: Vec<RankedResult>) -> Result<SearchResponse> {
        let files = self.list_files().await?;
        let games = self.catalog.games().await?;

        let drive_results = rank_files(&files, query, &CatalogIndex::new(&games));
        let mut results = if mapped.is_empty() {
            drive_results
        } else {
            merge_results(mapped, drive_results)
        };

        if self.is_sparse(query, &results) {
            let store_games: Vec<CatalogEntry> = self
                .store_matches(query, self.options.drive_enrich_limit)
                .await
                .iter()
                .map(CatalogEntry::from)
                .collect();
            if !store_games.is_empty() {
                let merged = merge_games(&games, &store_games);
                let enriched = rank_files(&files, query, &CatalogIndex::new(&merged));
                if enriched.len() > results.len() {
                    results = enriched;
                }
            }
        }

        if results.is_empty() && is_numeric_id(query) {
            results.push(self.placeholder(query).await);
        }

        Ok(SearchResponse::new(SearchSource::Drive, results))
    }

    async fn search_local(&self, query: &str, mapped: Vec<RankedResult>) -> Result<SearchResponse> {
        let games = self.catalog.games().await?;

        let local: Vec<RankedResult> = rank_catalog(&games, query)
            .into_iter()
            .map(RankedResult::from)
            .collect();
        let mut results = merge_results(mapped, local);

        if self.is_sparse(query, &results) {
            let store_rows = self
                .store_matches(query, self.options.local_enrich_limit)
                .await
                .into_iter()
                .map(RankedResult::from)
                .collect();
            results = merge_results(results, store_rows);
        }

        if results.is_empty() && is_numeric_id(query) {
            results.push(self.placeholder(query).await);
        }

        Ok(SearchResponse::new(SearchSource::Local, results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FileCandidate, MappingRecord};
    use crate::providers::{StaticCatalog, StaticListing};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeStore {
        apps: Vec<StoreApp>,
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeStore {
        fn new(apps: Vec<StoreApp>) -> Self {
            Self { apps, calls: AtomicUsize::new(0), fail: false }
        }

        fn failing() -> Self {
            Self { apps: Vec::new(), calls: AtomicUsize::new(0), fail: true }
        }
    }

    #[async_trait]
    impl Storefront for FakeStore {
        async fn search_by_name(&self, _query: &str, limit: usize) -> Result<Vec<StoreApp>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(SearchError::provider("fake", "down"));
            }
            Ok(self.apps.iter().take(limit).cloned().collect())
        }

        async fn app_details(&self, app_id: &str) -> Result<Option<StoreApp>> {
            if self.fail {
                return Err(SearchError::provider("fake", "down"));
            }
            Ok(self.apps.iter().find(|a| a.app_id == app_id).cloned())
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn catalog() -> Arc<dyn CatalogSource> {
        Arc::new(StaticCatalog::new(crate::providers::catalog::fallback_games()))
    }

    fn drive_options() -> SearchOptions {
        SearchOptions {
            drive_mode: DriveMode::Drive,
            folder_id: Some("folder".to_string()),
            ..SearchOptions::default()
        }
    }

    #[tokio::test]
    async fn test_empty_query() {
        let engine = SearchEngine::new(catalog());
        let response = engine.search("   ").await.unwrap();
        assert!(response.is_empty());
        assert_eq!(response.source, SearchSource::Local);
    }

    #[tokio::test]
    async fn test_local_search_skips_store_when_dense_or_numeric() {
        let store = Arc::new(FakeStore::new(vec![StoreApp::new("1", "Whatever")]));
        let engine = SearchEngine::new(catalog()).with_storefront(store.clone());

        let response = engine.search("413150").await.unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].name, "Stardew Valley");
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_local_search_enriched_from_store() {
        let store = Arc::new(FakeStore::new(vec![
            StoreApp::new("413150", "Stardew Valley (store copy)"),
            StoreApp::new("1", "Stardust Galaxy"),
        ]));
        let engine = SearchEngine::new(catalog()).with_storefront(store.clone());

        let response = engine.search("stardew").await.unwrap();
        let names: Vec<&str> = response.results.iter().map(|r| r.name.as_str()).collect();
        // catalog row wins over the store copy, new store rows are appended
        assert_eq!(names, vec!["Stardew Valley", "Stardust Galaxy"]);
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_store_failure_degrades() {
        let engine = SearchEngine::new(catalog()).with_storefront(Arc::new(FakeStore::failing()));
        let response = engine.search("stardew").await.unwrap();
        assert_eq!(response.results.len(), 1);
    }

    #[tokio::test]
    async fn test_numeric_placeholder() {
        let store = Arc::new(FakeStore::new(vec![StoreApp::new("620", "Portal 2")]));
        let engine = SearchEngine::new(catalog()).with_storefront(store);

        let known = engine.search("620").await.unwrap();
        assert_eq!(known.results[0].name, "Portal 2");
        assert_eq!(known.results[0].game_name.as_deref(), Some("Portal 2"));

        let unknown = engine.search("31337").await.unwrap();
        assert_eq!(unknown.results[0].name, "App 31337");
        assert_eq!(unknown.results[0].game_name, None);
    }

    #[tokio::test]
    async fn test_mappings_take_priority_locally() {
        let mappings = Arc::new(crate::providers::SqliteMappingStore::new(":memory:").await.unwrap());
        mappings
            .upsert(&MappingRecord::new("427520", "Factorio (curated)").with_file_id("drive-fac"))
            .await
            .unwrap();
        let engine = SearchEngine::new(catalog()).with_mappings(mappings);

        let response = engine.search("factorio").await.unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].name, "Factorio (curated)");
        assert_eq!(response.results[0].file_id.as_deref(), Some("drive-fac"));
    }

    #[tokio::test]
    async fn test_drive_mode_requires_folder() {
        let engine = SearchEngine::new(catalog()).with_options(SearchOptions {
            drive_mode: DriveMode::Drive,
            ..SearchOptions::default()
        });
        let err = engine.search("factorio").await.unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[tokio::test]
    async fn test_from_config_drive_credentials() {
        let mut config = EngineConfig {
            drive_mode: DriveMode::Drive,
            folder_id: Some("folder".to_string()),
            ..EngineConfig::default()
        };
        let err = SearchEngine::from_config(&config).await.err().unwrap();
        assert!(matches!(&err, SearchError::Config(m) if m.contains("GOOGLE_SERVICE_ACCOUNT_JSON")));

        config.service_account_json = Some("{\"type\":\"service_account\"}".to_string());
        assert!(matches!(SearchEngine::from_config(&config).await, Err(SearchError::Config(_))));

        config.service_account_json = None;
        config.drive_access_token = Some("bearer".to_string());
        assert!(SearchEngine::from_config(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_drive_search_labels_files() {
        let listing = Arc::new(StaticListing::new(vec![
            FileCandidate::new("f-fac", "427520.zip"),
            FileCandidate::new("f-val", "892970.zip"),
            FileCandidate::new("f-misc", "notes.txt"),
        ]));
        let engine = SearchEngine::new(catalog())
            .with_listing(listing)
            .with_options(drive_options());

        let response = engine.search("valheim").await.unwrap();
        assert_eq!(response.source, SearchSource::Drive);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].id, "f-val");
        assert_eq!(response.results[0].game_name.as_deref(), Some("Valheim"));
    }

    #[tokio::test]
    async fn test_drive_search_enriched_by_store_names() {
        let listing = Arc::new(StaticListing::new(vec![FileCandidate::new("f-hk", "367520.zip")]));
        let store = Arc::new(FakeStore::new(vec![StoreApp::new("367520", "Hollow Knight")]));
        let engine = SearchEngine::new(catalog())
            .with_listing(listing)
            .with_storefront(store)
            .with_options(drive_options());

        let response = engine.search("hollow knight").await.unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].id, "f-hk");
        assert_eq!(response.results[0].game_name.as_deref(), Some("Hollow Knight"));
    }

    #[tokio::test]
    async fn test_resolve_download() {
        let listing = Arc::new(StaticListing::new(vec![FileCandidate::new("f-val", "892970.zip")]));
        let engine = SearchEngine::new(catalog())
            .with_listing(listing)
            .with_options(drive_options());

        assert_eq!(
            engine.resolve_download("892970").await.unwrap(),
            Some(DownloadTarget::DriveFile("f-val".to_string()))
        );
        assert_eq!(
            engine.resolve_download("f-val").await.unwrap(),
            Some(DownloadTarget::DriveFile("f-val".to_string()))
        );
        assert_eq!(engine.resolve_download("427520").await.unwrap(), None);
        assert!(engine.resolve_download("").await.is_err());

        let local = SearchEngine::new(catalog());
        assert_eq!(
            local.resolve_download("413150").await.unwrap(),
            Some(DownloadTarget::Demo("413150".to_string()))
        );
    }

    #[tokio::test]
    async fn test_app_details_validates_id() {
        let engine = SearchEngine::new(catalog());
        assert!(matches!(
            engine.app_details("abc").await,
            Err(SearchError::InvalidInput(_))
        ));
        assert!(engine.app_details("620").await.unwrap().is_none());
    }
}
