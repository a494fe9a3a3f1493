pub mod auth;
pub mod catalog;
pub mod drive;
pub mod mapping;
pub mod steam;

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::{CatalogEntry, FileCandidate, MappingRecord, StoreApp};
use crate::error::Result;

pub use auth::{AccessTokenSource, DriveCredentials, ServiceAccountToken, StaticToken};
pub use catalog::{CatalogLoader, StaticCatalog};
pub use drive::{DriveProvider, StaticListing};
pub use mapping::SqliteMappingStore;
pub use steam::SteamProvider;

/// Supplies the known game catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Load the catalog (implementations may load once and reuse)
    async fn games(&self) -> Result<Arc<Vec<CatalogEntry>>>;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// Lists the files hosted in a remote folder, flattened across pages
#[async_trait]
pub trait FileListing: Send + Sync {
    async fn list_files(&self, folder_id: &str) -> Result<Vec<FileCandidate>>;

    fn name(&self) -> &str;
}

/// Remote storefront search (Steam)
#[async_trait]
pub trait Storefront: Send + Sync {
    /// Search titles by name, at most `limit` results
    async fn search_by_name(&self, query: &str, limit: usize) -> Result<Vec<StoreApp>>;

    /// Get a single app by id, `None` if the store does not know it
    async fn app_details(&self, app_id: &str) -> Result<Option<StoreApp>>;

    fn name(&self) -> &str;
}

/// Administrator-curated app id → file mappings
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Records whose name or app id contains `query`
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<MappingRecord>>;

    async fn find(&self, app_id: &str) -> Result<Option<MappingRecord>>;

    /// Insert or replace the record for its app id; both app id and file id are required
    async fn upsert(&self, record: &MappingRecord) -> Result<MappingRecord>;

    /// Remove the record, returning whether one existed
    async fn remove(&self, app_id: &str) -> Result<bool>;
}
