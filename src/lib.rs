//! # GameVault Search
//!
//! Fuzzy game catalog search for the GameVault download portal:
//! - Normalized multi-signal text scoring (tokens, acronyms, subsequences)
//! - App id extraction from hosted filenames
//! - Merging of curated mappings, catalog, drive listing and Steam store results
//! - SQLite or in-memory listing cache
//! - Interfaces: Rust library, HTTP API, CLI
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gamevault_search::{EngineConfig, SearchEngine};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EngineConfig::from_env()?;
//!     let engine = SearchEngine::from_config(&config).await?;
//!
//!     let response = engine.search("stardew").await?;
//!     for row in &response.results {
//!         println!("{} ({:?})", row.name, row.app_id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod cache;
pub mod ranking;
pub mod providers;
pub mod engine;
pub mod error;
pub mod config;

// Re-export primary types
pub use core::{CatalogEntry, FileCandidate, MappingRecord, RankedResult, SearchResponse, SearchSource, StoreApp};
pub use engine::{DownloadTarget, SearchEngine, SearchOptions};
pub use error::{Result, SearchError};
pub use config::{DriveMode, EngineConfig};
pub use cache::ListingCache;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
