use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::core::CatalogEntry;
use crate::error::Result;
use crate::providers::CatalogSource;

/// Built-in catalog used when nothing else is configured
const FALLBACK_GAMES: &[(&str, &str)] = &[
    ("Kerbal Space Program", "220200"),
    ("Factorio", "427520"),
    ("Stardew Valley", "413150"),
    ("Satisfactory", "526870"),
    ("Deep Rock Galactic", "548430"),
    ("Valheim", "892970"),
];

pub fn fallback_games() -> Vec<CatalogEntry> {
    FALLBACK_GAMES
        .iter()
        .map(|(name, app_id)| CatalogEntry::new(*name, *app_id))
        .collect()
}

/// Catalog loaded once per process from, in order: an inline JSON blob
/// (`GAMES_JSON`), the first readable JSON file, or the built-in list.
pub struct CatalogLoader {
    inline_json: Option<String>,
    paths: Vec<PathBuf>,
    loaded: OnceCell<Arc<Vec<CatalogEntry>>>,
}

impl CatalogLoader {
    pub fn new(inline_json: Option<String>, paths: Vec<PathBuf>) -> Self {
        Self {
            inline_json,
            paths,
            loaded: OnceCell::new(),
        }
    }

    /// `GAMES_JSON`, then `data/games.json` and `site/data/games.json` under the working directory
    pub fn from_env() -> Self {
        let inline_json = std::env::var("GAMES_JSON").ok().filter(|s| !s.trim().is_empty());
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::new(
            inline_json,
            vec![cwd.join("data").join("games.json"), cwd.join("site").join("data").join("games.json")],
        )
    }

    async fn read_catalog_file(path: &PathBuf) -> Option<Vec<CatalogEntry>> {
        let raw = tokio::fs::read_to_string(path).await.ok()?;
        match CatalogEntry::list_from_json(&raw) {
            Ok(games) => Some(games),
            Err(e) => {
                tracing::warn!("Ignoring malformed catalog {}: {}", path.display(), e);
                None
            }
        }
    }

    async fn load(&self) -> Vec<CatalogEntry> {
        if let Some(json) = &self.inline_json {
            match CatalogEntry::list_from_json(json) {
                Ok(games) => {
                    tracing::info!("Loaded {} games from GAMES_JSON", games.len());
                    return games;
                }
                Err(e) => tracing::warn!("Ignoring malformed GAMES_JSON: {}", e),
            }
        }

        for path in &self.paths {
            if let Some(games) = Self::read_catalog_file(path).await {
                tracing::info!("Loaded {} games from {}", games.len(), path.display());
                return games;
            }
        }

        tracing::info!("No catalog configured, using built-in list");
        fallback_games()
    }
}

#[async_trait]
impl CatalogSource for CatalogLoader {
    async fn games(&self) -> Result<Arc<Vec<CatalogEntry>>> {
        let games = self
            .loaded
            .get_or_init(|| async { Arc::new(self.load().await) })
            .await;
        Ok(Arc::clone(games))
    }

    fn name(&self) -> &str {
        "catalog"
    }
}

/// Fixed in-memory catalog
pub struct StaticCatalog {
    games: Arc<Vec<CatalogEntry>>,
}

impl StaticCatalog {
    pub fn new(games: Vec<CatalogEntry>) -> Self {
        Self {
            games: Arc::new(games),
        }
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn games(&self) -> Result<Arc<Vec<CatalogEntry>>> {
        Ok(Arc::clone(&self.games))
    }

    fn name(&self) -> &str {
        "static"
    }
}
