use clap::{Parser, Subcommand};
use gamevault_search::cache::{ListingCache, SqliteCache};
use gamevault_search::core::MappingRecord;
use gamevault_search::providers::mapping::ADMIN_MAPPING_LIMIT;
use gamevault_search::providers::{
    CatalogLoader, CatalogSource, FileListing, MappingStore, SqliteMappingStore, StaticListing,
};
use gamevault_search::ranking::{extract_app_id, rank_files, CatalogIndex};
use gamevault_search::{EngineConfig, SearchEngine};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gamevault-cli")]
#[command(about = "GameVault search CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the configured sources (see DRIVE_MODE, GAMES_JSON, DB_PATH)
    Search {
        /// Search query
        query: String,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Print the app id derived from a filename
    ExtractAppId {
        filename: String,
    },

    /// Rank a saved listing (JSON array of files) against the catalog
    Files {
        /// Listing file
        listing: PathBuf,

        /// Search query
        query: String,
    },

    /// Get listing cache statistics
    Stats {
        /// Database path
        #[arg(short, long, env = "DB_PATH", default_value = "gamevault.db")]
        db: String,
    },

    /// Drop expired listing cache entries
    Cleanup {
        /// Database path
        #[arg(short, long, env = "DB_PATH", default_value = "gamevault.db")]
        db: String,
    },

    /// Manage curated app id → file mappings
    Mapping {
        #[command(subcommand)]
        action: MappingAction,

        /// Database path
        #[arg(short, long, env = "DB_PATH", default_value = "gamevault.db")]
        db: String,
    },
}

#[derive(Subcommand)]
enum MappingAction {
    /// List mappings whose name or app id contains the query
    List {
        query: String,

        #[arg(short, long, default_value_t = ADMIN_MAPPING_LIMIT)]
        limit: usize,
    },

    /// Create or replace the mapping for an app id
    Set {
        app_id: String,
        file_id: String,

        #[arg(long, default_value = "")]
        name: String,

        /// File size in bytes
        #[arg(long)]
        size: Option<u64>,

        /// Header art URL
        #[arg(long)]
        art: Option<String>,
    },

    /// Delete the mapping for an app id
    Remove {
        app_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search { query, json } => {
            let config = EngineConfig::from_env()?;
            let engine = SearchEngine::from_config(&config).await?;
            let response = engine.search(&query).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }

            println!("🔍 {} ({})", query, response.source.as_str());
            if response.is_empty() {
                println!("   No results");
            }
            for (i, row) in response.results.iter().enumerate() {
                println!(
                    "   {}. {} [{}]{}",
                    i + 1,
                    row.name,
                    row.app_id.as_deref().unwrap_or("-"),
                    row.game_name
                        .as_deref()
                        .filter(|g| *g != row.name)
                        .map(|g| format!(" → {}", g))
                        .unwrap_or_default()
                );
            }
        }

        Commands::ExtractAppId { filename } => match extract_app_id(&filename) {
            Some(app_id) => println!("{}", app_id),
            None => {
                eprintln!("No app id in '{}'", filename);
                std::process::exit(1);
            }
        },

        Commands::Files { listing, query } => {
            let raw = tokio::fs::read_to_string(&listing).await?;
            let files = StaticListing::from_json(&raw)?.list_files("").await?;
            let games = CatalogLoader::from_env().games().await?;

            let ranked = rank_files(&files, &query, &CatalogIndex::new(&games));
            println!("📋 {} of {} files match '{}'", ranked.len(), files.len(), query);
            for (i, row) in ranked.iter().enumerate() {
                println!(
                    "   {}. {} ({}) {}",
                    i + 1,
                    row.name,
                    row.id,
                    row.game_name.as_deref().unwrap_or("")
                );
            }
        }

        Commands::Stats { db } => {
            let stats = SqliteCache::new(&db).await?.stats().await?;

            println!("📊 Listing cache:");
            println!("   Total entries: {}", stats.total_entries);
            println!("   Total hits: {}", stats.total_hits);
            println!("   Avg hits/entry: {:.2}", stats.avg_hit_count);

            if let Some(oldest) = stats.oldest_entry {
                println!("   Oldest entry: {}", oldest.format("%Y-%m-%d %H:%M:%S"));
            }
            if let Some(newest) = stats.newest_entry {
                println!("   Newest entry: {}", newest.format("%Y-%m-%d %H:%M:%S"));
            }
        }

        Commands::Cleanup { db } => {
            let deleted = SqliteCache::new(&db).await?.cleanup().await?;
            println!("🧹 Deleted {} expired entries", deleted);
        }

        Commands::Mapping { action, db } => {
            let store = SqliteMappingStore::new(&db).await?;

            match action {
                MappingAction::List { query, limit } => {
                    let records = store.search(&query, limit).await?;
                    println!("📋 {} mapping(s) match '{}'", records.len(), query);
                    for record in records {
                        println!(
                            "   {} {} → {}",
                            record.app_id,
                            record.name,
                            record.file_id.as_deref().unwrap_or("-")
                        );
                    }
                }

                MappingAction::Set { app_id, file_id, name, size, art } => {
                    let mut record = MappingRecord::new(app_id, name).with_file_id(file_id);
                    record.size_bytes = size;
                    record.art = art;

                    let stored = store.upsert(&record).await?;
                    println!("{}", serde_json::to_string_pretty(&stored)?);
                }

                MappingAction::Remove { app_id } => {
                    if store.remove(&app_id).await? {
                        println!("🗑️  Removed mapping for {}", app_id.trim());
                    } else {
                        println!("No mapping for {}", app_id.trim());
                    }
                }
            }
        }
    }

    Ok(())
}
