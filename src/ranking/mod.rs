//! Fuzzy catalog search: one implementation shared by the server, the CLI
//! and every other caller.
//!
//! Everything here is pure and synchronous. Nothing is cached between calls,
//! so it is safe to run once per keystroke from any number of tasks.

pub mod app_id;
pub mod merge;
pub mod normalize;
pub mod ranker;
pub mod scorer;

pub use app_id::extract_app_id;
pub use merge::{merge_games, merge_results};
pub use normalize::{acronym, compact, is_subsequence, normalize, tokens};
pub use ranker::{
    find_file_by_app_id, rank_catalog, rank_files, resolve_file_id, score_catalog_entry,
    score_file, CatalogIndex, MAX_SEARCH_RESULTS,
};
pub use scorer::{is_numeric_id, score_app_id, score_text};
