use std::collections::HashSet;

use crate::core::{CatalogEntry, RankedResult};

/// Combine two result lists keyed by app id.
///
/// Rows of `primary` always win; a `secondary` row is kept only when its app
/// id has not been seen. Rows without an app id are dropped. Order is all
/// surviving `primary` rows, then surviving `secondary` rows.
pub fn merge_results(primary: Vec<RankedResult>, secondary: Vec<RankedResult>) -> Vec<RankedResult> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(primary.len() + secondary.len());

    for row in primary.into_iter().chain(secondary) {
        let Some(key) = row.app_id_key().map(str::to_string) else {
            continue;
        };
        if seen.insert(key) {
            merged.push(row);
        }
    }

    merged
}

/// Combine two catalogs keyed by app id, emitting trimmed `{name, app_id}`
/// records. Entries missing either field are dropped.
pub fn merge_games(primary: &[CatalogEntry], secondary: &[CatalogEntry]) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(primary.len() + secondary.len());

    for entry in primary.iter().chain(secondary) {
        let app_id = entry.app_id.trim();
        let name = entry.name.trim();
        if app_id.is_empty() || name.is_empty() {
            continue;
        }
        if seen.insert(app_id.to_string()) {
            merged.push(CatalogEntry::new(name, app_id));
        }
    }

    merged
}
