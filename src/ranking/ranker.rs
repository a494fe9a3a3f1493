use std::cmp::Ordering;
use std::collections::HashMap;

use crate::core::{Candidate, CatalogEntry, FileCandidate, RankedResult, ScoredCandidate};
use crate::ranking::app_id::extract_app_id;
use crate::ranking::scorer::{is_numeric_id, score_app_id, score_text};

/// Upper bound on rows returned by a ranking pass
pub const MAX_SEARCH_RESULTS: usize = 60;

const GAME_NAME_WEIGHT: f64 = 1.25;
const FILE_NAME_WEIGHT: f64 = 0.65;

/// Lookup from app id to catalog name, used to label listing files.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    names: HashMap<String, String>,
}

impl CatalogIndex {
    /// Build from catalog entries; a later entry for the same app id replaces an earlier one.
    pub fn new(entries: &[CatalogEntry]) -> Self {
        let names = entries
            .iter()
            .map(|entry| (entry.app_id.clone(), entry.name.clone()))
            .collect();
        Self { names }
    }

    pub fn get(&self, app_id: &str) -> Option<&str> {
        self.names.get(app_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl From<&[CatalogEntry]> for CatalogIndex {
    fn from(entries: &[CatalogEntry]) -> Self {
        Self::new(entries)
    }
}

/// Round half toward positive infinity, like the portal always has.
#[inline]
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn by_score_then_name(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.sort_name().cmp(b.sort_name()))
}

/// Composite score of one catalog entry.
pub fn score_catalog_entry(query: &str, entry: &CatalogEntry) -> i64 {
    score_text(query, &entry.name) + score_app_id(query, &entry.app_id)
}

/// Score a listing file: catalog-name match weighted over the raw filename,
/// plus the app id signal.
pub fn score_file(query: &str, file: &FileCandidate, catalog: &CatalogIndex) -> ScoredCandidate {
    let app_id = extract_app_id(&file.name);
    let game_name = app_id
        .as_deref()
        .and_then(|id| catalog.get(id))
        .unwrap_or_default()
        .to_string();

    let name_score = score_text(query, &game_name) as f64;
    let file_score = score_text(query, &file.name) as f64;
    let id_score = score_app_id(query, app_id.as_deref().unwrap_or_default()) as f64;
    let score = round_half_up(name_score * GAME_NAME_WEIGHT + file_score * FILE_NAME_WEIGHT + id_score);

    let mut scored = ScoredCandidate::new(Candidate::File(file.clone()), app_id, score);
    scored.game_name = game_name;
    scored
}

fn rank_scored(mut scored: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    scored.retain(|candidate| candidate.score > 0);
    scored.sort_by(by_score_then_name);
    scored.truncate(MAX_SEARCH_RESULTS);
    scored
}

/// Rank catalog entries for `query`, best first, at most 60.
pub fn rank_catalog(entries: &[CatalogEntry], query: &str) -> Vec<CatalogEntry> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let scored = entries
        .iter()
        .map(|entry| {
            ScoredCandidate::new(
                Candidate::Catalog(entry.clone()),
                None,
                score_catalog_entry(query, entry),
            )
        })
        .collect();

    rank_scored(scored)
        .into_iter()
        .filter_map(|candidate| match candidate.subject {
            Candidate::Catalog(entry) => Some(entry),
            _ => None,
        })
        .collect()
}

/// Rank listing files for `query`, labelling each with its catalog name.
pub fn rank_files(files: &[FileCandidate], query: &str, catalog: &CatalogIndex) -> Vec<RankedResult> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let scored = files
        .iter()
        .map(|file| score_file(query, file, catalog))
        .collect();

    rank_scored(scored)
        .into_iter()
        .map(ScoredCandidate::into_result)
        .collect()
}

/// First listing file whose derived app id equals `app_id`.
pub fn find_file_by_app_id<'a>(files: &'a [FileCandidate], app_id: &str) -> Option<&'a FileCandidate> {
    let target = app_id.trim();
    if target.is_empty() {
        return None;
    }
    files
        .iter()
        .find(|file| extract_app_id(&file.name).as_deref() == Some(target))
}

/// Resolve a download request to a file id: exact file id first, then a
/// digit-only input as an app id.
pub fn resolve_file_id(files: &[FileCandidate], input: &str) -> Option<String> {
    if input.is_empty() {
        return None;
    }
    if let Some(file) = files.iter().find(|file| file.id == input) {
        return Some(file.id.clone());
    }
    if is_numeric_id(input) {
        return find_file_by_app_id(files, input).map(|file| file.id.clone());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new("Kerbal Space Program", "220200"),
            CatalogEntry::new("Factorio", "427520"),
            CatalogEntry::new("Stardew Valley", "413150"),
            CatalogEntry::new("Satisfactory", "526870"),
            CatalogEntry::new("Deep Rock Galactic", "548430"),
            CatalogEntry::new("Valheim", "892970"),
        ]
    }

    #[test]
    fn test_rank_catalog_by_name() {
        let ranked = rank_catalog(&catalog(), "stardew");
        assert_eq!(ranked, vec![CatalogEntry::new("Stardew Valley", "413150")]);
    }

    #[test]
    fn test_rank_catalog_by_app_id() {
        let ranked = rank_catalog(&catalog(), "413150");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "Stardew Valley");
    }

    #[test]
    fn test_rank_catalog_no_match() {
        assert!(rank_catalog(&catalog(), "xyz").is_empty());
        assert!(rank_catalog(&catalog(), "   ").is_empty());
    }

    #[test]
    fn test_rank_catalog_acronym() {
        let ranked = rank_catalog(&catalog(), "drg");
        assert_eq!(ranked[0].name, "Deep Rock Galactic");
    }

    #[test]
    fn test_rank_catalog_truncates() {
        let entries: Vec<CatalogEntry> = (0..100)
            .map(|i| CatalogEntry::new(format!("Space Game {:03}", i), (10_000 + i).to_string()))
            .collect();
        let ranked = rank_catalog(&entries, "space game");
        assert_eq!(ranked.len(), MAX_SEARCH_RESULTS);
        // equal scores fall back to ascending name
        assert_eq!(ranked[0].name, "Space Game 000");
        assert_eq!(ranked[59].name, "Space Game 059");
    }

    #[test]
    fn test_rank_catalog_highest_first() {
        let entries = vec![
            CatalogEntry::new("Portal 2", "620"),
            CatalogEntry::new("Portal", "400"),
            CatalogEntry::new("Portal Knights", "374040"),
        ];
        let ranked = rank_catalog(&entries, "portal");
        assert_eq!(ranked[0].name, "Portal");
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_tie_break_deterministic() {
        // both names score -9 and both app ids get the prefix bonus
        let twins = vec![CatalogEntry::new("Gamma", "501"), CatalogEntry::new("Delta", "502")];
        for _ in 0..5 {
            let ranked = rank_catalog(&twins, "50");
            let names: Vec<&str> = ranked.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(names, vec!["Delta", "Gamma"]);
        }
    }

    #[test]
    fn test_rank_files_uses_catalog_name() {
        let index = CatalogIndex::new(&catalog());
        let files = vec![
            FileCandidate::new("f1", "427520.zip").with_size(100),
            FileCandidate::new("f2", "readme.txt"),
            FileCandidate::new("f3", "413150 build.zip"),
        ];
        let ranked = rank_files(&files, "factorio", &index);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "f1");
        assert_eq!(ranked[0].app_id.as_deref(), Some("427520"));
        assert_eq!(ranked[0].game_name.as_deref(), Some("Factorio"));
        assert_eq!(ranked[0].size, Some(100));
    }

    #[test]
    fn test_rank_files_filename_only() {
        let index = CatalogIndex::default();
        let files = vec![FileCandidate::new("f1", "Factorio (427520) Linux.tar.gz")];
        let ranked = rank_files(&files, "factorio", &index);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].app_id.as_deref(), Some("427520"));
        assert_eq!(ranked[0].game_name, None);
    }

    #[test]
    fn test_rank_files_truncates() {
        let index = CatalogIndex::default();
        let files: Vec<FileCandidate> = (0..100)
            .rev()
            .map(|i| FileCandidate::new(format!("drive-{}", i), format!("stardew {:03}.zip", i)))
            .collect();
        let ranked = rank_files(&files, "stardew", &index);
        assert_eq!(ranked.len(), MAX_SEARCH_RESULTS);
        assert_eq!(ranked[0].name, "stardew 000.zip");
        assert_eq!(ranked[59].name, "stardew 059.zip");
        assert!(ranked.iter().all(|row| row.game_name.is_none()));
    }

    #[test]
    fn test_rank_files_tie_break_on_filename() {
        let index = CatalogIndex::default();
        // ids run opposite to the filenames so only the filename can order them
        let b = FileCandidate::new("a-id", "Stardew B.zip");
        let a = FileCandidate::new("z-id", "Stardew A.zip");
        assert_eq!(
            score_file("stardew", &a, &index).score,
            score_file("stardew", &b, &index).score
        );

        for files in [vec![a.clone(), b.clone()], vec![b.clone(), a.clone()]] {
            for _ in 0..3 {
                let ranked = rank_files(&files, "stardew", &index);
                let names: Vec<&str> = ranked.iter().map(|row| row.name.as_str()).collect();
                assert_eq!(names, vec!["Stardew A.zip", "Stardew B.zip"]);
            }
        }
    }

    #[test]
    fn test_rank_files_by_app_id() {
        let index = CatalogIndex::new(&catalog());
        let files = vec![
            FileCandidate::new("a", "892970.zip"),
            FileCandidate::new("b", "548430.zip"),
        ];
        let ranked = rank_files(&files, "892970", &index);
        assert_eq!(ranked[0].id, "a");
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_score_file_weighting() {
        let index = CatalogIndex::new(&catalog());
        let file = FileCandidate::new("f1", "427520.zip");
        let scored = score_file("factorio", &file, &index);
        let expected = round_half_up(score_text("factorio", "Factorio") as f64 * 1.25
            + score_text("factorio", "427520.zip") as f64 * 0.65);
        assert_eq!(scored.score, expected);
        assert_eq!(scored.game_name, "Factorio");
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.6), -3);
        assert_eq!(round_half_up(10.0), 10);
    }

    #[test]
    fn test_catalog_index_last_wins() {
        let index = CatalogIndex::new(&[
            CatalogEntry::new("Old Name", "1"),
            CatalogEntry::new("New Name", "1"),
        ]);
        assert_eq!(index.get("1"), Some("New Name"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_resolve_file_id() {
        let files = vec![
            FileCandidate::new("drive-abc", "427520.zip"),
            FileCandidate::new("drive-def", "Valheim 892970.zip"),
        ];
        assert_eq!(resolve_file_id(&files, "drive-abc").as_deref(), Some("drive-abc"));
        assert_eq!(resolve_file_id(&files, "892970").as_deref(), Some("drive-def"));
        assert_eq!(resolve_file_id(&files, "nope"), None);
        assert_eq!(resolve_file_id(&files, ""), None);
        assert_eq!(find_file_by_app_id(&files, " 427520 ").map(|f| f.id.as_str()), Some("drive-abc"));
    }
}
