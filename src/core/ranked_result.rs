use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{default_header_art, CatalogEntry, FileCandidate, MappingRecord, StoreApp};
use crate::ranking::extract_app_id;

/// Public result row returned to callers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RankedResult {
    /// File id for listing rows, app id otherwise
    pub id: String,

    #[serde(default)]
    pub app_id: Option<String>,

    /// Display name (filename for listing rows)
    pub name: String,

    /// Catalog name the row was matched to
    #[serde(default)]
    pub game_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,
}

impl RankedResult {
    /// Trimmed app id, if any
    pub fn app_id_key(&self) -> Option<&str> {
        self.app_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Placeholder row for a bare numeric id the storefront may or may not know.
    pub fn placeholder(app_id: &str, details: Option<&StoreApp>) -> Self {
        let name = details
            .map(|d| d.name.clone())
            .filter(|n| !n.is_empty());
        Self {
            id: app_id.to_string(),
            app_id: Some(app_id.to_string()),
            name: name.clone().unwrap_or_else(|| format!("App {}", app_id)),
            game_name: name,
            size: None,
            modified_time: None,
            art: Some(
                details
                    .and_then(|d| d.header_image.clone())
                    .unwrap_or_else(|| default_header_art(app_id)),
            ),
            file_id: None,
        }
    }
}

/// Local catalog row: `{id, appId, name}` only, no matched game name.
impl From<CatalogEntry> for RankedResult {
    fn from(entry: CatalogEntry) -> Self {
        Self {
            id: entry.app_id.clone(),
            app_id: Some(entry.app_id),
            game_name: None,
            name: entry.name,
            size: None,
            modified_time: None,
            art: None,
            file_id: None,
        }
    }
}

impl From<StoreApp> for RankedResult {
    fn from(app: StoreApp) -> Self {
        Self {
            id: app.app_id.clone(),
            art: Some(default_header_art(&app.app_id)),
            app_id: Some(app.app_id),
            game_name: Some(app.name.clone()),
            name: app.name,
            size: None,
            modified_time: None,
            file_id: None,
        }
    }
}

impl From<MappingRecord> for RankedResult {
    fn from(record: MappingRecord) -> Self {
        let art = record
            .art
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| default_header_art(&record.app_id));
        Self {
            id: record
                .file_id
                .clone()
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| record.app_id.clone()),
            app_id: Some(record.app_id),
            game_name: Some(record.name.clone()),
            name: record.name,
            size: record.size_bytes.filter(|s| *s > 0),
            modified_time: None,
            art: Some(art),
            file_id: record.file_id.filter(|f| !f.is_empty()),
        }
    }
}

/// Any searchable object, before it is flattened into a [`RankedResult`].
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    Catalog(CatalogEntry),
    File(FileCandidate),
    Mapping(MappingRecord),
}

impl Candidate {
    /// Text the candidate is primarily matched on
    pub fn name(&self) -> &str {
        match self {
            Candidate::Catalog(entry) => &entry.name,
            Candidate::File(file) => &file.name,
            Candidate::Mapping(record) => &record.name,
        }
    }

    /// Known or derived app id
    pub fn app_id(&self) -> Option<String> {
        match self {
            Candidate::Catalog(entry) => Some(entry.app_id.clone()),
            Candidate::File(file) => extract_app_id(&file.name),
            Candidate::Mapping(record) => Some(record.app_id.clone()),
        }
    }

    pub fn into_result(self) -> RankedResult {
        match self {
            Candidate::Catalog(entry) => entry.into(),
            Candidate::Mapping(record) => record.into(),
            Candidate::File(file) => RankedResult {
                app_id: extract_app_id(&file.name),
                id: file.id,
                name: file.name,
                game_name: None,
                size: file.size,
                modified_time: file.modified_time,
                art: None,
                file_id: None,
            },
        }
    }
}

/// Candidate with its ranking score, valid for one ranking pass
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub subject: Candidate,
    pub derived_app_id: Option<String>,
    /// Catalog name matched through the derived app id, empty if none
    pub game_name: String,
    pub score: i64,
}

impl ScoredCandidate {
    pub fn new(subject: Candidate, derived_app_id: Option<String>, score: i64) -> Self {
        Self {
            subject,
            derived_app_id,
            game_name: String::new(),
            score,
        }
    }

    /// Name used to break score ties
    pub fn sort_name(&self) -> &str {
        if self.game_name.is_empty() {
            self.subject.name()
        } else {
            &self.game_name
        }
    }

    /// Flatten into the output row; the matched game name is only kept when
    /// an app id was derived for the candidate.
    pub fn into_result(self) -> RankedResult {
        let mut result = self.subject.into_result();
        if let Some(app_id) = self.derived_app_id {
            if !self.game_name.is_empty() {
                result.game_name = Some(self.game_name);
            }
            result.app_id = Some(app_id);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_conversion_prefers_file_id() {
        let record = MappingRecord::new("427520", "Factorio").with_file_id("drive-1");
        let result: RankedResult = record.into();
        assert_eq!(result.id, "drive-1");
        assert_eq!(result.file_id.as_deref(), Some("drive-1"));
        assert_eq!(result.game_name.as_deref(), Some("Factorio"));
        assert!(result.art.unwrap().contains("/427520/"));
    }

    #[test]
    fn test_mapping_conversion_without_file() {
        let result: RankedResult = MappingRecord::new("892970", "Valheim").into();
        assert_eq!(result.id, "892970");
        assert!(result.file_id.is_none());
    }

    #[test]
    fn test_file_candidate_into_result() {
        let file = FileCandidate::new("f9", "413150 Stardew.zip").with_size(10);
        let result = Candidate::File(file).into_result();
        assert_eq!(result.id, "f9");
        assert_eq!(result.app_id.as_deref(), Some("413150"));
        assert_eq!(result.game_name, None);
        assert_eq!(result.size, Some(10));
    }

    #[test]
    fn test_placeholder_unknown_app() {
        let result = RankedResult::placeholder("999999", None);
        assert_eq!(result.name, "App 999999");
        assert_eq!(result.game_name, None);
        assert!(result.art.is_some());
    }

    #[test]
    fn test_serialized_shape() {
        let file = FileCandidate::new("f1", "readme.txt");
        let json = serde_json::to_value(Candidate::File(file).into_result()).unwrap();
        assert!(json.get("appId").unwrap().is_null());
        assert!(json.get("gameName").unwrap().is_null());
        assert!(json.get("art").is_none());
    }

    #[test]
    fn test_catalog_row_has_no_game_name() {
        let result: RankedResult = CatalogEntry::new("Factorio", "427520").into();
        assert_eq!(result.id, "427520");
        assert_eq!(result.name, "Factorio");
        assert_eq!(result.game_name, None);
        assert!(result.art.is_none());
    }

    #[test]
    fn test_app_id_key_trims() {
        let mut result: RankedResult = CatalogEntry::new("Factorio", " 427520 ").into();
        assert_eq!(result.app_id_key(), Some("427520"));
        result.app_id = Some("   ".to_string());
        assert_eq!(result.app_id_key(), None);
    }
}
