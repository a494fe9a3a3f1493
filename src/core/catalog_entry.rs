use serde::{Deserialize, Serialize};

/// Steam CDN header art for an app id.
pub fn default_header_art(app_id: &str) -> String {
    format!("https://cdn.akamai.steamstatic.com/steam/apps/{}/header.jpg", app_id)
}

/// Accept app ids written either as JSON strings or as JSON numbers.
fn deserialize_app_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AppIdValue {
        Int(u64),
        String(String),
        Null,
    }

    match AppIdValue::deserialize(deserializer)? {
        AppIdValue::Int(i) => Ok(i.to_string()),
        AppIdValue::String(s) => Ok(s),
        AppIdValue::Null => Ok(String::new()),
    }
}

/// One known game: display name plus its storefront app id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CatalogEntry {
    /// Game name
    #[serde(default)]
    pub name: String,

    /// Storefront app id (digit string)
    #[serde(rename = "appId", default, deserialize_with = "deserialize_app_id")]
    pub app_id: String,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            app_id: app_id.into(),
        }
    }

    /// Parse a JSON array of catalog entries
    pub fn list_from_json(json: &str) -> serde_json::Result<Vec<Self>> {
        serde_json::from_str(json)
    }
}

/// Administrator-curated override tying an app id to a hosted file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MappingRecord {
    #[serde(deserialize_with = "deserialize_app_id")]
    pub app_id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl MappingRecord {
    pub fn new(app_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            name: name.into(),
            file_id: None,
            art: None,
            size_bytes: None,
        }
    }

    pub fn with_file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = Some(file_id.into());
        self
    }
}

/// A title returned by the remote storefront search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoreApp {
    pub app_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_image: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,
}

impl StoreApp {
    pub fn new(app_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            name: name.into(),
            header_image: None,
            app_type: None,
        }
    }

    /// Header art, falling back to the CDN default for the app id
    pub fn art(&self) -> String {
        self.header_image
            .clone()
            .unwrap_or_else(|| default_header_art(&self.app_id))
    }
}

impl From<StoreApp> for CatalogEntry {
    fn from(app: StoreApp) -> Self {
        CatalogEntry::new(app.name, app.app_id)
    }
}

impl From<&StoreApp> for CatalogEntry {
    fn from(app: &StoreApp) -> Self {
        CatalogEntry::new(app.name.clone(), app.app_id.clone())
    }
}
