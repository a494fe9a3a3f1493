use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Deserialize byte size from string or int (the file store reports sizes as strings)
fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SizeValue {
        Int(u64),
        String(String),
        Null,
    }

    match SizeValue::deserialize(deserializer)? {
        SizeValue::Int(i) => Ok(Some(i)),
        SizeValue::String(s) if s.trim().is_empty() => Ok(None),
        SizeValue::String(s) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| Error::custom(format!("Invalid size string: {}", s))),
        SizeValue::Null => Ok(None),
    }
}

/// One item listed by the remote file store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileCandidate {
    /// Opaque file id
    pub id: String,

    /// Raw filename
    #[serde(default)]
    pub name: String,

    /// Size in bytes
    #[serde(default, deserialize_with = "deserialize_size")]
    pub size: Option<u64>,

    /// Last modification time
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
}

impl FileCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size: None,
            modified_time: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}
