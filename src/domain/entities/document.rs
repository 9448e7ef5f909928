use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{DomainError, Embedding};

pub const MAX_METADATA_ENTRIES: usize = 64;
pub const MAX_METADATA_BYTES: usize = 16 * 1024;
pub const CREATED_AT_KEY: &str = "createdAt";

/// Point identifier. The vector store only accepts unsigned integers and UUIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Num(u64),
    Uuid(Uuid),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

impl From<u64> for DocumentId {
    fn from(id: u64) -> Self {
        Self::Num(id)
    }
}

impl From<Uuid> for DocumentId {
    fn from(id: Uuid) -> Self {
        Self::Uuid(id)
    }
}

/// Free-form document metadata.
///
/// Keys map to arbitrary JSON values, bounded to [`MAX_METADATA_ENTRIES`] entries
/// and [`MAX_METADATA_BYTES`] of serialized JSON. Timestamps are stored as
/// RFC 3339 strings in UTC so they survive a round trip through any store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, serde_json::Value>")]
pub struct Metadata(BTreeMap<String, serde_json::Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata carrying only a `createdAt` timestamp.
    pub fn created_now() -> Self {
        let mut metadata = Self::new();
        metadata.0.insert(
            CREATED_AT_KEY.to_string(),
            serde_json::Value::String(format_timestamp(Utc::now())),
        );
        metadata
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Result<(), DomainError> {
        let key = key.into();
        let previous = self.0.insert(key.clone(), value.into());

        if let Err(e) = self.validate() {
            match previous {
                Some(old) => self.0.insert(key, old),
                None => self.0.remove(&key),
            };
            return Err(e);
        }
        Ok(())
    }

    pub fn with(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Result<Self, DomainError> {
        self.insert(key, value)?;
        Ok(self)
    }

    pub fn with_timestamp(
        self,
        key: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        self.with(key, format_timestamp(at))
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn get_timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.0.get(key)?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.get_timestamp(CREATED_AT_KEY)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.0.len() > MAX_METADATA_ENTRIES {
            return Err(DomainError::upsert(format!(
                "metadata has {} entries, limit is {MAX_METADATA_ENTRIES}",
                self.0.len()
            )));
        }
        let size = serde_json::to_vec(&self.0)
            .map_err(|e| DomainError::upsert(e.to_string()))?
            .len();
        if size > MAX_METADATA_BYTES {
            return Err(DomainError::upsert(format!(
                "metadata is {size} bytes, limit is {MAX_METADATA_BYTES}"
            )));
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<String, serde_json::Value>> for Metadata {
    type Error = DomainError;

    fn try_from(map: BTreeMap<String, serde_json::Value>) -> Result<Self, Self::Error> {
        let metadata = Self(map);
        metadata.validate()?;
        Ok(metadata)
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub text: String,
    #[serde(default = "Metadata::created_now")]
    pub metadata: Metadata,
}

impl Document {
    pub fn new(
        id: impl Into<DocumentId>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            text: text.into(),
            metadata: Metadata::created_now(),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn payload(&self) -> DocumentPayload {
        DocumentPayload {
            text: self.text.clone(),
            title: self.title.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

/// What the store keeps next to each vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPayload {
    pub text: String,
    pub title: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: DocumentId,
    pub vector: Embedding,
    pub payload: DocumentPayload,
}

impl Point {
    pub fn from_document(document: &Document, vector: Embedding) -> Self {
        Self {
            id: document.id,
            vector,
            payload: document.payload(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: DocumentId,
    pub score: f32,
    pub payload: DocumentPayload,
}
