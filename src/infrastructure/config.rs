use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::{Distance, DomainError, SearchParams, DEFAULT_HNSW_EF};

pub const CONFIG_PATH_VAR: &str = "SEMSEARCH_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
    pub collection: CollectionConfig,
    pub search: SearchConfig,
    pub ingest: IngestConfig,
    pub corpus: CorpusConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Qdrant,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    #[default]
    Local,
    OpenAi,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingBackend,
    pub model: String,
    pub dimension: usize,
    pub show_download_progress: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub name: String,
    pub distance: Distance,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub top_k: usize,
    pub hnsw_ef: Option<u64>,
    pub exact: bool,
}

impl SearchConfig {
    pub fn params(&self) -> SearchParams {
        SearchParams {
            hnsw_ef: self.hnsw_ef,
            exact: self.exact,
        }
    }
}

/// What happens to a batch when one of its items fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and keep going.
    #[default]
    Isolate,
    /// Stop at the first failure and return it.
    Abort,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Maximum in-flight ingestions. 0 means unbounded.
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// YAML or JSON file holding an array of documents.
    pub documents: Option<PathBuf>,
    /// Queries to run after ingestion. Empty means the built-in demo queries.
    pub queries: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Qdrant,
            url: "http://localhost:6334".to_string(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingBackend::Local,
            model: "all-MiniLM-L6-v2".to_string(),
            dimension: 384,
            show_download_progress: true,
        }
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: "astronomy".to_string(),
            distance: Distance::Dot,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            hnsw_ef: Some(DEFAULT_HNSW_EF),
            exact: false,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            failure_policy: FailurePolicy::Isolate,
        }
    }
}

impl Config {
    /// Defaults, then the YAML file named by `SEMSEARCH_CONFIG`, then
    /// individual environment overrides.
    pub fn load() -> Result<Self, DomainError> {
        let mut config = match std::env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, DomainError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DomainError::config(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&raw).map_err(|e| DomainError::config(format!("{}: {e}", path.display())))
    }

    pub fn from_yaml(raw: &str) -> Result<Self, DomainError> {
        serde_yaml::from_str(raw).map_err(|e| DomainError::config(e.to_string()))
    }

    /// Overrides fields from variables returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("QDRANT_URL") {
            self.store.url = url;
        }
        if let Some(backend) = lookup("SEMSEARCH_STORE") {
            self.store.backend = match backend.to_ascii_lowercase().as_str() {
                "qdrant" => StoreBackend::Qdrant,
                "memory" => StoreBackend::Memory,
                other => {
                    return Err(DomainError::config(format!(
                        "SEMSEARCH_STORE: unknown backend '{other}'"
                    )))
                }
            };
        }
        if let Some(name) = lookup("SEMSEARCH_COLLECTION") {
            self.collection.name = name;
        }
        if let Some(top_k) = lookup("SEMSEARCH_TOP_K") {
            self.search.top_k = top_k
                .parse()
                .map_err(|e| DomainError::config(format!("SEMSEARCH_TOP_K: {e}")))?;
        }
        if let Some(path) = lookup("SEMSEARCH_DOCUMENTS") {
            self.corpus.documents = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.collection.name.trim().is_empty() {
            return Err(DomainError::config("collection.name must not be empty"));
        }
        if self.search.top_k == 0 {
            return Err(DomainError::config("search.top_k must be at least 1"));
        }
        if self.embedding.dimension == 0 {
            return Err(DomainError::config("embedding.dimension must be positive"));
        }
        Ok(())
    }
}
