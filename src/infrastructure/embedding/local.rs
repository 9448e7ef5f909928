use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;
use tracing::instrument;

use super::{finalize, validate_texts};
use crate::domain::{ports::EmbeddingProvider, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

pub const DEFAULT_LOCAL_MODEL: &str = "all-MiniLM-L6-v2";

/// Sentence embeddings computed in-process with an ONNX model.
///
/// The model is downloaded and loaded on first use, then shared by every call
/// made through this instance. Inference runs on the blocking thread pool.
pub struct LocalEmbedding {
    model_name: String,
    model: EmbeddingModel,
    dimension: usize,
    show_download_progress: bool,
    loaded: OnceCell<Arc<Mutex<TextEmbedding>>>,
}

impl LocalEmbedding {
    pub fn new() -> Self {
        Self {
            model_name: DEFAULT_LOCAL_MODEL.to_string(),
            model: EmbeddingModel::AllMiniLML6V2,
            dimension: 384,
            show_download_progress: false,
            loaded: OnceCell::new(),
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, DomainError> {
        let (model, dimension) = resolve_model(&config.model).ok_or_else(|| {
            DomainError::model(format!("unsupported local model '{}'", config.model))
        })?;

        if config.dimension != dimension {
            return Err(DomainError::model(format!(
                "model '{}' produces {dimension}-dimensional vectors, configured {}",
                config.model, config.dimension
            )));
        }

        Ok(Self {
            model_name: config.model.clone(),
            model,
            dimension,
            show_download_progress: config.show_download_progress,
            loaded: OnceCell::new(),
        })
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.initialized()
    }

    async fn handle(&self) -> Result<Arc<Mutex<TextEmbedding>>, DomainError> {
        self.loaded
            .get_or_try_init(|| async {
                tracing::info!(model = %self.model_name, "loading embedding model");

                let options = InitOptions::new(self.model.clone())
                    .with_show_download_progress(self.show_download_progress);
                let name = self.model_name.clone();

                let model = tokio::task::spawn_blocking(move || TextEmbedding::try_new(options))
                    .await
                    .map_err(|e| DomainError::model(format!("{name}: {e}")))?
                    .map_err(|e| DomainError::model(format!("{name}: {e}")))?;

                tracing::info!(model = %self.model_name, "embedding model ready");
                Ok::<_, DomainError>(Arc::new(Mutex::new(model)))
            })
            .await
            .cloned()
    }
}

impl Default for LocalEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

/// Known models and their output dimension.
pub fn resolve_model(name: &str) -> Option<(EmbeddingModel, usize)> {
    let short = name.rsplit('/').next().unwrap_or(name);
    match short.to_ascii_lowercase().as_str() {
        "all-minilm-l6-v2" => Some((EmbeddingModel::AllMiniLML6V2, 384)),
        "all-minilm-l12-v2" => Some((EmbeddingModel::AllMiniLML12V2, 384)),
        "bge-small-en-v1.5" => Some((EmbeddingModel::BGESmallENV15, 384)),
        "bge-base-en-v1.5" => Some((EmbeddingModel::BGEBaseENV15, 768)),
        _ => None,
    }
}

#[async_trait]
impl EmbeddingProvider for LocalEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::encoding("no embedding returned"))
    }

    #[instrument(skip(self, texts), fields(model = %self.model_name, count = texts.len()))]
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        validate_texts(texts)?;

        let handle = self.handle().await?;
        let owned: Vec<String> = texts.iter().map(|t| t.to_string()).collect();

        let raw = tokio::task::spawn_blocking(move || {
            let model = handle
                .lock()
                .map_err(|_| DomainError::encoding("embedding model lock poisoned"))?;
            model
                .embed(owned, None)
                .map_err(|e| DomainError::encoding(e.to_string()))
        })
        .await
        .map_err(|e| DomainError::encoding(e.to_string()))??;

        raw.into_iter()
            .map(|vec| finalize(vec, self.dimension))
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
