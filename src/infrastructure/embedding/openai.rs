use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingsBuilder;
use rig::providers::openai;
use tokio::sync::OnceCell;
use tracing::instrument;

use super::{finalize, resolve_model, validate_texts};
use crate::domain::{ports::EmbeddingProvider, DomainError, Embedding};
use crate::infrastructure::config::EmbeddingConfig;

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-3-small";
const DEFAULT_OPENAI_DIMENSION: usize = 1536;

/// Remote embeddings through the OpenAI API.
///
/// The HTTP client is created on first use from `OPENAI_API_KEY` and reused.
pub struct OpenAiEmbedding {
    model: String,
    dimension: usize,
    client: OnceCell<openai::Client>,
}

impl OpenAiEmbedding {
    pub fn new() -> Self {
        Self {
            model: DEFAULT_OPENAI_MODEL.to_string(),
            dimension: DEFAULT_OPENAI_DIMENSION,
            client: OnceCell::new(),
        }
    }

    /// Local model names (the config default among them) are not served by
    /// OpenAI; those fall back to `text-embedding-3-small`.
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        if resolve_model(&config.model).is_some() {
            tracing::warn!(
                configured = %config.model,
                model = DEFAULT_OPENAI_MODEL,
                "local model configured for openai provider, using default"
            );
            return Self::new();
        }

        Self {
            model: config.model.clone(),
            dimension: config.dimension,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> Result<&openai::Client, DomainError> {
        self.client
            .get_or_try_init(|| async {
                if std::env::var(OPENAI_API_KEY_VAR).is_err() {
                    return Err(DomainError::model(format!(
                        "{}: {OPENAI_API_KEY_VAR} is not set",
                        self.model
                    )));
                }
                Ok(openai::Client::from_env())
            })
            .await
    }
}

impl Default for OpenAiEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::encoding("no embedding returned"))
    }

    #[instrument(skip(self, texts), fields(model = %self.model, count = texts.len()))]
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        validate_texts(texts)?;

        let client = self.client().await?;
        let model = client.embedding_model(&self.model);

        let mut builder = EmbeddingsBuilder::new(model);
        for text in texts {
            builder = builder
                .document(*text)
                .map_err(|e| DomainError::encoding(e.to_string()))?;
        }

        let embeddings = builder
            .build()
            .await
            .map_err(|e| DomainError::model(format!("{}: {e}", self.model)))?;

        embeddings
            .into_iter()
            .map(|(_doc, emb)| {
                let vec_f32: Vec<f32> = emb.first().vec.into_iter().map(|x| x as f32).collect();
                finalize(vec_f32, self.dimension)
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
