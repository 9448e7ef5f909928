use crate::domain::{errors::DomainError, Embedding};
use async_trait::async_trait;

/// Turns text into unit-length dense vectors.
///
/// Implementations load their model at most once and reuse it for every call.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError>;
    fn dimension(&self) -> usize;
    fn model_name(&self) -> &str;
}
