use crate::domain::{
    errors::DomainError, CollectionSchema, Embedding, Point, SearchParams, SearchResult,
};
use async_trait::async_trait;

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Drops any collection named `schema.name` and creates an empty one.
    async fn recreate_collection(&self, schema: &CollectionSchema) -> Result<(), DomainError>;
    /// Inserts the point, replacing any point with the same id.
    async fn upsert(&self, collection: &str, point: Point) -> Result<(), DomainError>;
    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
        params: SearchParams,
    ) -> Result<Vec<SearchResult>, DomainError>;
    async fn count(&self, collection: &str) -> Result<u64, DomainError>;
}
