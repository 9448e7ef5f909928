use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingProvider, VectorStore},
    DomainError, SearchParams, SearchResult,
};

pub struct QueryExecutor {
    embedding: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    default_top_k: usize,
    params: SearchParams,
}

impl QueryExecutor {
    pub fn new(embedding: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedding,
            store,
            default_top_k: 1,
            params: SearchParams::default(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = params;
        self
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    pub async fn search(
        &self,
        collection: &str,
        query: &str,
    ) -> Result<Vec<SearchResult>, DomainError> {
        self.search_top_k(collection, query, self.default_top_k).await
    }

    /// Embeds `query` with the ingestion model and returns at most `top_k`
    /// matches, best first.
    #[instrument(skip(self))]
    pub async fn search_top_k(
        &self,
        collection: &str,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::query(format!(
                "empty query against '{collection}'"
            )));
        }
        if top_k == 0 {
            return Err(DomainError::query("top_k must be at least 1"));
        }

        let embedding = self.embedding.embed(query).await?;
        let results = self
            .store
            .search(collection, &embedding, top_k, self.params)
            .await?;

        tracing::debug!(matches = results.len(), "search finished");
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::DocumentIngestor;
    use crate::domain::{CollectionSchema, Document, DocumentId};
    use crate::infrastructure::InMemoryVectorStore;
    use crate::testing::{HashingEmbedding, TEST_DIMENSION};

    async fn populated(n: u64) -> (Arc<HashingEmbedding>, Arc<InMemoryVectorStore>) {
        let embedding = Arc::new(HashingEmbedding::new());
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .recreate_collection(&CollectionSchema::new("c").with_vector_size(TEST_DIMENSION))
            .await
            .unwrap();

        let docs: Vec<Document> = (1..=n)
            .map(|id| {
                Document::new(
                    id,
                    format!("title {id}"),
                    format!("fact {id} about planet {} and star {}", id * 7, id * 13),
                )
            })
            .collect();
        DocumentIngestor::new(embedding.clone(), store.clone())
            .ingest_all("c", &docs)
            .await
            .unwrap();

        (embedding, store)
    }

    #[tokio::test]
    async fn test_exact_text_ranks_itself_first() {
        let (embedding, store) = populated(6).await;
        let executor = QueryExecutor::new(embedding, store).with_top_k(3);

        for id in 1..=6_u64 {
            let text = format!("fact {id} about planet {} and star {}", id * 7, id * 13);
            let results = executor.search("c", &text).await.unwrap();
            assert_eq!(results[0].id, DocumentId::Num(id));
            assert!((results[0].score - 1.0).abs() < 1e-4);
        }
    }

    #[tokio::test]
    async fn test_returns_exactly_k_in_score_order() {
        let (embedding, store) = populated(6).await;
        let executor = QueryExecutor::new(embedding, store);

        let results = executor
            .search_top_k("c", "planet and star", 4)
            .await
            .unwrap();

        assert_eq!(results.len(), 4);
        assert!(results.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_returns_all_when_fewer_than_k() {
        let (embedding, store) = populated(2).await;
        let executor = QueryExecutor::new(embedding, store);

        let results = executor.search_top_k("c", "planet", 10).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_collection_returns_nothing() {
        let (embedding, store) = populated(0).await;
        let executor = QueryExecutor::new(embedding, store);

        let results = executor.search_top_k("c", "planet", 3).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_default_top_k_is_one() {
        let (embedding, store) = populated(3).await;
        let executor = QueryExecutor::new(embedding, store);

        assert_eq!(executor.default_top_k(), 1);
        assert_eq!(executor.search("c", "planet").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_queries() {
        let (embedding, store) = populated(1).await;
        let executor = QueryExecutor::new(embedding, store);

        let err = executor.search_top_k("c", "  ", 3).await.unwrap_err();
        assert!(matches!(err, DomainError::Query(_)));

        let err = executor.search_top_k("c", "planet", 0).await.unwrap_err();
        assert!(matches!(err, DomainError::Query(_)));

        let err = executor.search_top_k("missing", "planet", 1).await.unwrap_err();
        assert!(matches!(err, DomainError::Query(_)));
    }
}
