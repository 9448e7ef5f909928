use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{EmbeddingProvider, VectorStore},
    Document, DocumentId, DomainError, Point,
};
use crate::infrastructure::config::{FailurePolicy, IngestConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct IngestFailure {
    pub id: DocumentId,
    pub error: DomainError,
}

/// Outcome of a batch ingestion. Ids appear in completion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub succeeded: Vec<DocumentId>,
    pub failed: Vec<IngestFailure>,
}

impl IngestReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct DocumentIngestor {
    embedding: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    concurrency: usize,
    policy: FailurePolicy,
}

impl DocumentIngestor {
    pub fn new(embedding: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        let defaults = IngestConfig::default();
        Self {
            embedding,
            store,
            concurrency: defaults.concurrency,
            policy: defaults.failure_policy,
        }
    }

    pub fn from_config(
        embedding: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        config: &IngestConfig,
    ) -> Self {
        Self {
            embedding,
            store,
            concurrency: config.concurrency,
            policy: config.failure_policy,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Embeds one document and upserts it. An existing point with the same id
    /// is replaced.
    #[instrument(skip(self, document), fields(document_id = %document.id))]
    pub async fn ingest(&self, collection: &str, document: &Document) -> Result<(), DomainError> {
        document.metadata.validate()?;

        let vector = self.embedding.embed(&document.text).await?;
        self.store
            .upsert(collection, Point::from_document(document, vector))
            .await?;

        tracing::info!("document uploaded");
        Ok(())
    }

    /// Ingests every document concurrently, at most `concurrency` at a time.
    ///
    /// With [`FailurePolicy::Isolate`] failures are logged and collected in the
    /// report. With [`FailurePolicy::Abort`] the first failure is returned and
    /// ingestions still in flight are dropped. Nothing is rolled back.
    #[instrument(skip(self, documents), fields(count = documents.len(), policy = ?self.policy))]
    pub async fn ingest_all(
        &self,
        collection: &str,
        documents: &[Document],
    ) -> Result<IngestReport, DomainError> {
        let limit = match self.concurrency {
            0 => documents.len().max(1),
            n => n,
        };

        let mut outcomes = stream::iter(documents)
            .map(|document| async move { (document.id, self.ingest(collection, document).await) })
            .buffer_unordered(limit);

        let mut report = IngestReport::default();
        while let Some((id, outcome)) = outcomes.next().await {
            match outcome {
                Ok(()) => report.succeeded.push(id),
                Err(error) => {
                    tracing::error!(
                        collection,
                        document_id = %id,
                        kind = error.kind(),
                        error = %error,
                        "failed to upload document"
                    );
                    if self.policy == FailurePolicy::Abort {
                        return Err(error);
                    }
                    report.failed.push(IngestFailure { id, error });
                }
            }
        }

        tracing::info!(
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "ingestion finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CollectionSchema, SearchParams};
    use crate::infrastructure::InMemoryVectorStore;
    use crate::testing::{HashingEmbedding, RejectingStore, TEST_DIMENSION};

    fn schema() -> CollectionSchema {
        CollectionSchema::new("docs").with_vector_size(TEST_DIMENSION)
    }

    fn docs(n: u64) -> Vec<Document> {
        (1..=n)
            .map(|id| Document::new(id, format!("doc {id}"), format!("document number {id}")))
            .collect()
    }

    #[tokio::test]
    async fn test_ingest_all_indexes_every_document() {
        let store = Arc::new(InMemoryVectorStore::new());
        store.recreate_collection(&schema()).await.unwrap();

        let ingestor = DocumentIngestor::new(Arc::new(HashingEmbedding::new()), store.clone())
            .with_concurrency(2);
        let report = ingestor.ingest_all("docs", &docs(5)).await.unwrap();

        assert!(report.is_complete());
        assert_eq!(report.total(), 5);
        let mut ids = report.succeeded.clone();
        ids.sort();
        assert_eq!(ids, (1..=5).map(DocumentId::Num).collect::<Vec<_>>());
        assert_eq!(store.count("docs").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_isolated_failure_does_not_stop_siblings() {
        let store = Arc::new(RejectingStore::new().reject_id(3_u64));
        store.recreate_collection(&schema()).await.unwrap();

        let ingestor = DocumentIngestor::new(Arc::new(HashingEmbedding::new()), store.clone())
            .with_concurrency(0);
        let report = ingestor.ingest_all("docs", &docs(5)).await.unwrap();

        assert_eq!(report.succeeded.len(), 4);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].id, DocumentId::Num(3));
        assert!(matches!(report.failed[0].error, DomainError::Upsert(_)));
        assert_eq!(store.count("docs").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_abort_policy_returns_first_failure() {
        let store = Arc::new(RejectingStore::new().reject_id(1_u64));
        store.recreate_collection(&schema()).await.unwrap();

        let ingestor = DocumentIngestor::new(Arc::new(HashingEmbedding::new()), store)
            .with_concurrency(1)
            .with_failure_policy(FailurePolicy::Abort);
        let err = ingestor.ingest_all("docs", &docs(3)).await.unwrap_err();

        assert!(matches!(err, DomainError::Upsert(_)));
    }

    #[tokio::test]
    async fn test_empty_text_is_encoding_failure() {
        let store = Arc::new(InMemoryVectorStore::new());
        store.recreate_collection(&schema()).await.unwrap();

        let ingestor = DocumentIngestor::new(Arc::new(HashingEmbedding::new()), store.clone());
        let blank = Document::new(9_u64, "blank", "   ");
        let report = ingestor.ingest_all("docs", &[blank]).await.unwrap();

        assert!(matches!(report.failed[0].error, DomainError::Encoding(_)));
        assert_eq!(store.count("docs").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_upsert_error() {
        let store = Arc::new(InMemoryVectorStore::new());
        store.recreate_collection(&schema()).await.unwrap();

        let ingestor = DocumentIngestor::new(
            Arc::new(HashingEmbedding::with_dimension(TEST_DIMENSION * 2)),
            store,
        );
        let err = ingestor
            .ingest("docs", &Document::new(1_u64, "a", "alpha"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Upsert(_)));
    }

    #[tokio::test]
    async fn test_reingest_replaces_payload() {
        let store = Arc::new(InMemoryVectorStore::new());
        store.recreate_collection(&schema()).await.unwrap();
        let embedding = Arc::new(HashingEmbedding::new());
        let ingestor = DocumentIngestor::new(embedding.clone(), store.clone());

        ingestor
            .ingest("docs", &Document::new(1_u64, "first", "apples and pears"))
            .await
            .unwrap();
        ingestor
            .ingest("docs", &Document::new(1_u64, "second", "rockets and comets"))
            .await
            .unwrap();

        let query = embedding.embed("apples and pears").await.unwrap();
        let results = store
            .search("docs", &query, 10, SearchParams::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].payload.title, "second");
        assert_eq!(results[0].payload.text, "rockets and comets");
    }
}
