use std::sync::Arc;

use crate::application::{CollectionManager, DocumentIngestor, Pipeline, QueryExecutor};
use crate::domain::{
    ports::{EmbeddingProvider, VectorStore},
    CollectionSchema, Document, DomainError,
};
use crate::infrastructure::config::{Config, EmbeddingBackend, StoreBackend};
use crate::infrastructure::corpus;
use crate::infrastructure::embedding::{LocalEmbedding, OpenAiEmbedding};
use crate::infrastructure::vector_store::{InMemoryVectorStore, QdrantVectorStore};

/// Store client and embedding model, built once and shared by every service.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub embedding: Arc<dyn EmbeddingProvider>,
    pub store: Arc<dyn VectorStore>,
}

impl AppContext {
    pub async fn from_config(config: Config) -> Result<Self, DomainError> {
        let embedding: Arc<dyn EmbeddingProvider> = match config.embedding.provider {
            EmbeddingBackend::Local => Arc::new(LocalEmbedding::from_config(&config.embedding)?),
            EmbeddingBackend::OpenAi => Arc::new(OpenAiEmbedding::from_config(&config.embedding)),
        };

        let store: Arc<dyn VectorStore> = match config.store.backend {
            StoreBackend::Qdrant => {
                let qdrant = QdrantVectorStore::new(&config.store.url)?;
                match qdrant.health_check().await {
                    Ok(version) => {
                        tracing::info!(url = %qdrant.url(), %version, "connected to qdrant")
                    }
                    Err(e) => tracing::warn!(error = %e, "qdrant health check failed"),
                }
                Arc::new(qdrant)
            }
            StoreBackend::Memory => {
                tracing::info!("using in-memory vector store");
                Arc::new(InMemoryVectorStore::new())
            }
        };

        tracing::info!(
            model = embedding.model_name(),
            dimension = embedding.dimension(),
            "embedding provider ready"
        );

        Ok(Self::new(Arc::new(config), embedding, store))
    }

    pub fn new(
        config: Arc<Config>,
        embedding: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            config,
            embedding,
            store,
        }
    }

    /// Collection schema sized to whatever the embedding provider produces.
    pub fn schema(&self) -> CollectionSchema {
        CollectionSchema::new(self.config.collection.name.clone())
            .with_vector_size(self.embedding.dimension())
            .with_distance(self.config.collection.distance)
    }

    pub fn documents(&self) -> Result<Vec<Document>, DomainError> {
        match &self.config.corpus.documents {
            Some(path) => corpus::load_documents(path),
            None => Ok(corpus::astronomy_documents()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        if self.config.corpus.queries.is_empty() {
            corpus::demo_queries()
        } else {
            self.config.corpus.queries.clone()
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            CollectionManager::new(self.store.clone()),
            DocumentIngestor::from_config(
                self.embedding.clone(),
                self.store.clone(),
                &self.config.ingest,
            ),
            QueryExecutor::new(self.embedding.clone(), self.store.clone())
                .with_top_k(self.config.search.top_k)
                .with_params(self.config.search.params()),
        )
    }

    /// Releases the store client and the model. Outstanding clones keep
    /// their own handles alive.
    pub fn shutdown(self) {
        tracing::info!(
            collection = %self.config.collection.name,
            model = self.embedding.model_name(),
            "shutting down"
        );
        drop(self.store);
        drop(self.embedding);
    }
}
