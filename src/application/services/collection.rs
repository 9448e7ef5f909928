use std::sync::Arc;
use tracing::instrument;

use crate::domain::{ports::VectorStore, CollectionSchema, Distance, DomainError};

/// Owns collection lifecycle. Recreation is destructive: every point in the
/// previous collection is gone once it returns.
pub struct CollectionManager {
    store: Arc<dyn VectorStore>,
}

impl CollectionManager {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    pub async fn recreate_collection(
        &self,
        name: &str,
        vector_size: usize,
        distance: Distance,
    ) -> Result<(), DomainError> {
        let schema = CollectionSchema::new(name)
            .with_vector_size(vector_size)
            .with_distance(distance);
        self.recreate(&schema).await
    }

    #[instrument(
        skip(self, schema),
        fields(
            collection = %schema.name,
            vector_size = schema.vector_size,
            distance = %schema.distance
        )
    )]
    pub async fn recreate(&self, schema: &CollectionSchema) -> Result<(), DomainError> {
        schema.validate()?;

        tracing::info!("creating collection");
        if let Err(e) = self.store.recreate_collection(schema).await {
            tracing::error!(error = %e, kind = e.kind(), "failed to create collection");
            return Err(e);
        }
        tracing::info!("collection created");

        Ok(())
    }

    pub async fn count(&self, name: &str) -> Result<u64, DomainError> {
        self.store.count(name).await
    }
}
