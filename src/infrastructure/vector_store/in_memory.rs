use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::{
    ports::VectorStore, CollectionSchema, DocumentId, DocumentPayload, DomainError, Embedding,
    Point, SearchParams, SearchResult,
};

struct MemoryCollection {
    schema: CollectionSchema,
    points: HashMap<DocumentId, (Embedding, DocumentPayload)>,
}

/// Brute-force store used for offline runs and tests. Every search is exact.
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn recreate_collection(&self, schema: &CollectionSchema) -> Result<(), DomainError> {
        schema.validate()?;

        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        collections.insert(
            schema.name.clone(),
            MemoryCollection {
                schema: schema.clone(),
                points: HashMap::new(),
            },
        );
        Ok(())
    }

    async fn upsert(&self, collection: &str, point: Point) -> Result<(), DomainError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        let target = collections.get_mut(collection).ok_or_else(|| {
            DomainError::upsert(format!("collection '{collection}' does not exist"))
        })?;

        if point.vector.dimension() != target.schema.vector_size {
            return Err(DomainError::upsert(format!(
                "point {} in '{collection}': expected dimension {}, got {}",
                point.id,
                target.schema.vector_size,
                point.vector.dimension()
            )));
        }

        target
            .points
            .insert(point.id, (point.vector, point.payload));
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
        params: SearchParams,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        let target = collections.get(collection).ok_or_else(|| {
            DomainError::query(format!("collection '{collection}' does not exist"))
        })?;

        if query.dimension() != target.schema.vector_size {
            return Err(DomainError::query(format!(
                "query in '{collection}': expected dimension {}, got {}",
                target.schema.vector_size,
                query.dimension()
            )));
        }

        tracing::trace!(
            hnsw_ef = ?params.hnsw_ef,
            exact = params.exact,
            "in-memory search is always exact"
        );

        let distance = target.schema.distance;
        let mut results: Vec<SearchResult> = target
            .points
            .iter()
            .map(|(id, (embedding, payload))| SearchResult {
                id: *id,
                score: distance.score(query, embedding),
                payload: payload.clone(),
            })
            .collect();

        results.sort_by(|a, b| distance.rank(a.score, b.score).then_with(|| a.id.cmp(&b.id)));
        results.truncate(limit);

        Ok(results)
    }

    async fn count(&self, collection: &str) -> Result<u64, DomainError> {
        let collections = self
            .collections
            .read()
            .map_err(|e| DomainError::unavailable(e.to_string()))?;

        collections
            .get(collection)
            .map(|c| c.points.len() as u64)
            .ok_or_else(|| DomainError::query(format!("collection '{collection}' does not exist")))
    }
}
