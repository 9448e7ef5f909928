//! Deterministic stand-ins for the model and the store.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::{
    ports::{EmbeddingProvider, VectorStore},
    CollectionSchema, DocumentId, DomainError, Embedding, Point, SearchParams, SearchResult,
};
use crate::infrastructure::InMemoryVectorStore;

pub const TEST_DIMENSION: usize = 64;

/// Hashed bag-of-words embedding. Texts sharing words land close together.
pub struct HashingEmbedding {
    dimension: usize,
    calls: AtomicUsize,
}

impl HashingEmbedding {
    pub fn new() -> Self {
        Self {
            dimension: TEST_DIMENSION,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vectorize(&self, text: &str) -> Result<Embedding, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::encoding("empty text"));
        }

        let mut vector = vec![0.0_f32; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }
        Embedding::new(vector).normalized()
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedding {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vectorize(text)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        self.calls.fetch_add(texts.len(), Ordering::SeqCst);
        texts.iter().map(|t| self.vectorize(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "hashing-test"
    }
}

impl Default for HashingEmbedding {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory store that can refuse upserts for selected ids, every search,
/// or collection creation.
pub struct RejectingStore {
    inner: InMemoryVectorStore,
    rejected_ids: HashSet<DocumentId>,
    fail_search: bool,
    fail_recreate: bool,
}

impl RejectingStore {
    pub fn new() -> Self {
        Self {
            inner: InMemoryVectorStore::new(),
            rejected_ids: HashSet::new(),
            fail_search: false,
            fail_recreate: false,
        }
    }

    pub fn reject_id(mut self, id: impl Into<DocumentId>) -> Self {
        self.rejected_ids.insert(id.into());
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.fail_recreate = true;
        self
    }
}

#[async_trait]
impl VectorStore for RejectingStore {
    async fn recreate_collection(&self, schema: &CollectionSchema) -> Result<(), DomainError> {
        if self.fail_recreate {
            return Err(DomainError::unavailable("connection refused"));
        }
        self.inner.recreate_collection(schema).await
    }

    async fn upsert(&self, collection: &str, point: Point) -> Result<(), DomainError> {
        if self.rejected_ids.contains(&point.id) {
            return Err(DomainError::upsert(format!("point {} rejected", point.id)));
        }
        self.inner.upsert(collection, point).await
    }

    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
        params: SearchParams,
    ) -> Result<Vec<SearchResult>, DomainError> {
        if self.fail_search {
            return Err(DomainError::query("search rejected"));
        }
        self.inner.search(collection, query, limit, params).await
    }

    async fn count(&self, collection: &str) -> Result<u64, DomainError> {
        self.inner.count(collection).await
    }
}
