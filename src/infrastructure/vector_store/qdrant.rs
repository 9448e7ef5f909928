use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, CountPointsBuilder, CreateCollectionBuilder,
    Distance as QdrantDistance, PointId, PointStruct, ScoredPoint, SearchParamsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant, QdrantError};
use tracing::instrument;

use crate::domain::{
    ports::VectorStore, CollectionSchema, Distance, DocumentId, DocumentPayload, DomainError,
    Embedding, Point, SearchParams, SearchResult,
};

pub struct QdrantVectorStore {
    client: Qdrant,
    url: String,
}

impl QdrantVectorStore {
    /// Builds a gRPC client. No request is made until the first operation.
    pub fn new(url: &str) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::unavailable(format!("{url}: {e}")))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn health_check(&self) -> Result<String, DomainError> {
        self.client
            .health_check()
            .await
            .map(|reply| reply.version)
            .map_err(|e| DomainError::unavailable(format!("{}: {e}", self.url)))
    }

    /// Maps a failed request to `StoreUnavailable` when the server no longer
    /// answers a health check, otherwise to the operation's own error kind.
    async fn classify(
        &self,
        err: QdrantError,
        context: String,
        kind: fn(String) -> DomainError,
    ) -> DomainError {
        let message = format!("{context}: {err}");
        match self.health_check().await {
            Ok(_) => kind(message),
            Err(_) => DomainError::unavailable(message),
        }
    }

    /// Existence checks and drops never carry a schema, so a failure there
    /// means the store is not serving the collection.
    fn lifecycle_error(
        action: &str,
        collection: &str,
        err: impl std::fmt::Display,
    ) -> DomainError {
        DomainError::unavailable(format!("{action} collection '{collection}': {err}"))
    }

    fn to_qdrant_distance(distance: Distance) -> QdrantDistance {
        match distance {
            Distance::Dot => QdrantDistance::Dot,
            Distance::Cosine => QdrantDistance::Cosine,
            Distance::Euclid => QdrantDistance::Euclid,
            Distance::Manhattan => QdrantDistance::Manhattan,
        }
    }

    fn to_point_id(id: DocumentId) -> PointId {
        match id {
            DocumentId::Num(n) => n.into(),
            DocumentId::Uuid(u) => u.to_string().into(),
        }
    }

    fn from_point_id(id: PointId) -> Option<DocumentId> {
        match id.point_id_options? {
            PointIdOptions::Num(n) => Some(DocumentId::Num(n)),
            PointIdOptions::Uuid(s) => s.parse().ok().map(DocumentId::Uuid),
        }
    }

    fn to_search_result(point: ScoredPoint) -> Option<SearchResult> {
        let id = Self::from_point_id(point.id?)?;

        let json = serde_json::Value::Object(
            point
                .payload
                .into_iter()
                .map(|(key, value)| (key, value.into_json()))
                .collect(),
        );
        let payload: DocumentPayload = match serde_json::from_value(json) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(point_id = %id, error = %e, "skipping point with malformed payload");
                return None;
            }
        };

        Some(SearchResult {
            id,
            score: point.score,
            payload,
        })
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    #[instrument(skip(self, schema), fields(collection = %schema.name))]
    async fn recreate_collection(&self, schema: &CollectionSchema) -> Result<(), DomainError> {
        schema.validate()?;
        self.health_check().await?;

        let exists = self
            .client
            .collection_exists(schema.name.as_str())
            .await
            .map_err(|e| Self::lifecycle_error("checking", &schema.name, e))?;

        if exists {
            self.client
                .delete_collection(schema.name.as_str())
                .await
                .map_err(|e| Self::lifecycle_error("dropping", &schema.name, e))?;
            tracing::debug!("dropped existing collection");
        }

        let create = CreateCollectionBuilder::new(&schema.name).vectors_config(
            VectorParamsBuilder::new(
                schema.vector_size as u64,
                Self::to_qdrant_distance(schema.distance),
            ),
        );

        if let Err(e) = self.client.create_collection(create).await {
            return Err(self
                .classify(
                    e,
                    format!("creating collection '{}'", schema.name),
                    DomainError::InvalidSchema,
                )
                .await);
        }

        Ok(())
    }

    #[instrument(skip(self, point), fields(point_id = %point.id))]
    async fn upsert(&self, collection: &str, point: Point) -> Result<(), DomainError> {
        let json = serde_json::to_value(&point.payload)
            .map_err(|e| DomainError::upsert(format!("point {}: {e}", point.id)))?;
        let payload: Payload = json.try_into().map_err(|_| {
            DomainError::upsert(format!("point {}: payload is not an object", point.id))
        })?;

        let id = point.id;
        let record = PointStruct::new(Self::to_point_id(id), point.vector.into_inner(), payload);

        if let Err(e) = self
            .client
            .upsert_points(UpsertPointsBuilder::new(collection, vec![record]).wait(true))
            .await
        {
            return Err(self
                .classify(
                    e,
                    format!("point {id} into '{collection}'"),
                    DomainError::Upsert,
                )
                .await);
        }

        Ok(())
    }

    #[instrument(skip(self, query))]
    async fn search(
        &self,
        collection: &str,
        query: &Embedding,
        limit: usize,
        params: SearchParams,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let mut search_params = SearchParamsBuilder::default().exact(params.exact);
        if let Some(ef) = params.hnsw_ef {
            search_params = search_params.hnsw_ef(ef);
        }

        let request =
            SearchPointsBuilder::new(collection, query.as_slice().to_vec(), limit as u64)
                .with_payload(true)
                .params(search_params);

        let response = match self.client.search_points(request).await {
            Ok(response) => response,
            Err(e) => {
                return Err(self
                    .classify(e, format!("search in '{collection}'"), DomainError::Query)
                    .await)
            }
        };

        Ok(response
            .result
            .into_iter()
            .filter_map(Self::to_search_result)
            .collect())
    }

    async fn count(&self, collection: &str) -> Result<u64, DomainError> {
        match self
            .client
            .count(CountPointsBuilder::new(collection).exact(true))
            .await
        {
            Ok(response) => Ok(response.result.map(|r| r.count).unwrap_or(0)),
            Err(e) => Err(self
                .classify(e, format!("count in '{collection}'"), DomainError::Query)
                .await),
        }
    }
}
