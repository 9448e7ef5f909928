mod collection;
mod document;
mod embedding;

pub use collection::{
    CollectionSchema, Distance, SearchParams, DEFAULT_HNSW_EF, DEFAULT_VECTOR_SIZE,
};
pub use document::{
    Document, DocumentId, DocumentPayload, Metadata, Point, SearchResult, CREATED_AT_KEY,
    MAX_METADATA_BYTES, MAX_METADATA_ENTRIES,
};
pub use embedding::{Embedding, UNIT_NORM_TOLERANCE};
