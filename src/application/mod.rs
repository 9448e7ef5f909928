//! Application layer - Use cases and orchestration.
//!
//! Services here depend on the domain ports (`EmbeddingProvider`,
//! `VectorStore`) rather than on concrete adapters, so every use case runs
//! the same against Qdrant or the in-memory store.

pub mod services;

pub use services::{
    print_outcome, CollectionManager, DocumentIngestor, IngestFailure, IngestReport, Pipeline,
    PipelineReport, QueryExecutor, QueryOutcome,
};
