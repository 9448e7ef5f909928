pub mod config;
pub mod context;
pub mod corpus;
pub mod embedding;
pub mod vector_store;

pub use config::{Config, FailurePolicy};
pub use context::AppContext;
pub use embedding::{LocalEmbedding, OpenAiEmbedding};
pub use vector_store::{InMemoryVectorStore, QdrantVectorStore};
