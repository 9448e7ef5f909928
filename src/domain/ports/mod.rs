mod embedding;
mod vector_store;

pub use embedding::EmbeddingProvider;
pub use vector_store::VectorStore;
