use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid collection schema: {0}")]
    InvalidSchema(String),

    #[error("Embedding model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Upsert error: {0}")]
    Upsert(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DomainError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::StoreUnavailable(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::InvalidSchema(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn upsert(msg: impl Into<String>) -> Self {
        Self::Upsert(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short machine-friendly name of the error kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::InvalidSchema(_) => "invalid_schema",
            Self::ModelUnavailable(_) => "model_unavailable",
            Self::Encoding(_) => "encoding",
            Self::Upsert(_) => "upsert",
            Self::Query(_) => "query",
            Self::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
