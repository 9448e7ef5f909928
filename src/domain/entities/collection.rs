use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Embedding};

pub const DEFAULT_VECTOR_SIZE: usize = 384;
pub const DEFAULT_HNSW_EF: u64 = 128;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    #[default]
    Dot,
    Cosine,
    Euclid,
    Manhattan,
}

impl Distance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::Cosine => "cosine",
            Self::Euclid => "euclid",
            Self::Manhattan => "manhattan",
        }
    }

    /// Similarity metrics rank higher scores first, distance metrics lower.
    pub fn higher_is_better(&self) -> bool {
        matches!(self, Self::Dot | Self::Cosine)
    }

    pub fn score(&self, a: &Embedding, b: &Embedding) -> f32 {
        match self {
            Self::Dot => a.dot(b),
            Self::Cosine => a.cosine_similarity(b),
            Self::Euclid => a.euclidean_distance(b),
            Self::Manhattan => a.manhattan_distance(b),
        }
    }

    /// Orders two scores so that the better match sorts first.
    pub fn rank(&self, a: f32, b: f32) -> Ordering {
        let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        if self.higher_is_better() {
            ord.reverse()
        } else {
            ord
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Distance {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dot" => Ok(Self::Dot),
            "cosine" => Ok(Self::Cosine),
            "euclid" | "euclidean" => Ok(Self::Euclid),
            "manhattan" => Ok(Self::Manhattan),
            other => Err(DomainError::schema(format!("unknown distance metric '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    pub vector_size: usize,
    pub distance: Distance,
}

impl CollectionSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vector_size: DEFAULT_VECTOR_SIZE,
            distance: Distance::default(),
        }
    }

    pub fn with_vector_size(mut self, vector_size: usize) -> Self {
        self.vector_size = vector_size;
        self
    }

    pub fn with_distance(mut self, distance: Distance) -> Self {
        self.distance = distance;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::schema("collection name must not be empty"));
        }
        if self.vector_size == 0 {
            return Err(DomainError::schema(format!(
                "collection '{}': vector size must be positive",
                self.name
            )));
        }
        Ok(())
    }
}

/// Search quality knobs forwarded to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// HNSW exploration factor. Higher is more accurate and slower.
    pub hnsw_ef: Option<u64>,
    /// Bypass the index and scan every point.
    pub exact: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            hnsw_ef: Some(DEFAULT_HNSW_EF),
            exact: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_defaults() {
        let schema = CollectionSchema::new("astronomy");
        assert_eq!(schema.vector_size, 384);
        assert_eq!(schema.distance, Distance::Dot);
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_schema_validation() {
        let err = CollectionSchema::new("  ").validate().unwrap_err();
        assert!(matches!(err, DomainError::InvalidSchema(_)));

        let err = CollectionSchema::new("c")
            .with_vector_size(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidSchema(_)));
    }

    #[test]
    fn test_distance_parsing() {
        assert_eq!("Dot".parse::<Distance>().unwrap(), Distance::Dot);
        assert_eq!("euclidean".parse::<Distance>().unwrap(), Distance::Euclid);
        assert!("hamming".parse::<Distance>().is_err());
    }

    #[test]
    fn test_rank_direction() {
        assert_eq!(Distance::Dot.rank(0.9, 0.1), Ordering::Less);
        assert_eq!(Distance::Euclid.rank(0.9, 0.1), Ordering::Greater);
    }
}
