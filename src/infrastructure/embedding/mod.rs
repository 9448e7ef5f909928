mod local;
mod openai;

pub use local::{resolve_model, LocalEmbedding, DEFAULT_LOCAL_MODEL};
pub use openai::{OpenAiEmbedding, DEFAULT_OPENAI_MODEL, OPENAI_API_KEY_VAR};

use crate::domain::{DomainError, Embedding};

pub(crate) fn validate_texts(texts: &[&str]) -> Result<(), DomainError> {
    match texts.iter().position(|t| t.trim().is_empty()) {
        Some(index) => Err(DomainError::encoding(format!(
            "input {index} is empty; nothing to embed"
        ))),
        None => Ok(()),
    }
}

/// Normalizes a raw model output and checks it has the advertised size.
pub(crate) fn finalize(raw: Vec<f32>, dimension: usize) -> Result<Embedding, DomainError> {
    if raw.len() != dimension {
        return Err(DomainError::encoding(format!(
            "model returned {} dimensions, expected {dimension}",
            raw.len()
        )));
    }
    Embedding::new(raw).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_texts() {
        assert!(validate_texts(&["a", "b"]).is_ok());
        let err = validate_texts(&["a", " \n"]).unwrap_err();
        assert_eq!(err, DomainError::encoding("input 1 is empty; nothing to embed"));
    }

    #[test]
    fn test_finalize_checks_dimension_and_normalizes() {
        let emb = finalize(vec![0.0, 2.0], 2).unwrap();
        assert_eq!(emb.as_slice(), &[0.0, 1.0]);

        assert!(matches!(
            finalize(vec![1.0], 2).unwrap_err(),
            DomainError::Encoding(_)
        ));
    }
}
