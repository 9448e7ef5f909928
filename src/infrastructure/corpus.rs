use std::path::Path;

use crate::domain::{Document, DomainError};

pub const DEMO_QUERIES: [&str; 3] = [
    "Explain the sun",
    "Is moon also a star?",
    "What is the rotation of Venus?",
];

/// The five astronomy facts used by the demo run.
pub fn astronomy_documents() -> Vec<Document> {
    vec![
        Document::new(
            1_u64,
            "The Sun is a Star",
            "Our sun, which is the center of our solar system, is actually a very average-sized \
             star among the billions of stars in the Milky Way galaxy.",
        ),
        Document::new(
            2_u64,
            "The Moon is Not a Star",
            "The Moon is Earth's only natural satellite and is the fifth largest moon in the \
             solar system.",
        ),
        Document::new(
            3_u64,
            "Venus Rotates Backwards",
            "Unlike most planets in our solar system, Venus rotates on its axis in the opposite \
             direction to its orbit around the Sun. This means that on Venus, the Sun would \
             appear to rise in the west and set in the east.",
        ),
        Document::new(
            4_u64,
            "The Footprints on the Moon Will Last for Millions of Years",
            "Because the Moon has no atmosphere, there\u{2019}s no wind or water to erode or wash \
             away the Apollo astronauts\u{2019} footprints. They should last at least 10 million \
             years.",
        ),
        Document::new(
            5_u64,
            "A Day on Venus is Longer than a Year",
            "Venus has a very slow rotation on its axis, taking about 243 Earth days to complete \
             one rotation. However, it only takes about 225 Earth days to complete an orbit \
             around the Sun. This means a day on Venus is longer than a year.",
        ),
    ]
}

pub fn demo_queries() -> Vec<String> {
    DEMO_QUERIES.iter().map(|q| q.to_string()).collect()
}

/// Reads an array of documents. `.json` files are parsed as JSON, anything
/// else as YAML. Documents without metadata are stamped with `createdAt`.
pub fn load_documents(path: &Path) -> Result<Vec<Document>, DomainError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| DomainError::config(format!("{}: {e}", path.display())))?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let documents = if is_json {
        parse_json(&raw)
    } else {
        parse_yaml(&raw)
    }
    .map_err(|e| DomainError::config(format!("{}: {e}", path.display())))?;

    check_unique_ids(&documents)?;
    Ok(documents)
}

pub fn parse_json(raw: &str) -> Result<Vec<Document>, DomainError> {
    serde_json::from_str(raw).map_err(|e| DomainError::config(e.to_string()))
}

pub fn parse_yaml(raw: &str) -> Result<Vec<Document>, DomainError> {
    serde_yaml::from_str(raw).map_err(|e| DomainError::config(e.to_string()))
}

fn check_unique_ids(documents: &[Document]) -> Result<(), DomainError> {
    let mut seen = std::collections::HashSet::new();
    match documents.iter().find(|doc| !seen.insert(doc.id)) {
        Some(doc) => Err(DomainError::config(format!("duplicate document id {}", doc.id))),
        None => Ok(()),
    }
}
