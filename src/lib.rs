//! Semantic search over a small document set.
//!
//! Documents are embedded with a sentence-transformer model, stored in a
//! vector collection, and queried by meaning rather than keywords.

pub mod application;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
mod testing;
