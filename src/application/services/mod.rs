mod collection;
mod ingest;
mod pipeline;
mod query;

pub use collection::CollectionManager;
pub use ingest::{DocumentIngestor, IngestFailure, IngestReport};
pub use pipeline::{print_outcome, Pipeline, PipelineReport, QueryOutcome};
pub use query::QueryExecutor;
