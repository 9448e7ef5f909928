use std::io::Write;
use tracing::instrument;

use super::{CollectionManager, DocumentIngestor, IngestReport, QueryExecutor};
use crate::domain::{CollectionSchema, Document, DomainError, SearchResult};

#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub query: String,
    pub result: Result<Vec<SearchResult>, DomainError>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub ingest: IngestReport,
    pub indexed: Option<u64>,
    pub queries: Vec<QueryOutcome>,
}

impl PipelineReport {
    pub fn failed_queries(&self) -> usize {
        self.queries.iter().filter(|q| q.result.is_err()).count()
    }
}

/// Recreate, ingest, then query. Only collection creation is fatal; ingestion
/// failures follow the ingestor's policy and each query fails on its own.
pub struct Pipeline {
    collections: CollectionManager,
    ingestor: DocumentIngestor,
    executor: QueryExecutor,
}

impl Pipeline {
    pub fn new(
        collections: CollectionManager,
        ingestor: DocumentIngestor,
        executor: QueryExecutor,
    ) -> Self {
        Self {
            collections,
            ingestor,
            executor,
        }
    }

    #[instrument(
        skip_all,
        fields(collection = %schema.name, documents = documents.len(), queries = queries.len())
    )]
    pub async fn run<W: Write>(
        &self,
        schema: &CollectionSchema,
        documents: &[Document],
        queries: &[String],
        out: &mut W,
    ) -> Result<PipelineReport, DomainError> {
        self.collections.recreate(schema).await?;

        tracing::info!("populating collection");
        let ingest = self.ingestor.ingest_all(&schema.name, documents).await?;

        let indexed = match self.collections.count(&schema.name).await {
            Ok(count) => {
                tracing::info!(points = count, "collection populated");
                Some(count)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not count indexed points");
                None
            }
        };

        let mut outcomes = Vec::with_capacity(queries.len());
        for query in queries {
            let result = self.executor.search(&schema.name, query).await;
            if let Err(e) = &result {
                tracing::error!(query = %query, kind = e.kind(), error = %e, "search failed");
            }

            let outcome = QueryOutcome {
                query: query.clone(),
                result,
            };
            if let Err(e) = print_outcome(out, &outcome) {
                tracing::warn!(error = %e, "failed to write query results");
            }
            outcomes.push(outcome);
        }

        Ok(PipelineReport {
            ingest,
            indexed,
            queries: outcomes,
        })
    }
}

/// Writes the query banner followed by the results as pretty JSON.
pub fn print_outcome<W: Write>(out: &mut W, outcome: &QueryOutcome) -> std::io::Result<()> {
    writeln!(out, "\n==== QUERY: \"{}\"", outcome.query)?;
    match &outcome.result {
        Ok(results) => {
            let json = serde_json::to_string_pretty(results).map_err(std::io::Error::other)?;
            writeln!(out, "{json}")
        }
        Err(e) => writeln!(out, "error: {e}"),
    }
}
