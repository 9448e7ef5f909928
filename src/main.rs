use semsearch::infrastructure::{AppContext, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "semsearch=info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::load()?;
    info!(
        collection = %config.collection.name,
        backend = ?config.store.backend,
        "starting semantic search"
    );

    let context = AppContext::from_config(config).await?;
    let schema = context.schema();
    let documents = context.documents()?;
    let queries = context.queries();

    let report = context
        .pipeline()
        .run(&schema, &documents, &queries, &mut std::io::stdout())
        .await?;

    info!(
        ingested = report.ingest.succeeded.len(),
        failed = report.ingest.failed.len(),
        indexed = ?report.indexed,
        failed_queries = report.failed_queries(),
        "run finished"
    );

    context.shutdown();
    Ok(())
}
