use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use evermed::api::{start_server, ApiContext, DbHandle};
use evermed::config::Config;
use evermed::db::sqlite::open_database;
use evermed::rag::embedding::HttpEmbedder;
use evermed::safety::KeywordClassifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    // Open once at startup so migrations run before the first request.
    open_database(&config.db_path)?;
    tracing::info!(path = %config.db_path.display(), "database ready");

    if config.share_link_pepper.is_none() {
        tracing::warn!("SHARE_LINK_PEPPER not set; share pack creation will fail");
    }
    if config.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY not set; retrieval will use recency order only");
    }

    let embedder = HttpEmbedder::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.embed_model.clone(),
        config.embed_timeout,
    )?;

    let ctx = ApiContext {
        db: DbHandle::new(config.db_path.clone()),
        embedder: Arc::new(embedder),
        classifier: Arc::new(KeywordClassifier),
        pepper: config.share_link_pepper.clone(),
    };

    let mut server = start_server(ctx, config.addr).await?;
    tracing::info!(addr = %server.addr, "evermed listening");

    tokio::signal::ctrl_c().await?;
    server.shutdown();

    Ok(())
}
