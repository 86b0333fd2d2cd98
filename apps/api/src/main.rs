mod assessment;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod sessions;
mod state;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::assessment::analysis::{DisabledAnalyzer, LlmTextAnalyzer, TextAnalyzer};
use crate::assessment::catalog::Catalog;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::sessions::store::PgSessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Neetup API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgSessionStore::new(db));

    let catalog = Arc::new(Catalog::builtin());
    info!(
        "Catalog loaded: {} questions, {} archetypes",
        catalog.questions.len(),
        catalog.archetypes.len()
    );

    let analyzer: Arc<dyn TextAnalyzer> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone(), config.anthropic_base_url.clone());
            info!(
                "Text analysis enabled (model: {}, timeout: {}s)",
                llm_client::MODEL,
                config.analysis_timeout_secs
            );
            Arc::new(LlmTextAnalyzer::new(llm, &catalog))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, reports use local computation only");
            Arc::new(DisabledAnalyzer)
        }
    };

    let state = AppState {
        store,
        analyzer,
        catalog,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Invalid listen address")?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
