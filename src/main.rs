use anyhow::Result;
use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

mod api;
mod config;
mod context;
mod entities;
mod intent;
mod llm;
mod orchestrator;
mod query_log;
mod registry;
mod store;

use config::QueryPipelineConfig;
use llm::{CompletionClient, MockCompletionClient, OpenRouterClient};
use orchestrator::QueryOrchestrator;
use query_log::QueryLog;
use store::http::DocumentStoreClient;
use store::memory::InMemoryEntityStore;
use store::EntityStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentinel_ops_backend=info,axum=info".into()),
        )
        .init();

    dotenvy::dotenv().ok();

    let pipeline_config = QueryPipelineConfig::from_env();

    // LLM provider selection. A requested openrouter provider without an
    // API key downgrades to mock instead of failing startup.
    let mut llm_provider = env::var("LLM_PROVIDER")
        .unwrap_or_else(|_| "mock".to_string())
        .to_lowercase();

    let openrouter_api_key = if llm_provider == "openrouter" {
        match env::var("OPENROUTER_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                warn!(
                    "LLM_PROVIDER is set to 'openrouter' but OPENROUTER_API_KEY is not set or is empty. \
                     Falling back to 'mock' provider. Set OPENROUTER_API_KEY in your environment to use OpenRouter."
                );
                llm_provider = "mock".to_string();
                String::new()
            }
        }
    } else {
        String::new()
    };

    let openrouter_model = env::var("OPENROUTER_MODEL")
        .unwrap_or_else(|_| "google/gemini-2.0-flash-exp".to_string());
    let openrouter_url = env::var("OPENROUTER_URL")
        .unwrap_or_else(|_| "https://openrouter.ai/api/v1/chat/completions".to_string());

    let completion: Arc<dyn CompletionClient> = if llm_provider == "openrouter" {
        info!(
            openrouter_url = %openrouter_url,
            openrouter_model = %openrouter_model,
            "OpenRouter completion client configured"
        );
        Arc::new(OpenRouterClient::new(
            openrouter_url,
            openrouter_api_key,
            openrouter_model,
            pipeline_config.completion_timeout,
        ))
    } else {
        info!("LLM provider set to mock; answers are generated deterministically from store data");
        Arc::new(MockCompletionClient)
    };

    // Entity store provider: live document store over HTTP, or the
    // in-memory demo deployment.
    let store_provider = env::var("ENTITY_STORE_PROVIDER")
        .unwrap_or_else(|_| "memory".to_string())
        .to_lowercase();

    let entity_store: Arc<dyn EntityStore> = if store_provider == "http" {
        let base_url = env::var("ENTITY_STORE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8290".to_string());
        info!(base_url = %base_url, "Entity store: external document store");
        Arc::new(DocumentStoreClient::new(base_url, Duration::from_secs(10)))
    } else {
        info!("Entity store: in-memory demo deployment");
        Arc::new(InMemoryEntityStore::demo_deployment())
    };

    let query_log = Arc::new(QueryLog::open(
        env::var("QUERY_LOG_PATH").ok().map(PathBuf::from),
    )?);
    info!(
        logged_queries = query_log.count().unwrap_or(0),
        "Query audit log ready"
    );

    let orchestrator = Arc::new(QueryOrchestrator::new(
        entity_store,
        completion,
        Arc::clone(&query_log),
        pipeline_config,
    ));

    let state = api::AppState {
        orchestrator,
        query_log,
    };

    // The operator dashboard runs on a different origin during development.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(api::health_check))
        .route("/v1/query", post(api::handle_query))
        .route("/v1/query/history", get(api::handle_history))
        .route("/v1/functions", get(api::handle_functions))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let http_port_raw = env::var("SENTINEL_HTTP_PORT").unwrap_or_else(|_| "8180".to_string());
    let http_port = http_port_raw.trim().parse::<u16>().unwrap_or_else(|e| {
        warn!(
            value = %http_port_raw,
            error = %e,
            "Invalid SENTINEL_HTTP_PORT; falling back to 8180"
        );
        8180
    });

    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", http_port)
        .parse()
        .expect("Invalid address");

    info!(
        addr = %addr,
        llm_provider = %llm_provider,
        store_provider = %store_provider,
        "Sentinel Ops backend listening"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
