mod auth;
mod config;
mod errors;
mod feedback;
mod identity;
mod interviews;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;

use anyhow::{bail, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::session::SessionManager;
use crate::config::Config;
use crate::feedback::generate::{FeedbackGenerator, LlmFeedbackGenerator};
use crate::identity::{FirebaseIdentity, IdentityProvider, MemoryIdentity};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{DocumentStore, MemoryStore, PgStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Intervue API v{}", env!("CARGO_PKG_VERSION"));

    // Document store — Postgres by default, in-memory for local runs
    let store: Arc<dyn DocumentStore> = match config.store_backend.as_str() {
        "postgres" => Arc::new(PgStore::connect(&config.database_url).await?),
        "memory" => {
            info!("Using in-memory document store (STORE_BACKEND=memory)");
            Arc::new(MemoryStore::new())
        }
        other => bail!("Unknown STORE_BACKEND '{other}' (expected 'postgres' or 'memory')"),
    };

    // Identity provider — Firebase by default, in-memory for local runs
    let identity: Arc<dyn IdentityProvider> = match config.identity_backend.as_str() {
        "firebase" => Arc::new(FirebaseIdentity::new(
            config.identity_base_url.clone(),
            config.firebase_project_id.clone(),
            config.firebase_admin_token.clone(),
        )),
        "memory" => {
            info!("Using in-memory identity provider (IDENTITY_BACKEND=memory)");
            Arc::new(MemoryIdentity::new())
        }
        other => bail!("Unknown IDENTITY_BACKEND '{other}' (expected 'firebase' or 'memory')"),
    };
    info!("Identity provider initialized ({})", config.identity_backend);

    // Feedback generator
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    let generator: Arc<dyn FeedbackGenerator> = Arc::new(LlmFeedbackGenerator::new(llm));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Session manager
    let sessions = SessionManager::new(identity.clone(), store.clone(), config.secure_cookies());

    // Build app state
    let state = AppState {
        store,
        identity,
        generator,
        sessions,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
