//! HTTP gateway for Wellspring.
//!
//! Exposes the session boundary as a small REST API — create a session, ask
//! questions, adjust selections, generate a protocol, clear history — plus
//! the model/category/document catalogs and an embedded single-page chat
//! frontend. Built on Axum.
//!
//! Each session id owns an independent [`SessionContext`]; the map here is
//! the only state shared between requests. One user interaction is processed
//! start-to-finish against a session before its updated context is stored
//! back — there is no background work and no streaming.

pub mod api;
pub mod frontend;

use std::collections::HashMap;
use std::sync::Arc;
use axum::{Router, routing::get};
use tokio::sync::RwLock;
use tracing::info;
use wellspring_chat::ChatPipeline;
use wellspring_core::{DocumentStore, SessionContext};
use wellspring_snowflake::{CortexSearchClient, SqlApiClient};

/// Maximum number of live sessions before the oldest is evicted.
const MAX_SESSIONS: usize = 1_000;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub pipeline: ChatPipeline,
    pub store: Arc<dyn DocumentStore>,
    pub sessions: RwLock<HashMap<String, SessionContext>>,
}

pub type SharedState = Arc<GatewayState>;

impl GatewayState {
    pub fn new(pipeline: ChatPipeline, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            pipeline,
            store,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a session, evicting the oldest one at capacity.
    pub(crate) async fn insert_session(&self, session: SessionContext) {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= MAX_SESSIONS && !sessions.contains_key(&session.id.0) {
            if let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, s)| s.created_at)
                .map(|(k, _)| k.clone())
            {
                sessions.remove(&oldest);
            }
        }
        sessions.insert(session.id.0.clone(), session);
    }
}

/// Build the full router: API under `/api/v1`, health, embedded frontend.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/v1", api::api_router(state))
        .merge(frontend::frontend_router())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Start the gateway HTTP server with production backend clients.
pub async fn serve(
    config: wellspring_config::AppConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let search = Arc::new(CortexSearchClient::from_config(&config));
    let sql = Arc::new(SqlApiClient::from_config(&config));
    let store: Arc<dyn DocumentStore> = sql.clone();

    let pipeline = ChatPipeline::new(search, sql, store.clone(), &config.persona)
        .with_num_chunks(config.retrieval.num_chunks)
        .with_slide_window(config.retrieval.slide_window)
        .with_url_validity(config.retrieval.url_validity_secs);

    let state = Arc::new(GatewayState::new(pipeline, store));
    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> axum::response::Json<HealthResponse> {
    axum::response::Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
