//! Session-boundary REST handlers.
//!
//! Endpoints (nested under `/api/v1`):
//!
//! - `POST   /sessions`                — create a session
//! - `GET    /sessions/{id}`           — transcript + selections
//! - `PATCH  /sessions/{id}/settings`  — model / category / toggles
//! - `POST   /sessions/{id}/ask`       — process one question
//! - `POST   /sessions/{id}/protocol`  — generate a protocol
//! - `DELETE /sessions/{id}/history`   — clear the transcript
//! - `GET    /models` `/categories` `/documents` — selector catalogs

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wellspring_chat::ProtocolOutcome;
use wellspring_core::error::ServiceError;
use wellspring_core::{ALL_CATEGORIES, DocumentStore, ModelId, Role, SessionContext};

use crate::SharedState;

/// Build the API router. Nest this under `/api/v1`.
pub fn api_router(state: SharedState) -> Router {
    Router::new()
        .route("/sessions", post(create_session_handler))
        .route("/sessions/{id}", get(get_session_handler))
        .route(
            "/sessions/{id}/settings",
            axum::routing::patch(update_settings_handler),
        )
        .route("/sessions/{id}/ask", post(ask_handler))
        .route("/sessions/{id}/protocol", post(protocol_handler))
        .route(
            "/sessions/{id}/history",
            axum::routing::delete(clear_history_handler),
        )
        .route("/models", get(list_models_handler))
        .route("/categories", get(list_categories_handler))
        .route("/documents", get(list_documents_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct SessionDto {
    pub id: String,
    pub model: String,
    pub category: String,
    pub use_history: bool,
    pub debug: bool,
    pub turns: Vec<TurnDto>,
}

#[derive(Serialize, Deserialize)]
pub struct TurnDto {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
struct SettingsRequest {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    use_history: Option<bool>,
    #[serde(default)]
    debug: Option<bool>,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub references: Vec<ReferenceDto>,
    /// Present only when the session's debug flag is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieval_query: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ReferenceDto {
    pub path: String,
    pub url: String,
}

#[derive(Serialize, Deserialize)]
pub struct ProtocolResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct CatalogResponse {
    pub items: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn not_found(id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Unknown session: {id}"),
        }),
    )
}

fn unprocessable(message: impl Into<String>) -> ApiError {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// A backend failure is fatal for the operation that made it, and only for
/// that operation — the session stays usable.
fn service_error(e: ServiceError) -> ApiError {
    warn!(error = %e, "Backend call failed");
    (
        StatusCode::BAD_GATEWAY,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

fn session_dto(session: &SessionContext) -> SessionDto {
    SessionDto {
        id: session.id.0.clone(),
        model: session.model.to_string(),
        category: session.category.clone(),
        use_history: session.use_history,
        debug: session.debug,
        turns: session
            .turns()
            .iter()
            .map(|t| TurnDto {
                role: match t.role {
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                },
                content: t.content.clone(),
            })
            .collect(),
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn create_session_handler(State(state): State<SharedState>) -> Json<SessionDto> {
    let session = SessionContext::new();
    let dto = session_dto(&session);
    info!(session = %session.id, "Session created");
    state.insert_session(session).await;
    Json(dto)
}

async fn get_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionDto>, ApiError> {
    let sessions = state.sessions.read().await;
    let session = sessions.get(&id).ok_or_else(|| not_found(&id))?;
    Ok(Json(session_dto(session)))
}

async fn update_settings_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<SettingsRequest>,
) -> Result<Json<SessionDto>, ApiError> {
    let model = payload
        .model
        .as_deref()
        .map(|m| m.parse::<ModelId>())
        .transpose()
        .map_err(|e| unprocessable(e.to_string()))?;

    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| not_found(&id))?;

    if let Some(model) = model {
        session.model = model;
    }
    if let Some(category) = payload.category {
        session.category = category;
    }
    if let Some(use_history) = payload.use_history {
        session.use_history = use_history;
    }
    if let Some(debug) = payload.debug {
        session.debug = debug;
    }

    Ok(Json(session_dto(session)))
}

async fn ask_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    if payload.question.trim().is_empty() {
        return Err(unprocessable("Question must not be empty"));
    }

    // Clone the session out so the map is not locked across backend calls;
    // the updated context is stored back only on success.
    let mut working = {
        let sessions = state.sessions.read().await;
        sessions.get(&id).ok_or_else(|| not_found(&id))?.clone()
    };

    let outcome = state
        .pipeline
        .ask(&mut working, &payload.question)
        .await
        .map_err(service_error)?;

    state
        .sessions
        .write()
        .await
        .insert(id.clone(), working);

    Ok(Json(AskResponse {
        answer: outcome.answer,
        references: outcome
            .references
            .into_iter()
            .map(|(path, url)| ReferenceDto { path, url })
            .collect(),
        retrieval_query: outcome.retrieval_query,
    }))
}

async fn protocol_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ProtocolResponse>, ApiError> {
    let session = {
        let sessions = state.sessions.read().await;
        sessions.get(&id).ok_or_else(|| not_found(&id))?.clone()
    };

    match state
        .pipeline
        .generate_protocol(&session)
        .await
        .map_err(service_error)?
    {
        ProtocolOutcome::Generated(protocol) => Ok(Json(ProtocolResponse {
            protocol: Some(protocol),
            warning: None,
        })),
        ProtocolOutcome::NotEnoughHistory => Ok(Json(ProtocolResponse {
            protocol: None,
            warning: Some("Have a conversation first to generate a protocol.".into()),
        })),
    }
}

async fn clear_history_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionDto>, ApiError> {
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| not_found(&id))?;
    session.clear();
    info!(session = %session.id, "History cleared");
    Ok(Json(session_dto(session)))
}

async fn list_models_handler() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        items: ModelId::ALL.iter().map(|m| m.to_string()).collect(),
    })
}

async fn list_categories_handler(
    State(state): State<SharedState>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let mut items = vec![ALL_CATEGORIES.to_string()];
    items.extend(state.store.list_categories().await.map_err(service_error)?);
    Ok(Json(CatalogResponse { items }))
}

async fn list_documents_handler(
    State(state): State<SharedState>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let items = state.store.list_documents().await.map_err(service_error)?;
    Ok(Json(CatalogResponse { items }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GatewayState, build_router};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;
    use wellspring_chat::ChatPipeline;
    use wellspring_core::{
        CompletionClient, DocumentStore, RetrievedChunk, SearchClient,
    };

    /// A fixed-output backend standing in for all three Snowflake clients.
    struct TestBackend;

    #[async_trait]
    impl SearchClient for TestBackend {
        async fn search(
            &self,
            _query: &str,
            _category: &str,
            _limit: usize,
        ) -> Result<Vec<RetrievedChunk>, ServiceError> {
            Ok(vec![RetrievedChunk {
                text: "Morning light anchors the circadian clock.".into(),
                relative_path: "light.pdf".into(),
                category: "SLEEP".into(),
            }])
        }
    }

    #[async_trait]
    impl CompletionClient for TestBackend {
        async fn complete(&self, _model: ModelId, _prompt: &str) -> Result<String, ServiceError> {
            Ok("Get sunlight within an hour of waking.".into())
        }
    }

    #[async_trait]
    impl DocumentStore for TestBackend {
        async fn presigned_url(
            &self,
            path: &str,
            _validity_secs: u32,
        ) -> Result<String, ServiceError> {
            Ok(format!("https://signed.example/{path}"))
        }

        async fn list_documents(&self) -> Result<Vec<String>, ServiceError> {
            Ok(vec!["docs/light.pdf".into()])
        }

        async fn list_categories(&self) -> Result<Vec<String>, ServiceError> {
            Ok(vec!["SLEEP".into(), "HORMONES".into()])
        }
    }

    fn test_app() -> axum::Router {
        let backend = Arc::new(TestBackend);
        let pipeline = ChatPipeline::new(
            backend.clone(),
            backend.clone(),
            backend.clone(),
            "You are a coach.",
        );
        build_router(Arc::new(GatewayState::new(pipeline, backend)))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn create_session(app: &axum::Router) -> String {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/v1/sessions", serde_json::json!({})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = test_app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_and_fetch_session() {
        let app = test_app();
        let id = create_session(&app).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["model"], "mixtral-8x7b");
        assert_eq!(json["category"], "ALL");
        assert_eq!(json["use_history"], true);
        assert_eq!(json["turns"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/sessions/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ask_appends_one_exchange() {
        let app = test_app();
        let id = create_session(&app).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/ask"),
                serde_json::json!({"question": "How to improve sleep?"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["answer"], "Get sunlight within an hour of waking.");
        assert_eq!(json["references"][0]["path"], "light.pdf");
        assert_eq!(
            json["references"][0]["url"],
            "https://signed.example/light.pdf"
        );
        assert!(json.get("retrieval_query").is_none());

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        let turns = json["turns"].as_array().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0]["role"], "user");
        assert_eq!(turns[1]["role"], "assistant");
    }

    #[tokio::test]
    async fn empty_question_rejected() {
        let app = test_app();
        let id = create_session(&app).await;

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/ask"),
                serde_json::json!({"question": "   "}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn settings_update_selections() {
        let app = test_app();
        let id = create_session(&app).await;

        let response = app
            .oneshot(json_request(
                "PATCH",
                &format!("/api/v1/sessions/{id}/settings"),
                serde_json::json!({"model": "llama3-70b", "category": "SLEEP", "debug": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["model"], "llama3-70b");
        assert_eq!(json["category"], "SLEEP");
        assert_eq!(json["debug"], true);
    }

    #[tokio::test]
    async fn unknown_model_rejected() {
        let app = test_app();
        let id = create_session(&app).await;

        let response = app
            .oneshot(json_request(
                "PATCH",
                &format!("/api/v1/sessions/{id}/settings"),
                serde_json::json!({"model": "gpt-4o"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn protocol_needs_a_conversation() {
        let app = test_app();
        let id = create_session(&app).await;

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/protocol"),
                serde_json::json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json.get("protocol").is_none());
        assert!(json["warning"].as_str().unwrap().contains("conversation"));
    }

    #[tokio::test]
    async fn protocol_generated_after_exchange() {
        let app = test_app();
        let id = create_session(&app).await;

        // One full exchange first.
        app.clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/ask"),
                serde_json::json!({"question": "How to improve sleep?"}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/protocol"),
                serde_json::json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["protocol"].as_str().is_some());
        assert!(json.get("warning").is_none());
    }

    #[tokio::test]
    async fn clear_history_empties_transcript() {
        let app = test_app();
        let id = create_session(&app).await;

        app.clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/v1/sessions/{id}/ask"),
                serde_json::json!({"question": "q"}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/sessions/{id}/history"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["turns"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn models_catalog_lists_all_variants() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/models")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        let items = json["items"].as_array().unwrap();
        assert_eq!(items.len(), 9);
        assert_eq!(items[0], "mixtral-8x7b");
    }

    #[tokio::test]
    async fn categories_catalog_leads_with_all() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/categories")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        let items = json["items"].as_array().unwrap();
        assert_eq!(items[0], "ALL");
        assert!(items.iter().any(|c| c == "SLEEP"));
    }
}
