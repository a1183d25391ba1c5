use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{debug, info};

use crate::{
    config::ProxyConfig,
    graphql::{self, GraphqlError, GraphqlRequest},
    upstream::{ChatCompletionsClient, CompletionBackend},
};

const ENDPOINTS: &str = "chatmark proxy - Endpoints: /health, /test-upstream, /graphql";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub backend: Arc<dyn CompletionBackend>,
}

impl AppState {
    pub fn new(config: ProxyConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }
}

pub async fn serve(config: ProxyConfig) -> Result<()> {
    let backend: Arc<dyn CompletionBackend> =
        Arc::new(ChatCompletionsClient::new(config.upstream.clone())?);
    let listen_addr = config.listen_addr.clone();
    let app = router(AppState::new(config, backend));

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    info!(addr = %listen_addr, "chat proxy listening");
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route(
            "/graphql",
            post(graphql_endpoint).options(preflight).fallback(fallback),
        )
        // Status endpoints answer any method
        .route("/health", get(health).options(preflight).fallback(health))
        .route(
            "/test-upstream",
            get(test_upstream).options(preflight).fallback(test_upstream),
        )
        .fallback(fallback)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn fallback(method: Method) -> impl IntoResponse {
    if method == Method::OPTIONS {
        return (StatusCode::OK, "").into_response();
    }
    (StatusCode::OK, ENDPOINTS).into_response()
}

fn bad_request(err: GraphqlError) -> axum::response::Response {
    debug!(error = %err, "rejecting graphql request");
    (StatusCode::BAD_REQUEST, Json(err.to_body())).into_response()
}

async fn graphql_endpoint(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    if !is_json {
        return bad_request(GraphqlError::UnsupportedContentType);
    }

    let request = match GraphqlRequest::parse(&body) {
        Ok(request) => request,
        Err(err) => return bad_request(err),
    };

    match graphql::execute(&request, state.backend.as_ref()).await {
        Ok(data) => Json(json!({ "data": data })).into_response(),
        Err(err) => bad_request(err),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthEnvironment {
    has_upstream_url: bool,
    has_api_key: bool,
    upstream_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    environment: HealthEnvironment,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let upstream = &state.config.upstream;
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        environment: HealthEnvironment {
            has_upstream_url: upstream.base_url.is_some(),
            has_api_key: upstream.api_key.is_some(),
            upstream_url: upstream.base_url.clone(),
        },
    })
}

async fn test_upstream(State(state): State<AppState>) -> impl IntoResponse {
    Json(graphql::check_upstream(state.backend.as_ref()).await)
}
