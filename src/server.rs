//! MCP-compatible HTTP server.
//!
//! Exposes the Context7 capabilities as JSON endpoints. Each request is
//! handled on its own tokio task and awaits its upstream call
//! independently; the only shared state is the immutable [`AppState`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/mcp/context7-parser/{name}` | Call a capability by name |
//! | `GET`  | `/health` | Health probe (never touches the upstream) |
//! | `GET`  | `/.well-known/mcp-server` | Capability manifest |
//!
//! # Error Contract
//!
//! Every failure is rendered as the error envelope:
//!
//! ```json
//! { "success": false, "error": "projectId and query are required", "code": "MISSING_PARAMETERS" }
//! ```
//!
//! Status codes: 400 for rejected input, 404 for an unknown capability,
//! 413 for bodies over 10 MB, 500 for any upstream or transport failure.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use anyhow::{Context, Result};
use axum::{
    body::{Body, Bytes},
    extract::{rejection::BytesRejection, DefaultBodyLimit, Path, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::client::Context7Client;
use crate::config::Config;
use crate::error::{AppError, INVALID_JSON, UNKNOWN_CAPABILITY};
use crate::models::{HealthResponse, ServerManifest, SERVICE_NAME};
use crate::traits::CapabilityRegistry;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Route prefix shared by all capability endpoints.
pub const CAPABILITY_PREFIX: &str = "/mcp/context7-parser";

/// Shared application state passed to all route handlers.
///
/// Built once at startup and never mutated.
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    client: Context7Client,
    capabilities: Arc<CapabilityRegistry>,
}

impl AppState {
    /// Build state with the four built-in capabilities.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_registry(config, CapabilityRegistry::with_builtins())
    }

    pub fn with_registry(config: Config, capabilities: CapabilityRegistry) -> Result<Self> {
        let client = Context7Client::new(&config.upstream)?;
        Ok(Self {
            config: Arc::new(config),
            client,
            capabilities: Arc::new(capabilities),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Assemble the router with CORS, body limit and request logging.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            &format!("{}/{{name}}", CAPABILITY_PREFIX),
            post(handle_capability),
        )
        .route("/health", get(handle_health))
        .route("/.well-known/mcp-server", get(handle_manifest))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(log_request))
        .layer(cors)
        .with_state(state)
}

/// Bind the configured address and serve until the process is terminated.
pub async fn run_server(config: Config) -> Result<()> {
    let bind_addr = config.server.bind_addr();
    let port = config.server.port;
    let state = AppState::new(config)?;

    info!(
        upstream = %state.client.base_url(),
        timeout_secs = state.config().upstream.timeout.as_secs(),
        "Upstream configured"
    );
    for capability in state.capabilities.capabilities() {
        info!(
            "  POST {}/{} - {}",
            CAPABILITY_PREFIX,
            capability.name(),
            capability.description()
        );
    }

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    info!("Context7 MCP adapter listening on http://{}", bind_addr);
    info!(
        "MCP discovery endpoint: http://localhost:{}/.well-known/mcp-server",
        port
    );
    info!("Health check: http://localhost:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Middleware ============

/// Logs method, URI, status and duration of every request.
async fn log_request(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status();

    if status.is_server_error() {
        error!(%method, %uri, status = status.as_u16(), duration_ms, "Request failed");
    } else if status.is_client_error() {
        warn!(%method, %uri, status = status.as_u16(), duration_ms, "Request rejected");
    } else {
        info!(%method, %uri, status = status.as_u16(), duration_ms, "Request completed");
    }

    response
}

// ============ GET /health ============

/// Handler for `GET /health`. Always 200; the upstream is not consulted.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

// ============ GET /.well-known/mcp-server ============

async fn handle_manifest(State(state): State<AppState>) -> Json<ServerManifest> {
    Json(state.capabilities.manifest())
}

// ============ POST /mcp/context7-parser/{name} ============

/// Handler for capability calls.
///
/// The body is read as raw bytes rather than through `Json` so that a
/// missing or non-JSON `Content-Type` does not bypass the envelope; an
/// empty body is treated as `{}` and fails the required-field check.
async fn handle_capability(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, AppError> {
    let capability = state.capabilities.find(&name).ok_or_else(|| {
        AppError::not_found(
            UNKNOWN_CAPABILITY,
            format!("no capability registered with name: {}", name),
        )
    })?;

    let body = body.map_err(AppError::from_body_rejection)?;
    let params = parse_params(&body)?;

    let result = capability.execute(params, &state.client).await?;
    Ok(Json(result))
}

fn parse_params(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::bad_request(
            INVALID_JSON,
            "request body must be a JSON object",
        )),
        Err(e) => Err(AppError::bad_request(
            INVALID_JSON,
            format!("request body is not valid JSON: {}", e),
        )),
    }
}
