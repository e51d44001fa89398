//! Routes, handlers and the server loop.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::CorsLayer;

use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use crate::pool::{LampPool, LampSelection, PoolError, MAX_REQUEST_BYTES};

/// Bytes returned by `/api/random` when the request does not say.
const DEFAULT_RANDOM_BYTES: usize = 32;

/// Errors that can occur while running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind to address: {0}")]
    Bind(#[from] std::io::Error),

    #[error("server error: {0}")]
    Server(String),
}

/// Request-level failures, mapped onto HTTP status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid value for {name}: {value:?}")]
    BadParameter { name: &'static str, value: String },

    #[error("lamp {0} not found")]
    UnknownLamp(u32),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Status code for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadParameter { .. } => StatusCode::BAD_REQUEST,
            ApiError::UnknownLamp(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PoolError> for ApiError {
    fn from(err: PoolError) -> Self {
        match err {
            PoolError::UnknownLamp(id) => ApiError::UnknownLamp(id),
            PoolError::InvalidSelection(value) => ApiError::BadParameter { name: "lamp", value },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref msg) = self {
            tracing::error!(error = %msg, "Request failed");
        }
        (self.status(), self.to_string()).into_response()
    }
}

/// Body of `/api/frame`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameResponse {
    /// Lamp id.
    pub id: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Row-major RGBA bytes, hex encoded.
    pub rgba: String,
}

/// Body of `/api/random`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RandomResponse {
    /// Random bytes, hex encoded.
    pub random: String,
}

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::with_port(4567)
    }
}

impl ServerConfig {
    /// Creates a config listening on all interfaces at `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], port).into(),
        }
    }
}

struct AppState {
    pool: LampPool,
    metrics: MetricsRegistry,
}

/// HTTP server exposing a lamp pool.
pub struct ApiServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Creates a server owning `pool`.
    pub fn new(config: ServerConfig, pool: LampPool, metrics: MetricsRegistry) -> Self {
        Self {
            config,
            state: Arc::new(AppState { pool, metrics }),
        }
    }

    /// Builds the router. Exposed so callers can embed or test the routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/frame", get(frame_handler))
            .route("/api/random", get(random_handler))
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .layer(CorsLayer::permissive())
            .with_state(Arc::clone(&self.state))
    }

    /// Starts the HTTP server.
    ///
    /// This method runs the server until it is shut down.
    pub async fn run(self) -> Result<(), ServerError> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        tracing::info!(
            addr = %self.config.bind_addr,
            lamps = self.state.pool.len(),
            "HTTP server listening"
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(e.to_string()))?;

        Ok(())
    }
}

/// Reads an optional query parameter, falling back to `default` when it is
/// absent or blank.
fn param<T: FromStr>(
    params: &HashMap<String, String>,
    name: &'static str,
    default: T,
) -> Result<T, ApiError> {
    match params.get(name).map(|v| v.trim()) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| ApiError::BadParameter {
            name,
            value: value.to_string(),
        }),
    }
}

/// Runs blocking pool work off the async executor.
async fn blocking<T, F>(state: &Arc<AppState>, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&LampPool) -> Result<T, PoolError> + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || work(&state.pool))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}

async fn frame_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<FrameResponse>, ApiError> {
    let id: u32 = param(&params, "id", 0)?;
    let frame = blocking(&state, move |pool| pool.frame_for(id)).await?;

    Ok(Json(FrameResponse {
        id,
        width: frame.width(),
        height: frame.height(),
        rgba: hex::encode(frame.pixels()),
    }))
}

async fn random_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<RandomResponse>, ApiError> {
    let bytes: usize = param(&params, "bytes", DEFAULT_RANDOM_BYTES)?;
    if bytes > MAX_REQUEST_BYTES {
        return Err(ApiError::BadParameter {
            name: "bytes",
            value: bytes.to_string(),
        });
    }
    let selection: LampSelection = param(&params, "lamp", LampSelection::All)?;

    let random = blocking(&state, move |pool| pool.combined_random(bytes, selection)).await?;

    Ok(Json(RandomResponse {
        random: hex::encode(random),
    }))
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let stats = match blocking(&state, |pool| pool.stats()).await {
        Ok(stats) => stats,
        Err(e) => return e.into_response(),
    };
    state.metrics.update(&MetricsSnapshot::from_pool_stats(&stats));

    match state.metrics.encode() {
        Ok(output) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            output,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {}", e),
        )
            .into_response(),
    }
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
