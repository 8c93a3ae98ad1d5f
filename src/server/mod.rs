#![allow(clippy::result_large_err)] // Server helpers return AppError for consistent diagnostics.

use crate::core::aggregator::Aggregator;
use crate::core::error::AppError;
use crate::core::target::Target;
use crate::core::types::ErrorCategory;
use crate::tools::status;
use axum::{
    body::Body,
    extract::{Extension, Query},
    http::{Response, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::CorsLayer;
use tracing::info;

/// State shared across requests.
struct ServerState {
    aggregator: Arc<Aggregator>,
    probe_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ScanQuery {
    target: Option<String>,
}

/// Start the HTTP listener and block until the service terminates.
pub async fn serve(
    bind: &str,
    aggregator: Arc<Aggregator>,
    probe_timeout: Duration,
) -> Result<(), AppError> {
    serve_internal(bind, aggregator, probe_timeout, None).await
}

/// Start the HTTP listener and notify once the bound address is known.
pub async fn serve_with_ready_notifier(
    bind: &str,
    aggregator: Arc<Aggregator>,
    probe_timeout: Duration,
    ready_notifier: oneshot::Sender<SocketAddr>,
) -> Result<(), AppError> {
    serve_internal(bind, aggregator, probe_timeout, Some(ready_notifier)).await
}

/// Routes without a listener, for embedding or in-process tests.
pub fn router(aggregator: Arc<Aggregator>, probe_timeout: Duration) -> Router {
    let state = Arc::new(ServerState {
        aggregator,
        probe_timeout,
    });
    Router::new()
        .route("/health", get(handle_health))
        .route("/osint/email", get(handle_email))
        .route("/osint/username", get(handle_username))
        .route("/tools/status", get(handle_tools_status))
        .fallback(handle_not_found)
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
}

async fn serve_internal(
    bind: &str,
    aggregator: Arc<Aggregator>,
    probe_timeout: Duration,
    ready_notifier: Option<oneshot::Sender<SocketAddr>>,
) -> Result<(), AppError> {
    let bind_addr: SocketAddr = bind.parse().map_err(|err| {
        AppError::new(
            ErrorCategory::ConfigError,
            format!("invalid bind address {}: {}", bind, err),
        )
        .with_code("SERVER-001")
    })?;
    let app = router(aggregator, probe_timeout);
    let listener = TcpListener::bind(bind_addr).await.map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to bind listener {}: {}", bind_addr, err),
        )
        .with_code("SERVER-002")
    })?;
    let local_addr = listener.local_addr().map_err(|err| {
        AppError::new(
            ErrorCategory::IoError,
            format!("failed to determine listener address: {}", err),
        )
    })?;
    if let Some(tx) = ready_notifier {
        let _ = tx.send(local_addr);
    }
    info!("osint api listening on {}", local_addr);
    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|err| {
            AppError::new(
                ErrorCategory::IoError,
                format!("http server terminated: {}", err),
            )
        })
}

async fn handle_health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": crate::VERSION,
    }))
}

async fn handle_email(
    Extension(state): Extension<Arc<ServerState>>,
    Query(query): Query<ScanQuery>,
) -> Result<Response<Body>, ApiRejection> {
    let target = Target::email(query.target.as_deref().unwrap_or_default())
        .map_err(ApiRejection::invalid)?;
    let result = state.aggregator.aggregate_target(&target).await;
    Ok(Json(result).into_response())
}

async fn handle_username(
    Extension(state): Extension<Arc<ServerState>>,
    Query(query): Query<ScanQuery>,
) -> Result<Response<Body>, ApiRejection> {
    let target = Target::username(query.target.as_deref().unwrap_or_default())
        .map_err(ApiRejection::invalid)?;
    let result = state.aggregator.aggregate_target(&target).await;
    Ok(Json(result).into_response())
}

async fn handle_tools_status(Extension(state): Extension<Arc<ServerState>>) -> Json<Value> {
    let aggregator = &state.aggregator;
    let runner = aggregator.runner();
    let statuses = status::probe_all(
        aggregator.catalog(),
        aggregator.resolver(),
        runner.as_ref(),
        state.probe_timeout,
        aggregator.credentials_present(),
    )
    .await;
    Json(json!({ "tools": statuses }))
}

async fn handle_not_found() -> ApiRejection {
    ApiRejection {
        status: StatusCode::NOT_FOUND,
        code: "HTTP-404".to_string(),
        message: "no such route".to_string(),
    }
}

struct ApiRejection {
    status: StatusCode,
    code: String,
    message: String,
}

impl ApiRejection {
    fn invalid(err: AppError) -> Self {
        tracing::debug!("rejected request: {}", err);
        Self {
            status: StatusCode::BAD_REQUEST,
            code: err.code,
            message: err.message,
        }
    }
}

impl IntoResponse for ApiRejection {
    fn into_response(self) -> Response<Body> {
        let mut resp = Json(json!({
            "error": {
                "code": self.code,
                "message": self.message
            }
        }))
        .into_response();
        *resp.status_mut() = self.status;
        resp
    }
}
