//! HTTP search server
//!
//! `POST /search` runs one search against a fresh corpus snapshot.
//! `GET /health` answers `ok`. Every response carries permissive CORS headers
//! so browser front ends can call the service directly.

use crate::corpus::CorpusSupplier;
use crate::error::AppError;
use crate::service::{SearchRequest, SearchService};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_PORT: u16 = 3000;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::CorpusFetchFailed(_) | AppError::CorpusParseFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.message(),
            "code": self.error_code(),
        }));

        (status, body).into_response()
    }
}

/// Build the router around a shared search service
pub fn router<S>(service: Arc<SearchService<S>>) -> Router
where
    S: CorpusSupplier + 'static,
{
    Router::new()
        .route("/search", post(search::<S>).options(preflight))
        .route("/health", get(health))
        .layer(map_response(add_cors_headers))
        .with_state(service)
}

/// Bind and serve until Ctrl-C
pub async fn serve<S>(service: SearchService<S>, port: u16) -> Result<(), AppError>
where
    S: CorpusSupplier + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind {}: {}", addr, e)))?;

    info!("Search server listening on {}", addr);

    axum::serve(listener, router(Arc::new(service)))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("Cannot listen for shutdown signal");
                std::future::pending::<()>().await;
            }
            info!("Shutting down");
        })
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))
}

async fn search<S>(State(service): State<Arc<SearchService<S>>>, body: Bytes) -> Response
where
    S: CorpusSupplier + 'static,
{
    // An empty body is the same as `{}`: list everything
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        SearchRequest::default()
    } else {
        match serde_json::from_slice::<SearchRequest>(&body) {
            Ok(request) => request,
            Err(e) => {
                return AppError::InvalidInput(format!("Malformed request body: {}", e)).into_response();
            }
        }
    };

    match service.execute(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            warn!(code = e.error_code(), "Search failed: {}", e);
            e.into_response()
        }
    }
}

async fn preflight() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS")],
    )
}

async fn health() -> &'static str {
    "ok"
}

async fn add_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}
