//! HTTP surface: router, request/response bodies and error mapping.

use crate::gateway::Gateway;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sift_core::{AppError, SessionId};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Header carrying the session key when the body does not.
pub const SESSION_HEADER: &str = "x-session-id";

/// Body of `POST /query`.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub reset: bool,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// JSON error envelope: `{ "error": { "code", "message" } }`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

/// Error returned by handlers, carrying its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status = match &err {
            AppError::SearchUnavailable(_) | AppError::FetchUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::GenerationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let code = if err.is_upstream() { err.code() } else { "internal" };

        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Build the service router over a shared gateway.
pub fn create_router(gateway: Arc<Gateway>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/query", post(handle_query))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(gateway)
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn handle_query(
    State(gateway): State<Arc<Gateway>>,
    headers: HeaderMap,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;
    let session = resolve_session(request.session_id.as_deref(), &headers);

    match gateway
        .handle_query(&request.query, request.reset, &session)
        .await
    {
        Ok(answer) => Ok(Json(QueryResponse { answer })),
        Err(e) => {
            tracing::error!(session = %session, code = e.code(), "Query failed: {}", e);
            Err(e.into())
        }
    }
}

/// Session from the body, then the header, then the default.
fn resolve_session(body: Option<&str>, headers: &HeaderMap) -> SessionId {
    let header = headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok());

    body.filter(|id| !id.trim().is_empty())
        .or(header)
        .map(SessionId::new)
        .unwrap_or_default()
}
