use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use crate::envelope::{Envelope, ErrorDetail};

/// Message returned to callers for anything we did not anticipate. The real
/// cause only goes to the log.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Invalid query parameter: {0}")]
    InvalidParam(&'static str),

    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Upstream(String),

    /// Error member of a JSON-RPC reply, exactly as the upstream sent it.
    #[error("upstream RPC error: {0}")]
    Rpc(Value),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidParam(_) | GatewayError::Configuration(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Upstream(_) | GatewayError::Rpc(_) => StatusCode::BAD_GATEWAY,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The error object exposed to the caller.
    pub fn detail(&self) -> Value {
        match self {
            GatewayError::Rpc(raw) => raw.clone(),
            GatewayError::Internal(_) => ErrorDetail::message(INTERNAL_ERROR_MESSAGE).into(),
            other => ErrorDetail::message(other.to_string()).into(),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return GatewayError::Internal(format!("undecodable upstream response: {err}"));
        }
        // Upstream addresses are internal; keep them out of caller-facing text.
        let err = err.without_url();
        if let Some(status) = err.status() {
            GatewayError::Upstream(format!("Upstream returned HTTP {status}"))
        } else if err.is_timeout() {
            GatewayError::Upstream(format!("Upstream request timed out: {err}"))
        } else {
            GatewayError::Upstream(format!("Upstream request failed: {err}"))
        }
    }
}

impl From<GatewayError> for StatusCode {
    fn from(err: GatewayError) -> Self {
        err.status()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match &self {
            GatewayError::InvalidParam(name) => log::warn!("Invalid '{}' param", name),
            GatewayError::Configuration(msg) => log::error!("Config error: {}", msg),
            GatewayError::Upstream(msg) => log::error!("Transport error calling upstream: {}", msg),
            GatewayError::Rpc(raw) => log::warn!(
                "Upstream RPC error: code={} message={}",
                raw.get("code").unwrap_or(&Value::Null),
                raw.get("message").unwrap_or(&Value::Null)
            ),
            GatewayError::NotFound(path) => log::info!("No route for {}", path),
            GatewayError::Internal(detail) => log::error!("Unhandled error: {}", detail),
        }

        let status = self.status();
        (status, Json(Envelope::<()>::failure(self.detail()))).into_response()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
