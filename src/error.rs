//! Error types for the catalog core and its HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors raised by the catalog core and the upstream hub client.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("upstream request to {url} failed: {message}")]
    Upstream { url: String, message: String },

    #[error("upstream {url} answered with status {status}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("source rule '{label}' (#{index}) is shadowed by earlier rule '{shadowed_by}'")]
    RuleShadowed {
        index: usize,
        label: String,
        shadowed_by: String,
    },

    #[error("source rule '{label}' does not match its own sample '{sample}'")]
    RuleSample { label: String, sample: String },

    #[error("invalid pattern for '{label}': {source}")]
    Pattern {
        label: String,
        #[source]
        source: regex::Error,
    },

    #[error("benchmark data error: {0}")]
    BenchmarkData(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// HTTP-facing error, rendered as a JSON body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        match &err {
            CatalogError::InvalidArgument(_) => ApiError::bad_request(err.to_string()),
            CatalogError::Upstream { .. } | CatalogError::UpstreamStatus { .. } => ApiError {
                status: StatusCode::BAD_GATEWAY,
                message: err.to_string(),
            },
            _ => ApiError::internal(err.to_string()),
        }
    }
}
