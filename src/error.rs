use crate::abi::AbiError;
use crate::etherscan::EtherscanError;
use crate::queries::QueryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("upstream error: {0}")]
    Upstream(#[from] EtherscanError),
    #[error("malformed ABI: {0}")]
    MalformedAbi(#[from] AbiError),
    #[error("{0}")]
    Render(QueryError),
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Abi(err) => ApiError::MalformedAbi(err),
            other => ApiError::Render(other),
        }
    }
}

impl ApiError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Upstream(_) => "UPSTREAM_ERROR",
            ApiError::MalformedAbi(_) => "MALFORMED_ABI",
            ApiError::Render(_) => "RENDER_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::MalformedAbi(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error_code": self.error_code(),
            "error_message": self.to_string(),
        });

        (self.status_code(), Json(body)).into_response()
    }
}
