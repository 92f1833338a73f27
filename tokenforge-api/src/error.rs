//! API error type and its HTTP mapping

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tokenforge_core::{
    rpc::RpcError,
    wire::ErrorResponse,
    AmountError, BuildError, CodecError,
};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("Solana RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Generic body attached to 5xx responses, swapped in when detail must stay hidden
#[derive(Debug, Clone)]
pub struct RedactedError(pub ErrorResponse);

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ApiError::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::RateLimited(_) | ApiError::Rpc(RpcError::RateLimited(_)) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            ApiError::Rpc(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body for this error; `hide_internal` replaces 5xx detail with a generic message
    pub fn body(&self, hide_internal: bool) -> ErrorResponse {
        let status = self.status();
        let error = if hide_internal && status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        ErrorResponse {
            error,
            code: status.as_u16(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl From<AmountError> for ApiError {
    fn from(err: AmountError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<BuildError> for ApiError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Program(e) => ApiError::Internal(format!("Failed to build instruction: {}", e)),
            other => ApiError::Validation(other.to_string()),
        }
    }
}

impl From<CodecError> for ApiError {
    fn from(err: CodecError) -> Self {
        ApiError::Internal(format!("Failed to serialize transaction: {}", err))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(format!("Invalid query: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }

        let mut response = (status, Json(self.body(false))).into_response();
        if status.is_server_error() {
            response.extensions_mut().insert(RedactedError(self.body(true)));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_status_codes() {
        assert_eq!(ApiError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Rpc(RpcError::RateLimited("429".into())).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::Rpc(RpcError::Transport("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn production_bodies_hide_internal_detail() {
        let err = ApiError::Internal("connection string leaked".into());
        assert_eq!(err.body(true).error, "Internal server error");
        assert!(err.body(false).error.contains("connection string"));

        let rejected = ApiError::validation("Invalid mint address");
        assert_eq!(rejected.body(true).error, "Invalid mint address");
    }

    #[test]
    fn server_errors_carry_redacted_body() {
        let response = ApiError::Internal("pool timed out".into()).into_response();
        let redacted = response.extensions().get::<RedactedError>();
        assert_eq!(redacted.map(|r| r.0.error.as_str()), Some("Internal server error"));

        let response = ApiError::not_found("Token not found").into_response();
        assert!(response.extensions().get::<RedactedError>().is_none());
    }

    #[test]
    fn amount_errors_are_validation_errors() {
        let err: ApiError = AmountError::Negative.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
