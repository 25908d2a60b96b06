use crate::helpers::{create_json_response, internal_error_response};
use hyper::{Response, StatusCode};
use serde_json::json;
use tc_db::StorageError;
use tp_types::KeyParseError;

/// Request-terminal errors of the gateway routes.
///
/// Limit sanitization is not an error: out-of-range limits are answered
/// with a redirect before a handler can fail.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("Internal server error")]
    InternalServerError,
}

impl GatewayError {
    pub fn not_found() -> Self {
        Self::NotFound("no resource exists with the supplied id".to_string())
    }
}

impl From<StorageError> for GatewayError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound => Self::not_found(),
            StorageError::Store(e) => {
                tracing::error!(target: "gateway_errors", "Storage error: {e}");
                Self::InternalServerError
            }
        }
    }
}

impl From<KeyParseError> for GatewayError {
    fn from(e: KeyParseError) -> Self {
        Self::InvalidArgument(e.to_string())
    }
}

impl From<GatewayError> for Response<String> {
    fn from(e: GatewayError) -> Response<String> {
        match e {
            GatewayError::NotFound(message) => create_json_response(
                StatusCode::NOT_FOUND,
                &json!({ "code": "ResourceNotFound", "message": message }),
            ),
            GatewayError::InvalidArgument(message) => create_json_response(
                StatusCode::CONFLICT,
                &json!({ "code": "InvalidArgument", "message": message }),
            ),
            // The message stays redacted; details were already logged.
            GatewayError::InternalServerError => internal_error_response(),
        }
    }
}
