//! API error handling
//!
//! Every error renders as `{code, msg}` JSON. Provider failures never reach
//! this layer for the advisor tasks; they only surface from `/embed`, which
//! has no fallback value.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use finsight_advisor::AdvisorError;
use finsight_llm::LLMError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Request Errors (1000-1099)
    // =========================================================================
    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // =========================================================================
    // Service Errors (5000-5099)
    // =========================================================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream model error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn error_code(&self) -> i32 {
        match self {
            Self::InvalidRequestBody(_) => 1000,
            Self::BadRequest(_) => 1001,
            Self::ValidationError(_) => 1002,
            Self::NotFound(_) => 1004,
            Self::Configuration(_) => 5001,
            Self::Upstream(_) => 5002,
            Self::Internal(_) => 5000,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) | Self::BadRequest(_) | Self::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Numeric error code
    pub code: i32,
    /// Human-readable error message
    pub msg: String,
    /// Request ID for tracking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.error_code(),
            msg: err.to_string(),
            request_id: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "Request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "Request rejected");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<AdvisorError> for ApiError {
    fn from(err: AdvisorError) -> Self {
        match err {
            AdvisorError::Configuration { message } => Self::Configuration(message),
            AdvisorError::Store { message } => Self::Internal(message),
        }
    }
}

impl From<LLMError> for ApiError {
    fn from(err: LLMError) -> Self {
        match err {
            LLMError::Configuration { message } => Self::Configuration(message),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<finsight_types::TypesError> for ApiError {
    fn from(err: finsight_types::TypesError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(format_validation_errors(&err))
    }
}

/// Flatten validation errors into one readable line
pub fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .errors()
        .iter()
        .flat_map(|(field, kind)| match kind {
            validator::ValidationErrorsKind::Field(errs) => errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field}: validation failed"))
                })
                .collect::<Vec<_>>(),
            validator::ValidationErrorsKind::Struct(inner) => {
                vec![format!("{field}: {}", format_validation_errors(inner))]
            }
            validator::ValidationErrorsKind::List(items) => items
                .iter()
                .map(|(index, inner)| format!("{field}[{index}]: {}", format_validation_errors(inner)))
                .collect(),
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Configuration("no key".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::Upstream("x".into()).status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_advisor_configuration_maps_to_503() {
        let err: ApiError = AdvisorError::Configuration {
            message: "No LLM client configured".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_code(), 5001);
    }

    #[test]
    fn test_llm_error_mapping() {
        let err: ApiError = LLMError::Timeout { after_ms: 100 }.into();
        assert!(matches!(err, ApiError::Upstream(_)));
        let err: ApiError = LLMError::configuration("missing key").into();
        assert!(matches!(err, ApiError::Configuration(_)));
    }
}
