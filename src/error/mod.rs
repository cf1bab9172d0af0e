use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::provider::ProviderError;
use crate::scheduling::ScheduleError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Caller input failed validation; the message names the violated fields.
    #[error("{0}")]
    Validation(String),

    /// The provider rejected the call or was unreachable; the message is the
    /// first remote error detail or the transport error text.
    #[error("{0}")]
    Provider(String),
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        AppError::Provider(e.detail())
    }
}

impl From<ScheduleError> for AppError {
    fn from(e: ScheduleError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Uniform failure envelope shared by every endpoint.
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Config(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Provider(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        // Always log the detailed error server-side
        tracing::error!(
            status = %status.as_u16(),
            message = %message,
            "API error"
        );

        let body = ErrorResponse {
            success: false,
            error: message,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_carries_first_detail() {
        let err: AppError = ProviderError::Api {
            status: 401,
            errors: vec!["Invalid key".to_string(), "second".to_string()],
        }
        .into();
        assert!(matches!(&err, AppError::Provider(msg) if msg == "Invalid key"));
    }

    #[test]
    fn test_schedule_error_maps_to_validation() {
        let err: AppError = ScheduleError::InvalidUnit("bogus".to_string()).into();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_status_mapping() {
        let response = AppError::Validation("Missing required fields: title".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::Provider("Invalid key".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
