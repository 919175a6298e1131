/// Error types for Discovery Service
///
/// Data-source and timeout failures map to 503 so clients can offer a retry;
/// everything else is a 500.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::time::Duration;
use thiserror::Error;

/// Result type for discovery-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Catalog backend returned an error or an unreadable body
    #[error("Data source error: {0}")]
    DataSource(String),

    /// Catalog backend did not answer in time
    #[error("Data source timed out after {0:?}")]
    Timeout(Duration),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// True for failures of the external catalog backend.
    pub fn is_upstream(&self) -> bool {
        matches!(self, AppError::DataSource(_) | AppError::Timeout(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        if self.is_upstream() {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::DataSource(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::DataSource(format!("invalid payload: {}", err))
    }
}
