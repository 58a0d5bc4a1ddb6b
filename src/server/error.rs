//! Error types for the REST API server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Startup name has no records
    StartupNotFound(String),
    /// Investor name matches no records
    InvestorNotFound(String),
    /// Invalid parameter in request (unknown field, aggregation, ...)
    InvalidParameter(String),
    /// The dataset could not be (re)loaded
    DatasetUnavailable(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::StartupNotFound(name) => write!(f, "Startup not found: {}", name),
            ApiError::InvestorNotFound(name) => write!(f, "Investor not found: {}", name),
            ApiError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            ApiError::DatasetUnavailable(msg) => write!(f, "Dataset unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::StartupNotFound(_) => (StatusCode::NOT_FOUND, "StartupNotFound"),
            ApiError::InvestorNotFound(_) => (StatusCode::NOT_FOUND, "InvestorNotFound"),
            ApiError::InvalidParameter(_) => (StatusCode::BAD_REQUEST, "InvalidParameter"),
            ApiError::DatasetUnavailable(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DatasetUnavailable")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();
        let message = match &self {
            ApiError::StartupNotFound(name) => format!("No funding records for startup '{}'", name),
            ApiError::InvestorNotFound(name) => {
                format!("No funding records mention investor '{}'", name)
            }
            ApiError::InvalidParameter(msg) | ApiError::DatasetUnavailable(msg) => msg.clone(),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": error_type,
            "message": message,
        }));

        (status, body).into_response()
    }
}

// Conversions from other error types

impl From<crate::views::ViewError> for ApiError {
    fn from(err: crate::views::ViewError) -> Self {
        match err {
            crate::views::ViewError::StartupNotFound(name) => ApiError::StartupNotFound(name),
            crate::views::ViewError::InvestorNotFound(name) => ApiError::InvestorNotFound(name),
        }
    }
}

impl From<crate::aggregation::AggregationError> for ApiError {
    fn from(err: crate::aggregation::AggregationError) -> Self {
        ApiError::InvalidParameter(err.to_string())
    }
}

impl From<crate::dataset::DatasetError> for ApiError {
    fn from(err: crate::dataset::DatasetError) -> Self {
        ApiError::DatasetUnavailable(err.to_string())
    }
}
