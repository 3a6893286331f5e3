use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::catalog::CatalogError;
use crate::application::error::ErrorReport;

/// Request-layer error with an attached diagnostic report.
///
/// Not-found responses carry no body; server-side failures carry a short
/// static message. Details stay in the `ErrorReport` consumed by the
/// logging middleware.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    public_message: Option<&'static str>,
    report: ErrorReport,
}

impl ApiError {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            public_message: None,
            report: ErrorReport::from_message(
                "infra::http::books",
                StatusCode::NOT_FOUND,
                detail,
            ),
        }
    }

    fn unavailable(error: &CatalogError) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            public_message: Some("Service temporarily unavailable"),
            report: ErrorReport::from_error(
                "infra::http::books",
                StatusCode::SERVICE_UNAVAILABLE,
                error,
            ),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::NotFound { .. } => ApiError::not_found(error.to_string()),
            CatalogError::Repo(_) => ApiError::unavailable(&error),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = match self.public_message {
            Some(message) => (self.status, message).into_response(),
            None => self.status.into_response(),
        };
        self.report.attach(&mut response);
        response
    }
}
