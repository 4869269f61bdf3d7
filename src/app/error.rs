use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::CatalogError;

/// JSON error body: `{"error": "...", "code": "NOT_FOUND"}`.
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub code: &'static str,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", message)
    }

    pub fn unknown_endpoint() -> Self {
        Self::not_found("Endpoint não encontrado")
    }

    pub const fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiErrorBody {
                error: self.message,
                code: self.code,
            }),
        )
            .into_response()
    }
}

impl From<CatalogError> for ApiError {
    fn from(value: CatalogError) -> Self {
        let message = value.to_string();
        match value {
            CatalogError::NoDataLoaded
            | CatalogError::SourceUnavailable { .. }
            | CatalogError::InstitutionNotFound(_)
            | CatalogError::SemesterNotFound { .. } => Self::not_found(message),
            CatalogError::Parse { .. }
            | CatalogError::EmptyCatalog { .. }
            | CatalogError::Reload(_) => Self::internal(message),
        }
    }
}
