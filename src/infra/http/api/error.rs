use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::error::ErrorReport;
use crate::application::listings::ListingError;
use crate::application::repos::RepoError;
use crate::domain::error::DomainError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub success: bool,
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const BAD_REQUEST: &str = "bad_request";
    pub const INVALID_PARAMETER: &str = "invalid_parameter";
    pub const VALIDATION: &str = "validation_failed";
    pub const NOT_FOUND: &str = "not_found";
    pub const DUPLICATE: &str = "duplicate";
    pub const INVALID_INPUT: &str = "invalid_input";
    pub const INTEGRITY: &str = "integrity_error";
    pub const DB_TIMEOUT: &str = "db_timeout";
    pub const DB_UNAVAILABLE: &str = "db_unavailable";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
    hint: Option<String>,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: &'static str,
        message: &'static str,
        hint: Option<String>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            hint,
            detail: None,
        }
    }

    /// Diagnostic kept out of the response body but logged with it.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn bad_request(message: &'static str, hint: Option<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::BAD_REQUEST, message, hint)
    }

    pub fn not_found(message: &'static str) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message, None)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let diagnostic = self
            .detail
            .clone()
            .or_else(|| self.hint.clone())
            .unwrap_or_else(|| self.message.to_string());
        let body = ApiErrorBody {
            success: false,
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message.to_string(),
                hint: self.hint,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        ErrorReport::from_message(
            "infra::http::api",
            self.status,
            format!("{}: {diagnostic}", self.code),
        )
        .attach(&mut response);
        response
    }
}

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        match err {
            ListingError::Query(err) => ApiError::new(
                StatusCode::BAD_REQUEST,
                codes::INVALID_PARAMETER,
                "Invalid search parameter",
                Some(format!("{}: {err}", err.parameter())),
            ),
            ListingError::Domain(DomainError::Validation { field, message }) => ApiError::new(
                StatusCode::BAD_REQUEST,
                codes::VALIDATION,
                "Listing is invalid",
                Some(format!("{field}: {message}")),
            ),
            ListingError::NotFound(id) => ApiError::new(
                StatusCode::NOT_FOUND,
                codes::NOT_FOUND,
                "Listing not found",
                Some(id.to_string()),
            ),
            ListingError::Repo(err) => repo_to_api(err),
        }
    }
}

pub fn repo_to_api(err: RepoError) -> ApiError {
    match err {
        RepoError::Duplicate { constraint } => ApiError::new(
            StatusCode::CONFLICT,
            codes::DUPLICATE,
            "Duplicate record",
            Some(constraint),
        ),
        RepoError::NotFound => ApiError::not_found("resource not found"),
        RepoError::InvalidInput { message } => ApiError::new(
            StatusCode::BAD_REQUEST,
            codes::INVALID_INPUT,
            "Invalid input",
            Some(message),
        ),
        RepoError::Integrity { message } => ApiError::new(
            StatusCode::CONFLICT,
            codes::INTEGRITY,
            "Integrity constraint violated",
            Some(message),
        ),
        RepoError::Timeout => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_TIMEOUT,
            "Database timeout",
            None,
        ),
        RepoError::Persistence(message) => ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            codes::DB_UNAVAILABLE,
            "Listing store unavailable",
            None,
        )
        .with_detail(message),
    }
}
