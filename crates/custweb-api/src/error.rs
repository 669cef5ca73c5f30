//! Error types for custweb-api
//!
//! Page and HTMX handlers answer errors as a notice fragment; `/api`
//! handlers wrap the same error in `JsonError` and answer `ErrorDetails`.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use custweb_core::{CoreError, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Core(error) => match error.code() {
                ErrorCode::CustomerNotFound => StatusCode::NOT_FOUND,
                ErrorCode::InvalidRange | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorCode::NetworkFailure => StatusCode::BAD_GATEWAY,
            },
        }
    }

    /// Text shown in the console
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { resource } => format!("找不到 {}", resource),
            ApiError::Core(CoreError::CustomerNotFound { id }) => format!("找不到客户 {}", id),
            ApiError::Core(error) => error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::warn!(target: "custweb::api", "{}", self);
        }
        let body = crate::notice_html("error", &self.user_message());
        (status, Html(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// An `ApiError` answered as JSON
#[derive(Debug)]
pub struct JsonError(pub ApiError);

impl From<ApiError> for JsonError {
    fn from(error: ApiError) -> Self {
        JsonError(error)
    }
}

impl From<CoreError> for JsonError {
    fn from(error: CoreError) -> Self {
        JsonError(ApiError::Core(error))
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        let status = self.0.status();
        match self.0 {
            ApiError::NotFound { resource } => (
                status,
                Json(serde_json::json!({
                    "code": "NOT_FOUND",
                    "message": format!("Not found: {}", resource),
                })),
            )
                .into_response(),
            ApiError::Core(error) => {
                let details = error.to_details();
                if status.is_server_error() {
                    log::warn!(target: "custweb::api", "{}", details);
                }
                (status, Json(details)).into_response()
            }
        }
    }
}

pub type JsonResult<T> = Result<Json<T>, JsonError>;
