use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::errors::AccessError;

/// Error body shared by every failure response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    pub message: String,
}

/// API error response
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

pub(crate) fn error_body(status: StatusCode, code: &str, message: impl Into<String>) -> ErrorBody {
    ErrorBody {
        error: status
            .canonical_reason()
            .unwrap_or("Error")
            .to_string(),
        code: code.to_string(),
        message: message.into(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = error_body(self.status, self.code, self.message);
        (self.status, Json(body)).into_response()
    }
}

impl AccessError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccessError::AuthenticationRequired | AccessError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AccessError::InsufficientPrivileges { .. }
            | AccessError::PermissionDenied(_)
            | AccessError::OrganizationAccessDenied => StatusCode::FORBIDDEN,
            AccessError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = error_body(status, self.code(), self.public_message());
        (status, Json(body)).into_response()
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        ApiError::new(err.status_code(), err.code(), err.public_message())
    }
}
