use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::middleware::{
    field_errors_from,
    input_sanitization::{
        sanitize_email_address, sanitize_file_name, sanitize_markup, sanitize_phone_number,
        sanitize_plain_text, sanitize_url, validate_email_address, validate_phone_number,
        MarkupLevel, Sanitizer,
    },
    require_permission, validate_and_respond, Authenticated, ValidationErrorResponse,
};
use crate::api::router::AppState;
use crate::domain::authorization::Permission;

/// Client intake form as submitted
#[derive(Debug, Deserialize, Validate)]
pub struct IntakeRequest {
    #[validate(length(min = 1, max = 200, message = "Client name must be 1 to 200 characters"))]
    pub client_name: String,
    #[validate(length(max = 254, message = "Email must be at most 254 characters"))]
    pub email: String,
    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 2048, message = "Website must be at most 2048 characters"))]
    pub website: Option<String>,
    #[validate(length(max = 20000, message = "Notes must be at most 20000 characters"))]
    pub notes: Option<String>,
    pub attachment_name: Option<String>,
    /// Free-form structured answers
    #[serde(default)]
    pub details: Value,
}

#[derive(Debug, Serialize)]
pub struct IntakeResponse {
    pub organization_id: String,
    pub submitted_by: String,
    pub client_name: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub notes: String,
    pub attachment_name: String,
    pub details: Value,
}

/// POST /api/organizations/{organization_id}/intake
///
/// Attaching a document additionally needs `documents:write`.
pub async fn intake_handler(
    State(state): State<AppState>,
    Authenticated(context): Authenticated,
    Path(organization_id): Path<String>,
    Json(request): Json<IntakeRequest>,
) -> Response {
    if let Err((status, response)) = validate_and_respond(&request) {
        return (status, Json(response)).into_response();
    }

    if request.attachment_name.is_some() {
        if let Err(denied) = require_permission(&context, Permission::DocumentsWrite) {
            tracing::warn!(
                request_id = %context.request_id,
                user_id = %context.user_id,
                "Intake attachment refused"
            );
            return ApiError::from(denied).into_response();
        }
    }

    let mut field_errors =
        field_errors_from("email", &validate_email_address(Some(request.email.as_str())));
    if let Some(phone) = request.phone.as_deref() {
        field_errors.extend(field_errors_from("phone", &validate_phone_number(Some(phone))));
    }
    if !field_errors.is_empty() {
        tracing::info!(
            request_id = %context.request_id,
            rejected_fields = field_errors.len(),
            "Intake rejected by validator"
        );
        return ValidationErrorResponse::new(field_errors).into_response();
    }

    let response = IntakeResponse {
        organization_id,
        submitted_by: context.user_id,
        client_name: sanitize_plain_text(Some(request.client_name.as_str())),
        email: sanitize_email_address(Some(request.email.as_str())),
        phone: sanitize_phone_number(request.phone.as_deref()),
        website: sanitize_url(request.website.as_deref()),
        notes: sanitize_markup(request.notes.as_deref(), MarkupLevel::Rich),
        attachment_name: sanitize_file_name(request.attachment_name.as_deref()),
        details: Sanitizer::sanitize_deep_within(request.details, 0, state.sanitization.max_depth),
    };

    (StatusCode::CREATED, Json(response)).into_response()
}
