//! Admin console routes. They sit behind the guard and only report what the
//! guard established.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::middleware::{
    input_sanitization::{sanitize_field_name, sanitize_pagination, sanitize_plain_text},
    require_organization_access, Authenticated,
};
use crate::api::router::AppState;
use crate::application::ports::SecurityEvent;
use crate::domain::authorization::{AuthContext, Permission, Role};

/// Principal as reported to the console
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub organization_id: Option<String>,
    /// Sorted by wire name
    pub permissions: Vec<Permission>,
    pub request_id: String,
}

impl From<&AuthContext> for SessionResponse {
    fn from(context: &AuthContext) -> Self {
        let mut permissions: Vec<Permission> = context.permissions.iter().copied().collect();
        permissions.sort_by_key(|p| p.as_str());

        Self {
            user_id: context.user_id.clone(),
            email: context.email.clone(),
            role: context.role,
            organization_id: context.organization_id.as_ref().map(|o| o.to_string()),
            permissions,
            request_id: context.request_id.to_string(),
        }
    }
}

/// GET /api/admin/session
pub async fn session_handler(Authenticated(context): Authenticated) -> Json<SessionResponse> {
    Json(SessionResponse::from(&context))
}

/// GET /api/admin/users
pub async fn users_handler(Authenticated(context): Authenticated) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "organization_id": context.organization_id.as_ref().map(|o| o.to_string()),
        "scope": if context.is_super_admin() { "all" } else { "organization" },
        "users": [],
    }))
}

/// GET /api/admin/organizations/{organization_id}
pub async fn organization_handler(
    Authenticated(context): Authenticated,
    Path(organization_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_organization_access(&context, Some(organization_id.as_str()))?;

    Ok(Json(serde_json::json!({
        "organization_id": sanitize_field_name(Some(organization_id.as_str())),
        "accessed_by": context.user_id,
        "cross_organization": context
            .organization_id
            .as_ref()
            .map(|own| own.as_str() != organization_id)
            .unwrap_or(true),
    })))
}

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuditLogResponse {
    pub events: Vec<SecurityEvent>,
    pub total_recorded: usize,
}

/// GET /api/admin/audit-logs
/// Most recent security events, newest last
pub async fn audit_logs_handler(
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> Json<AuditLogResponse> {
    let pagination = sanitize_pagination(None, query.limit.as_deref());
    Json(AuditLogResponse {
        events: state.recorder.recent(pagination.limit as usize),
        total_recorded: state.recorder.len(),
    })
}

/// DELETE /api/admin/audit-logs
pub async fn reset_audit_logs_handler(
    State(state): State<AppState>,
    Authenticated(context): Authenticated,
) -> StatusCode {
    tracing::warn!(user_id = %context.user_id, "Security event log reset");
    state.recorder.reset();
    StatusCode::NO_CONTENT
}

/// GET /api/admin/billing
pub async fn billing_handler(Authenticated(context): Authenticated) -> Json<serde_json::Value> {
    billing_summary(&context, None)
}

/// GET /api/admin/billing/{*section}
pub async fn billing_section_handler(
    Authenticated(context): Authenticated,
    Path(section): Path<String>,
) -> Json<serde_json::Value> {
    billing_summary(&context, Some(section.as_str()))
}

fn billing_summary(context: &AuthContext, section: Option<&str>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "section": sanitize_plain_text(section),
        "organization_id": context.organization_id.as_ref().map(|o| o.to_string()),
    }))
}
