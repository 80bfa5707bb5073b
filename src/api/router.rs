use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::header,
    routing::{delete, get, post},
    Router,
};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;

use crate::api::handlers::{
    audit_logs_handler, billing_handler, billing_section_handler, health_handler,
    intake_handler, organization_handler, reset_audit_logs_handler, search_handler,
    session_handler, users_handler,
};
use crate::api::middleware::{guard, input_sanitization::InputSanitizationConfig, InputSanitizationLayer};
use crate::application::access_guard::AccessGuard;
use crate::domain::authorization::{Permission, Role, RouteMetadata};
use crate::domain::errors::DomainError;
use crate::infrastructure::security_events::InMemorySecurityEventRecorder;

pub const DEFAULT_MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Every guarded route; each must have its own entry in the permission table
pub const PROTECTED_ROUTES: &[&str] = &[
    "/api/admin/session",
    "/api/admin/users",
    "/api/admin/organizations/{organization_id}",
    "/api/admin/audit-logs",
    "/api/admin/billing",
    "/api/admin/billing/{*section}",
    "/api/organizations/{organization_id}/intake",
    "/api/organizations/{organization_id}/cases/search",
];

/// Application state container
#[derive(Clone)]
pub struct AppState {
    pub guard: Arc<AccessGuard>,
    pub recorder: Arc<InMemorySecurityEventRecorder>,
    pub sanitization: Arc<InputSanitizationConfig>,
    pub max_request_body_bytes: usize,
}

impl AppState {
    pub fn new(guard: Arc<AccessGuard>, recorder: Arc<InMemorySecurityEventRecorder>) -> Self {
        Self {
            guard,
            recorder,
            sanitization: Arc::new(InputSanitizationConfig::default()),
            max_request_body_bytes: DEFAULT_MAX_REQUEST_BODY_BYTES,
        }
    }

    pub fn with_sanitization(mut self, config: InputSanitizationConfig) -> Self {
        self.sanitization = Arc::new(config);
        self
    }

    pub fn with_max_request_body_bytes(mut self, limit: usize) -> Self {
        self.max_request_body_bytes = limit;
        self
    }
}

/// Create router with all routes and middleware.
///
/// Fails when a guarded route has no explicit permission mapping.
pub fn create_router(state: AppState) -> Result<Router, DomainError> {
    state
        .guard
        .routes()
        .verify_coverage(PROTECTED_ROUTES.iter().copied())?;

    let access = &state.guard;
    let admin = RouteMetadata::admin();
    let tenant_admin = RouteMetadata::admin().tenant_scoped();
    let root_only = RouteMetadata::admin().with_minimum_role(Role::SuperAdmin);
    let case_reader = RouteMetadata::authenticated().tenant_scoped();
    let case_writer = RouteMetadata::authenticated()
        .with_permission(Permission::CasesWrite)
        .tenant_scoped();

    let router = Router::new()
        // Health check (no auth required)
        .route("/health", get(health_handler))
        // Admin console
        .route(
            "/api/admin/session",
            get(session_handler).route_layer(guard(access, admin)),
        )
        .route(
            "/api/admin/users",
            get(users_handler).route_layer(guard(access, admin)),
        )
        .route(
            "/api/admin/organizations/{organization_id}",
            get(organization_handler).route_layer(guard(access, tenant_admin)),
        )
        .route(
            "/api/admin/audit-logs",
            get(audit_logs_handler)
                .route_layer(guard(access, admin))
                .merge(delete(reset_audit_logs_handler).route_layer(guard(access, root_only))),
        )
        .route(
            "/api/admin/billing",
            get(billing_handler).route_layer(guard(access, admin)),
        )
        .route(
            "/api/admin/billing/{*section}",
            get(billing_section_handler).route_layer(guard(access, admin)),
        )
        // Tenant routes
        .route(
            "/api/organizations/{organization_id}/intake",
            post(intake_handler).route_layer(guard(access, case_writer)),
        )
        .route(
            "/api/organizations/{organization_id}/cases/search",
            get(search_handler).route_layer(guard(access, case_reader)),
        )
        // Innermost first: body limit, request screening, then header redaction
        .layer(DefaultBodyLimit::max(state.max_request_body_bytes))
        .layer(InputSanitizationLayer::new((*state.sanitization).clone()))
        .layer(SetSensitiveRequestHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]))
        .with_state(state);

    Ok(router)
}
