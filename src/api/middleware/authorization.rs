//! Request-side helpers for authorization: guard input, the authenticated
//! principal extractor and the handler-level tenant check

use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
};

use crate::application::access_guard::GuardRequest;
use crate::application::errors::AccessError;
use crate::domain::authorization::{AuthContext, Permission};
use crate::domain::value_objects::OrganizationId;

/// Snapshot of the request parts the guard inspects
pub fn guard_request_from(request: &Request) -> GuardRequest {
    GuardRequest {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
        headers: request.headers().clone(),
    }
}

/// Principal attached by the access guard
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthContext);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .map(Authenticated)
            .ok_or(AccessError::AuthenticationRequired)
    }
}

/// Tenant check for handlers that load a resource themselves
pub fn require_organization_access(
    context: &AuthContext,
    resource_organization: Option<&str>,
) -> Result<(), AccessError> {
    let resource = match resource_organization {
        None => return Ok(()),
        Some(raw) => match OrganizationId::from_string(raw) {
            Ok(id) => id,
            Err(_) if context.is_super_admin() => return Ok(()),
            Err(_) => return Err(AccessError::OrganizationAccessDenied),
        },
    };

    if context.check_organization_access(Some(&resource)).is_allowed() {
        Ok(())
    } else {
        Err(AccessError::OrganizationAccessDenied)
    }
}

/// Permission check for handlers with finer-grained needs than their route
pub fn require_permission(context: &AuthContext, permission: Permission) -> Result<(), AccessError> {
    if context.has_permission(permission) {
        Ok(())
    } else {
        Err(AccessError::PermissionDenied(permission))
    }
}
