//! Access Guard: authentication, role, permission and tenant checks
//!
//! A request moves through `UNAUTHENTICATED -> AUTHENTICATED -> AUTHORIZED | DENIED`.
//! Every terminal outcome is reported to the injected [`SecurityEventLogger`].

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, Method};
use chrono::Utc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::application::errors::AccessError;
use crate::application::ports::{
    ClaimsEnricher, ClaimsResolver, ResolveError, SecurityEvent, SecurityEventLogger,
    SecurityEventType,
};
use crate::application::route_permissions::RoutePermissionTable;
use crate::domain::authorization::{
    check_organization_access, AuthContext, AuthorizationDecision, DecisionReason, Permission,
    RouteMetadata,
};
use crate::domain::value_objects::{Credential, CredentialSource, OrganizationId};

pub const DEFAULT_COOKIE_NAME: &str = "auth-token";
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

const ORGANIZATION_HEADER: &str = "x-organization-id";

/// The parts of an HTTP request the guard looks at
#[derive(Debug, Clone)]
pub struct GuardRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
}

impl GuardRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Bearer token from the Authorization header, else the named cookie
    pub fn credential(&self, cookie_name: &str) -> Option<Credential> {
        self.bearer_token()
            .map(|token| Credential::new(token, CredentialSource::AuthorizationHeader))
            .or_else(|| {
                self.cookie(cookie_name)
                    .map(|token| Credential::new(token, CredentialSource::Cookie))
            })
    }

    fn bearer_token(&self) -> Option<&str> {
        let value = self.headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
        let mut parts = value.split_ascii_whitespace();
        let scheme = parts.next()?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = parts.next()?;
        // A credential never carries interior whitespace
        parts.next().is_none().then_some(token)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(axum::http::header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, value)| *key == name && !value.is_empty())
            .map(|(_, value)| value)
    }

    /// Organization the request targets.
    ///
    /// Looks at the path segment after `organizations`, then the
    /// `organizationId`/`organization_id` query parameter, then the
    /// `x-organization-id` header.
    pub fn resource_organization_id(&self) -> Option<String> {
        self.organization_from_path()
            .or_else(|| self.organization_from_query())
            .or_else(|| self.organization_from_header())
    }

    fn organization_from_path(&self) -> Option<String> {
        let mut segments = self.path.split('/').filter(|s| !s.is_empty());
        while let Some(segment) = segments.next() {
            if segment == "organizations" {
                return segments.next().map(str::to_string);
            }
        }
        None
    }

    fn organization_from_query(&self) -> Option<String> {
        let query = self.query.as_deref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, value)| {
                (key == "organizationId" || key == "organization_id") && !value.is_empty()
            })
            .map(|(_, value)| value.into_owned())
    }

    fn organization_from_header(&self) -> Option<String> {
        self.headers
            .get(ORGANIZATION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone)]
pub struct AccessGuardConfig {
    pub cookie_name: String,
    /// Bound on each claims lookup; exceeding it is a verification failure
    pub lookup_timeout: Duration,
    /// Tolerance applied when re-checking `expires_at`
    pub clock_skew: Duration,
}

impl Default for AccessGuardConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            clock_skew: Duration::from_secs(30),
        }
    }
}

impl AccessGuardConfig {
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }
}

/// Decide whether an authenticated principal may use a route.
///
/// Checks run in order: minimum role, required permission, tenant scope.
pub fn authorize(
    context: &AuthContext,
    metadata: &RouteMetadata,
    required_permission: Option<Permission>,
    resource_organization: Option<&str>,
) -> AuthorizationDecision {
    if let Some(minimum) = metadata.minimum_role {
        if !context.role.satisfies(minimum) {
            return AuthorizationDecision::denied(
                DecisionReason::InsufficientPrivileges,
                required_permission,
            );
        }
    }

    if let Some(permission) = required_permission {
        if !context.has_permission(permission) {
            return AuthorizationDecision::denied(
                DecisionReason::PermissionDenied,
                Some(permission),
            );
        }
    }

    if metadata.tenant_scoped {
        if let Some(raw) = resource_organization {
            let decision = match OrganizationId::from_string(raw) {
                Ok(resource) => check_organization_access(
                    context.role,
                    context.organization_id.as_ref(),
                    Some(&resource),
                ),
                // Malformed ids never match a caller organization
                Err(_) if context.role.bypasses_tenant_isolation() => {
                    AuthorizationDecision::allowed()
                }
                Err(_) => {
                    AuthorizationDecision::denied(DecisionReason::OrganizationAccessDenied, None)
                }
            };
            if !decision.is_allowed() {
                return AuthorizationDecision::denied(
                    DecisionReason::OrganizationAccessDenied,
                    required_permission,
                );
            }
        }
    }

    match required_permission {
        Some(permission) => AuthorizationDecision::allowed_with(permission),
        None => AuthorizationDecision::allowed(),
    }
}

#[derive(Clone)]
pub struct AccessGuard {
    resolver: Arc<dyn ClaimsResolver>,
    enricher: Option<Arc<dyn ClaimsEnricher>>,
    routes: Arc<RoutePermissionTable>,
    events: Arc<dyn SecurityEventLogger>,
    config: AccessGuardConfig,
}

impl AccessGuard {
    pub fn new(
        resolver: Arc<dyn ClaimsResolver>,
        routes: Arc<RoutePermissionTable>,
        events: Arc<dyn SecurityEventLogger>,
        config: AccessGuardConfig,
    ) -> Self {
        Self {
            resolver,
            enricher: None,
            routes,
            events,
            config,
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn ClaimsEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn routes(&self) -> &RoutePermissionTable {
        &self.routes
    }

    /// Run the full guard pipeline for one request
    pub async fn evaluate(
        &self,
        request: &GuardRequest,
        metadata: &RouteMetadata,
    ) -> Result<AuthContext, AccessError> {
        let request_id = Uuid::new_v4();
        let event = |event_type: SecurityEventType| {
            SecurityEvent::new(event_type, request_id, request.method.as_str(), &request.path)
        };

        let Some(credential) = request.credential(&self.config.cookie_name) else {
            let error = AccessError::AuthenticationRequired;
            self.report(event(SecurityEventType::AuthenticationFailure).with_reason(error.code()))
                .await;
            return Err(error);
        };
        let fingerprint = credential.fingerprint();

        let context = match self.authenticate(&credential).await {
            Ok(context) => context.with_request_id(request_id),
            Err(error) => {
                let event_type = match error {
                    AccessError::Internal(ref detail) => {
                        error!(
                            request_id = %request_id,
                            credential = %fingerprint,
                            error = %detail,
                            "Authentication subsystem failure"
                        );
                        SecurityEventType::InternalError
                    }
                    _ => SecurityEventType::AuthenticationFailure,
                };
                self.report(
                    event(event_type)
                        .with_reason(error.code())
                        .with_fingerprint(fingerprint),
                )
                .await;
                return Err(error);
            }
        };

        self.report(
            event(SecurityEventType::AuthenticationSuccess)
                .with_principal(&context)
                .with_fingerprint(fingerprint.clone()),
        )
        .await;

        let required_permission = metadata
            .permission_override
            .or_else(|| self.routes.resolve(&request.path));
        let resource_organization = if metadata.tenant_scoped {
            request.resource_organization_id()
        } else {
            None
        };

        let decision = authorize(
            &context,
            metadata,
            required_permission,
            resource_organization.as_deref(),
        );

        let outcome = match decision.reason_code {
            DecisionReason::Granted => Ok(()),
            DecisionReason::InsufficientPrivileges => Err(AccessError::InsufficientPrivileges {
                required: metadata.minimum_role.unwrap_or(context.role),
            }),
            DecisionReason::PermissionDenied => Err(AccessError::PermissionDenied(
                decision.required_permission.unwrap_or(Permission::AdminAccess),
            )),
            DecisionReason::OrganizationAccessDenied => Err(AccessError::OrganizationAccessDenied),
        };

        let event_type = match &outcome {
            Ok(()) => SecurityEventType::AuthorizationGranted,
            Err(AccessError::OrganizationAccessDenied) => SecurityEventType::TenantViolation,
            Err(_) => SecurityEventType::AuthorizationDenied,
        };
        self.report(
            event(event_type)
                .with_principal(&context)
                .with_reason(decision.reason_code.as_str())
                .with_required_permission(required_permission)
                .with_resource_organization(resource_organization)
                .with_fingerprint(fingerprint),
        )
        .await;

        outcome.map(|()| context)
    }

    /// Resolve and optionally enrich claims, each step bounded by the lookup timeout
    async fn authenticate(&self, credential: &Credential) -> Result<AuthContext, AccessError> {
        let timeout = self.config.lookup_timeout;

        let claims = match tokio::time::timeout(timeout, self.resolver.resolve(credential)).await
        {
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Claims lookup timed out");
                return Err(AccessError::InvalidToken);
            }
            Ok(Err(ResolveError::KeyUnavailable(detail))) => {
                return Err(AccessError::Internal(detail));
            }
            Ok(Err(e)) => {
                debug!(error = %e, "Credential rejected");
                return Err(AccessError::InvalidToken);
            }
            Ok(Ok(claims)) => claims,
        };

        let skew = chrono::Duration::from_std(self.config.clock_skew).unwrap_or_default();
        if claims.is_expired_at(Utc::now() - skew) {
            return Err(AccessError::InvalidToken);
        }

        let mut context = AuthContext::from_claims(&claims);

        if let Some(enricher) = &self.enricher {
            let record = match tokio::time::timeout(timeout, enricher.lookup(&claims.user_id)).await
            {
                Err(_) => {
                    warn!(
                        timeout_ms = timeout.as_millis() as u64,
                        "Principal enrichment timed out"
                    );
                    return Err(AccessError::InvalidToken);
                }
                Ok(Err(e)) => return Err(AccessError::Internal(e.to_string())),
                Ok(Ok(record)) => record,
            };

            match record {
                Some(record) if record.active => {
                    if record.role != context.role && claims.permissions.is_empty() {
                        context.permissions =
                            record.role.default_permissions().iter().copied().collect();
                    }
                    context.role = record.role;
                    context.organization_id = record.organization_id;
                }
                _ => {
                    debug!(user_id = %claims.user_id, "Principal unknown or inactive");
                    return Err(AccessError::InvalidToken);
                }
            }
        }

        Ok(context)
    }

    async fn report(&self, event: SecurityEvent) {
        if let Err(e) = self.events.log_event(event).await {
            error!(error = %e, "Failed to record security event");
        }
    }
}
