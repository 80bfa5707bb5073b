//! Security event types and the logger port
//!
//! Every terminal Access Guard outcome produces one [`SecurityEvent`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::authorization::{AuthContext, Permission, Role};

/// Security event types for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventType {
    AuthenticationSuccess,
    AuthenticationFailure,
    AuthorizationGranted,
    AuthorizationDenied,
    TenantViolation,
    InternalError,
}

impl SecurityEventType {
    /// Failures worth a warning in the log
    pub fn is_failure(&self) -> bool {
        !matches!(
            self,
            SecurityEventType::AuthenticationSuccess | SecurityEventType::AuthorizationGranted
        )
    }
}

impl std::fmt::Display for SecurityEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityEventType::AuthenticationSuccess => write!(f, "authentication_success"),
            SecurityEventType::AuthenticationFailure => write!(f, "authentication_failure"),
            SecurityEventType::AuthorizationGranted => write!(f, "authorization_granted"),
            SecurityEventType::AuthorizationDenied => write!(f, "authorization_denied"),
            SecurityEventType::TenantViolation => write!(f, "tenant_violation"),
            SecurityEventType::InternalError => write!(f, "internal_error"),
        }
    }
}

/// One guard outcome
#[derive(Debug, Clone, Serialize)]
pub struct SecurityEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: SecurityEventType,
    pub request_id: Uuid,
    pub method: String,
    pub path: String,
    pub user_id: Option<String>,
    pub role: Option<Role>,
    pub organization_id: Option<String>,
    pub resource_organization_id: Option<String>,
    pub reason_code: Option<String>,
    pub required_permission: Option<Permission>,
    /// Short SHA-256 prefix; the credential itself is never recorded
    pub credential_fingerprint: Option<String>,
}

impl SecurityEvent {
    pub fn new(
        event_type: SecurityEventType,
        request_id: Uuid,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            request_id,
            method: method.into(),
            path: path.into(),
            user_id: None,
            role: None,
            organization_id: None,
            resource_organization_id: None,
            reason_code: None,
            required_permission: None,
            credential_fingerprint: None,
        }
    }

    pub fn with_principal(mut self, context: &AuthContext) -> Self {
        self.user_id = Some(context.user_id.clone());
        self.role = Some(context.role);
        self.organization_id = context.organization_id.as_ref().map(|o| o.to_string());
        self
    }

    pub fn with_reason(mut self, reason_code: impl Into<String>) -> Self {
        self.reason_code = Some(reason_code.into());
        self
    }

    pub fn with_required_permission(mut self, permission: Option<Permission>) -> Self {
        self.required_permission = permission;
        self
    }

    pub fn with_resource_organization(mut self, organization_id: Option<String>) -> Self {
        self.resource_organization_id = organization_id;
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.credential_fingerprint = Some(fingerprint.into());
        self
    }
}

/// Security event logger error
#[derive(Debug, thiserror::Error)]
pub enum SecurityEventError {
    #[error("Event sink unavailable: {0}")]
    Unavailable(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Security event logger trait for pluggable backends
#[async_trait]
pub trait SecurityEventLogger: Send + Sync {
    async fn log_event(&self, event: SecurityEvent) -> Result<(), SecurityEventError>;
}
