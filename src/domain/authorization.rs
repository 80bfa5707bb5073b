use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::claims::Claims;
use crate::domain::errors::DomainError;
use crate::domain::value_objects::OrganizationId;

/// Permission tags for the practice management system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "admin:access")]
    AdminAccess,
    #[serde(rename = "users:read")]
    UsersRead,
    #[serde(rename = "users:write")]
    UsersWrite,
    #[serde(rename = "organizations:read")]
    OrganizationsRead,
    #[serde(rename = "organizations:write")]
    OrganizationsWrite,
    #[serde(rename = "billing:read")]
    BillingRead,
    #[serde(rename = "billing:write")]
    BillingWrite,
    #[serde(rename = "audit:read")]
    AuditRead,
    #[serde(rename = "analytics:read")]
    AnalyticsRead,
    #[serde(rename = "settings:write")]
    SettingsWrite,
    #[serde(rename = "cases:read")]
    CasesRead,
    #[serde(rename = "cases:write")]
    CasesWrite,
    #[serde(rename = "documents:read")]
    DocumentsRead,
    #[serde(rename = "documents:write")]
    DocumentsWrite,
}

impl Permission {
    pub const ALL: &'static [Permission] = &[
        Permission::AdminAccess,
        Permission::UsersRead,
        Permission::UsersWrite,
        Permission::OrganizationsRead,
        Permission::OrganizationsWrite,
        Permission::BillingRead,
        Permission::BillingWrite,
        Permission::AuditRead,
        Permission::AnalyticsRead,
        Permission::SettingsWrite,
        Permission::CasesRead,
        Permission::CasesWrite,
        Permission::DocumentsRead,
        Permission::DocumentsWrite,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::AdminAccess => "admin:access",
            Permission::UsersRead => "users:read",
            Permission::UsersWrite => "users:write",
            Permission::OrganizationsRead => "organizations:read",
            Permission::OrganizationsWrite => "organizations:write",
            Permission::BillingRead => "billing:read",
            Permission::BillingWrite => "billing:write",
            Permission::AuditRead => "audit:read",
            Permission::AnalyticsRead => "analytics:read",
            Permission::SettingsWrite => "settings:write",
            Permission::CasesRead => "cases:read",
            Permission::CasesWrite => "cases:write",
            Permission::DocumentsRead => "documents:read",
            Permission::DocumentsWrite => "documents:write",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| DomainError::InvalidPermission(s.to_string()))
    }
}

/// Principal roles, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    FirmAdmin,
    Attorney,
    Paralegal,
    Staff,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::FirmAdmin => "FIRM_ADMIN",
            Role::Attorney => "ATTORNEY",
            Role::Paralegal => "PARALEGAL",
            Role::Staff => "STAFF",
            Role::Client => "CLIENT",
        }
    }

    /// Higher is more privileged
    pub fn rank(&self) -> u8 {
        match self {
            Role::SuperAdmin => 100,
            Role::FirmAdmin => 80,
            Role::Attorney => 60,
            Role::Paralegal => 40,
            Role::Staff => 20,
            Role::Client => 10,
        }
    }

    pub fn satisfies(&self, minimum: Role) -> bool {
        self.rank() >= minimum.rank()
    }

    /// Only the top-level role may cross organization boundaries
    pub fn bypasses_tenant_isolation(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }

    /// Permissions granted when a credential carries no explicit list
    pub fn default_permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Role::SuperAdmin => Permission::ALL,
            Role::FirmAdmin => &[
                AdminAccess,
                UsersRead,
                UsersWrite,
                OrganizationsRead,
                OrganizationsWrite,
                BillingRead,
                BillingWrite,
                AuditRead,
                AnalyticsRead,
                CasesRead,
                CasesWrite,
                DocumentsRead,
                DocumentsWrite,
            ],
            Role::Attorney => &[CasesRead, CasesWrite, DocumentsRead, DocumentsWrite, BillingRead],
            Role::Paralegal => &[CasesRead, CasesWrite, DocumentsRead, DocumentsWrite],
            Role::Staff => &[CasesRead, DocumentsRead],
            Role::Client => &[CasesRead, DocumentsRead],
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            "FIRM_ADMIN" => Ok(Role::FirmAdmin),
            "ATTORNEY" => Ok(Role::Attorney),
            "PARALEGAL" => Ok(Role::Paralegal),
            "STAFF" => Ok(Role::Staff),
            "CLIENT" => Ok(Role::Client),
            _ => Err(DomainError::InvalidRole(s.to_string())),
        }
    }
}

/// Authenticated principal attached to a request for downstream handlers
#[derive(Debug, Clone, Serialize)]
pub struct AuthContext {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub organization_id: Option<OrganizationId>,
    pub permissions: HashSet<Permission>,
    pub request_id: Uuid,
}

impl AuthContext {
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id.clone(),
            email: claims.email.clone(),
            role: claims.role,
            organization_id: claims.organization_id.clone(),
            permissions: claims.effective_permissions(),
            request_id: Uuid::new_v4(),
        }
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    /// Tenant isolation check for a resource loaded by a handler
    pub fn check_organization_access(
        &self,
        resource_organization: Option<&OrganizationId>,
    ) -> AuthorizationDecision {
        check_organization_access(self.role, self.organization_id.as_ref(), resource_organization)
    }
}

/// Why an authorization decision came out the way it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionReason {
    Granted,
    InsufficientPrivileges,
    PermissionDenied,
    OrganizationAccessDenied,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::Granted => "GRANTED",
            DecisionReason::InsufficientPrivileges => "INSUFFICIENT_PRIVILEGES",
            DecisionReason::PermissionDenied => "PERMISSION_DENIED",
            DecisionReason::OrganizationAccessDenied => "ORGANIZATION_ACCESS_DENIED",
        }
    }
}

/// Outcome of checking claims against route metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorizationDecision {
    pub allow: bool,
    pub reason_code: DecisionReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_permission: Option<Permission>,
}

impl AuthorizationDecision {
    pub fn allowed() -> Self {
        Self {
            allow: true,
            reason_code: DecisionReason::Granted,
            required_permission: None,
        }
    }

    pub fn allowed_with(permission: Permission) -> Self {
        Self {
            allow: true,
            reason_code: DecisionReason::Granted,
            required_permission: Some(permission),
        }
    }

    pub fn denied(reason: DecisionReason, required_permission: Option<Permission>) -> Self {
        Self {
            allow: false,
            reason_code: reason,
            required_permission,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allow
    }
}

/// Authorization requirements attached to a protected route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RouteMetadata {
    pub minimum_role: Option<Role>,
    /// Replaces the permission the route table would resolve
    pub permission_override: Option<Permission>,
    pub tenant_scoped: bool,
}

impl RouteMetadata {
    /// Any authenticated caller
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Admin console routes: firm admin or above
    pub fn admin() -> Self {
        Self {
            minimum_role: Some(Role::FirmAdmin),
            ..Self::default()
        }
    }

    pub fn with_minimum_role(mut self, role: Role) -> Self {
        self.minimum_role = Some(role);
        self
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission_override = Some(permission);
        self
    }

    pub fn tenant_scoped(mut self) -> Self {
        self.tenant_scoped = true;
        self
    }
}

/// Compare a caller's organization scope with a resource's.
///
/// Resources without an organization are not tenant scoped. A caller
/// without an organization only reaches scoped resources as super admin.
pub fn check_organization_access(
    role: Role,
    caller_organization: Option<&OrganizationId>,
    resource_organization: Option<&OrganizationId>,
) -> AuthorizationDecision {
    let Some(resource) = resource_organization else {
        return AuthorizationDecision::allowed();
    };

    if role.bypasses_tenant_isolation() {
        return AuthorizationDecision::allowed();
    }

    match caller_organization {
        Some(caller) if caller == resource => AuthorizationDecision::allowed(),
        _ => AuthorizationDecision::denied(DecisionReason::OrganizationAccessDenied, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn org(id: &str) -> OrganizationId {
        OrganizationId::from_string(id).unwrap()
    }

    fn claims_for(role: Role, permissions: &[Permission]) -> Claims {
        Claims {
            user_id: "user-1".to_string(),
            email: "user@firm.example".to_string(),
            role,
            organization_id: Some(org("org-a")),
            permissions: permissions.iter().copied().collect(),
            issued_at: Utc::now(),
            expires_at: Utc::now() + Duration::hours(1),
        }
    }

    #[test]
    fn test_role_ranking() {
        assert!(Role::SuperAdmin.satisfies(Role::FirmAdmin));
        assert!(Role::FirmAdmin.satisfies(Role::FirmAdmin));
        assert!(!Role::Attorney.satisfies(Role::FirmAdmin));
        assert!(!Role::Client.satisfies(Role::Staff));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("SUPER_ADMIN".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("firm_admin".parse::<Role>().unwrap(), Role::FirmAdmin);
        assert!("ROOT".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_permission_round_trip_names() {
        for permission in Permission::ALL {
            assert_eq!(permission.as_str().parse::<Permission>().unwrap(), *permission);
        }
        assert!("admin".parse::<Permission>().is_err());
        assert_eq!(Permission::ALL.len(), 14);
    }

    #[test]
    fn test_default_permissions() {
        assert_eq!(Role::SuperAdmin.default_permissions().len(), Permission::ALL.len());
        assert!(Role::FirmAdmin.default_permissions().contains(&Permission::AdminAccess));
        assert!(!Role::FirmAdmin.default_permissions().contains(&Permission::SettingsWrite));
        assert!(!Role::Attorney.default_permissions().contains(&Permission::AdminAccess));
        assert!(!Role::Client.default_permissions().contains(&Permission::CasesWrite));
    }

    #[test]
    fn test_auth_context_permissions() {
        let context = AuthContext::from_claims(&claims_for(
            Role::Attorney,
            &[Permission::CasesRead, Permission::CasesWrite],
        ));

        assert!(context.has_permission(Permission::CasesRead));
        assert!(context.has_permission(Permission::CasesWrite));
        assert!(!context.has_permission(Permission::AdminAccess));
        assert!(!context.is_super_admin());
    }

    #[test]
    fn test_same_organization_allowed() {
        let decision = check_organization_access(Role::Attorney, Some(&org("org-a")), Some(&org("org-a")));
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_cross_organization_denied() {
        let decision = check_organization_access(Role::FirmAdmin, Some(&org("org-a")), Some(&org("org-b")));
        assert!(!decision.is_allowed());
        assert_eq!(decision.reason_code, DecisionReason::OrganizationAccessDenied);
    }

    #[test]
    fn test_super_admin_bypasses_isolation() {
        let decision = check_organization_access(Role::SuperAdmin, Some(&org("org-a")), Some(&org("org-b")));
        assert!(decision.is_allowed());

        let decision = check_organization_access(Role::SuperAdmin, None, Some(&org("org-b")));
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_missing_caller_organization_denied() {
        let decision = check_organization_access(Role::FirmAdmin, None, Some(&org("org-b")));
        assert!(!decision.is_allowed());
    }

    #[test]
    fn test_unscoped_resource_allowed() {
        let decision = check_organization_access(Role::Client, None, None);
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_decision_reason_codes() {
        assert_eq!(DecisionReason::InsufficientPrivileges.as_str(), "INSUFFICIENT_PRIVILEGES");
        assert_eq!(DecisionReason::PermissionDenied.as_str(), "PERMISSION_DENIED");
        let decision = AuthorizationDecision::denied(
            DecisionReason::PermissionDenied,
            Some(Permission::AuditRead),
        );
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["reason_code"], "PERMISSION_DENIED");
        assert_eq!(json["required_permission"], "audit:read");
    }

    #[test]
    fn test_route_metadata_builders() {
        let admin = RouteMetadata::admin().with_permission(Permission::UsersRead).tenant_scoped();
        assert_eq!(admin.minimum_role, Some(Role::FirmAdmin));
        assert_eq!(admin.permission_override, Some(Permission::UsersRead));
        assert!(admin.tenant_scoped);

        let open = RouteMetadata::authenticated();
        assert_eq!(open.minimum_role, None);
        assert!(!open.tenant_scoped);
    }
}
