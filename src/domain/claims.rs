use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::authorization::{Permission, Role};
use crate::domain::value_objects::OrganizationId;

/// Verified payload of an authentication credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub organization_id: Option<OrganizationId>,
    pub permissions: HashSet<Permission>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    /// Explicit permissions when the credential lists any, otherwise the role defaults
    pub fn effective_permissions(&self) -> HashSet<Permission> {
        if self.permissions.is_empty() {
            self.role.default_permissions().iter().copied().collect()
        } else {
            self.permissions.clone()
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
