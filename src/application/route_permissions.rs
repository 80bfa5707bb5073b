//! Static route prefix to permission table
//!
//! Lookups use the longest prefix that ends on a path segment boundary.
//! Unmapped admin paths fall back to [`Permission::AdminAccess`].

use std::collections::HashSet;

use crate::domain::authorization::Permission;
use crate::domain::errors::DomainError;

const ADMIN_PREFIX: &str = "/api/admin";

#[derive(Debug, Clone)]
pub struct RoutePermissionTable {
    /// Sorted longest prefix first
    entries: Vec<(String, Permission)>,
}

impl RoutePermissionTable {
    pub fn new<I, S>(entries: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (S, Permission)>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut table = Vec::new();

        for (prefix, permission) in entries {
            let prefix = normalize_prefix(prefix.into())?;
            if !seen.insert(prefix.clone()) {
                return Err(DomainError::InvalidRoutePrefix(format!(
                    "duplicate prefix {}",
                    prefix
                )));
            }
            table.push((prefix, permission));
        }

        sort_longest_first(&mut table);
        Ok(Self { entries: table })
    }

    /// Mapping used by the demonstration service
    pub fn standard() -> Self {
        let mut entries = vec![
            ("/api/admin/session".to_string(), Permission::AdminAccess),
            ("/api/admin/users".to_string(), Permission::UsersRead),
            ("/api/admin/organizations".to_string(), Permission::OrganizationsRead),
            ("/api/admin/audit-logs".to_string(), Permission::AuditRead),
            ("/api/admin/billing".to_string(), Permission::BillingRead),
            ("/api/admin/analytics".to_string(), Permission::AnalyticsRead),
            ("/api/admin/settings".to_string(), Permission::SettingsWrite),
            ("/api/organizations".to_string(), Permission::CasesRead),
        ];
        sort_longest_first(&mut entries);
        Self { entries }
    }

    /// Permission required for `path`, if any
    pub fn resolve(&self, path: &str) -> Option<Permission> {
        self.explicit_mapping(path).or_else(|| {
            if matches_prefix(path, ADMIN_PREFIX) {
                Some(Permission::AdminAccess)
            } else {
                None
            }
        })
    }

    /// Entry that matches `path` without the admin fallback
    pub fn explicit_mapping(&self, path: &str) -> Option<Permission> {
        self.entries
            .iter()
            .find(|(prefix, _)| matches_prefix(path, prefix))
            .map(|(_, permission)| *permission)
    }

    /// Startup check that every protected route has its own entry
    pub fn verify_coverage<'a, I>(&self, routes: I) -> Result<(), DomainError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let unmapped: Vec<String> = routes
            .into_iter()
            .filter(|route| self.explicit_mapping(route).is_none())
            .map(str::to_string)
            .collect();

        if unmapped.is_empty() {
            Ok(())
        } else {
            Err(DomainError::UnmappedRoutes(unmapped))
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RoutePermissionTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn sort_longest_first(entries: &mut [(String, Permission)]) {
    entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
}

fn normalize_prefix(prefix: String) -> Result<String, DomainError> {
    if !prefix.starts_with('/') {
        return Err(DomainError::InvalidRoutePrefix(prefix));
    }
    if prefix.len() > 1 && prefix.ends_with('/') {
        return Ok(prefix.trim_end_matches('/').to_string());
    }
    Ok(prefix)
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return path.starts_with('/');
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
