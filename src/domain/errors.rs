use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown role: {0}")]
    InvalidRole(String),

    #[error("Unknown permission: {0}")]
    InvalidPermission(String),

    #[error("Invalid organization ID: {0}")]
    InvalidOrganizationId(String),

    #[error("Route permission table has no explicit mapping for: {}", .0.join(", "))]
    UnmappedRoutes(Vec<String>),

    #[error("Invalid route prefix: {0}")]
    InvalidRoutePrefix(String),
}
