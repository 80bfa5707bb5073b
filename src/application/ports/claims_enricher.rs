use async_trait::async_trait;

use crate::domain::{authorization::Role, value_objects::OrganizationId};

/// Current role and organization of a user as the user store knows them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalRecord {
    pub role: Role,
    pub organization_id: Option<OrganizationId>,
    pub active: bool,
}

/// Enrichment store error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Principal store unavailable: {0}")]
    Unavailable(String),
}

/// Optional lookup that refreshes role and organization after the token is
/// verified, so revoked or demoted users lose access before their token
/// expires.
#[async_trait]
pub trait ClaimsEnricher: Send + Sync {
    async fn lookup(&self, user_id: &str) -> Result<Option<PrincipalRecord>, EnrichmentError>;
}

#[cfg(test)]
mockall::mock! {
    pub ClaimsEnricher {}

    #[async_trait]
    impl ClaimsEnricher for ClaimsEnricher {
        async fn lookup(&self, user_id: &str) -> Result<Option<PrincipalRecord>, EnrichmentError>;
    }
}
