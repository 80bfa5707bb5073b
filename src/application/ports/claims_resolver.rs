use async_trait::async_trait;

use crate::domain::{claims::Claims, value_objects::Credential};

/// Why a credential could not be turned into claims
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Invalid credential: {0}")]
    Invalid(String),
    #[error("Credential has expired")]
    Expired,
    #[error("Verification key unavailable: {0}")]
    KeyUnavailable(String),
}

/// Verifies a bearer credential and returns its claims
#[async_trait]
pub trait ClaimsResolver: Send + Sync {
    async fn resolve(&self, credential: &Credential) -> Result<Claims, ResolveError>;
}

#[cfg(test)]
mockall::mock! {
    pub ClaimsResolver {}

    #[async_trait]
    impl ClaimsResolver for ClaimsResolver {
        async fn resolve(&self, credential: &Credential) -> Result<Claims, ResolveError>;
    }
}
