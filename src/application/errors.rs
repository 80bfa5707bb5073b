//! Access Guard outcome errors
//!
//! Each variant maps to exactly one HTTP status and wire code; the mapping
//! lives with the HTTP adapter in `api::errors`.

use thiserror::Error;

use crate::domain::authorization::{DecisionReason, Permission, Role};

/// Terminal failure of the Access Guard
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Insufficient privileges: requires {required} or higher")]
    InsufficientPrivileges { required: Role },

    #[error("Missing required permission: {0}")]
    PermissionDenied(Permission),

    #[error("Access denied to resource of other organization")]
    OrganizationAccessDenied,

    /// Detail is for logs only and never reaches the client
    #[error("Authorization subsystem failure: {0}")]
    Internal(String),
}

impl AccessError {
    /// Wire code written in the `code` field of the error body
    pub fn code(&self) -> &'static str {
        match self {
            AccessError::AuthenticationRequired => "AUTH_REQUIRED",
            AccessError::InvalidToken => "INVALID_TOKEN",
            AccessError::InsufficientPrivileges { .. } => {
                DecisionReason::InsufficientPrivileges.as_str()
            }
            AccessError::PermissionDenied(_) => DecisionReason::PermissionDenied.as_str(),
            AccessError::OrganizationAccessDenied => {
                DecisionReason::OrganizationAccessDenied.as_str()
            }
            AccessError::Internal(_) => "AUTH_ERROR",
        }
    }

    /// Message safe to show to the caller
    pub fn public_message(&self) -> String {
        match self {
            AccessError::Internal(_) => "Authorization could not be completed".to_string(),
            other => other.to_string(),
        }
    }
}
