//! # lexguard - security core for a multi-tenant legal practice service
//!
//! Input sanitization, request validation and an authentication and
//! authorization guard, built on Clean Architecture principles.
//!
//! ## Architecture Layers
//!
//! - **Domain**: roles, permissions, claims, validation outcomes
//! - **Application**: the Access Guard, route permission table and ports
//! - **Infrastructure**: JWT claims resolver and security event sinks
//! - **API**: axum middleware, request screening and handlers
//!
//! ## Example Usage
//!
//! ```no_run
//! use lexguard::api::middleware::input_sanitization::{sanitize, SanitizationContext};
//!
//! let safe = sanitize(Some("<b>Hi</b><script>alert(1)</script>"), SanitizationContext::Basic);
//! assert!(!safe.contains("<script"));
//! ```

pub mod api;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export key types explicitly to avoid ambiguity
pub use api::errors as api_errors;
pub use api::middleware::input_sanitization::{SanitizationContext, Sanitizer, Validator};
pub use application::access_guard::{AccessGuard, AccessGuardConfig, GuardRequest};
pub use application::errors::AccessError;
pub use application::{ports, route_permissions::RoutePermissionTable};
pub use config::Config;
pub use domain::errors as domain_errors;
pub use domain::value_objects;
