pub mod admin;
pub mod health;
pub mod intake;
pub mod search;


pub use admin::{
    audit_logs_handler, billing_handler, billing_section_handler, organization_handler,
    reset_audit_logs_handler, session_handler, users_handler,
};
pub use health::health_handler;
pub use intake::intake_handler;
pub use search::search_handler;
