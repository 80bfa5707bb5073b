pub mod access_guard;
pub mod errors;
pub mod ports;
pub mod route_permissions;
