mod credential;
mod organization_id;

pub use credential::{Credential, CredentialSource};
pub use organization_id::OrganizationId;
