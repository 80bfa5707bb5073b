mod claims_enricher;
mod claims_resolver;
mod security_events;

pub use claims_enricher::{ClaimsEnricher, EnrichmentError, PrincipalRecord};
pub use claims_resolver::{ClaimsResolver, ResolveError};
pub use security_events::{SecurityEvent, SecurityEventError, SecurityEventLogger, SecurityEventType};

#[cfg(test)]
pub use claims_enricher::MockClaimsEnricher;
#[cfg(test)]
pub use claims_resolver::MockClaimsResolver;
