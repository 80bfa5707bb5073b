mod jwt_claims_resolver;

pub use jwt_claims_resolver::JwtClaimsResolver;
