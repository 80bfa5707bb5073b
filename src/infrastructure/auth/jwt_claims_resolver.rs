use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ports::{ClaimsResolver, ResolveError};
use crate::domain::{
    authorization::{Permission, Role},
    claims::Claims,
    value_objects::{Credential, OrganizationId},
};

/// Token payload as it appears on the wire
#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    sub: String,
    #[serde(default)]
    email: String,
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    org_id: Option<String>,
    #[serde(default)]
    permissions: Vec<String>,
    iat: i64,
    exp: i64,
    iss: String,
}

/// HS256 verifier for session tokens
pub struct JwtClaimsResolver {
    secret: Vec<u8>,
    issuer: String,
    leeway_secs: u64,
}

impl JwtClaimsResolver {
    pub fn new(secret: impl AsRef<[u8]>, issuer: impl Into<String>, leeway_secs: u64) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            issuer: issuer.into(),
            leeway_secs,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation
    }

    fn verify(&self, token: &str) -> Result<Claims, ResolveError> {
        if self.secret.is_empty() {
            return Err(ResolveError::KeyUnavailable(
                "signing secret is not configured".to_string(),
            ));
        }

        let key = DecodingKey::from_secret(&self.secret);
        let data = decode::<TokenClaims>(token, &key, &self.validation()).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => ResolveError::Expired,
                _ => ResolveError::Invalid(e.to_string()),
            }
        })?;

        into_claims(data.claims)
    }

    /// Sign a token for `claims`; used by tests and local tooling
    pub fn issue_token(&self, claims: &Claims) -> Result<String, ResolveError> {
        if self.secret.is_empty() {
            return Err(ResolveError::KeyUnavailable(
                "signing secret is not configured".to_string(),
            ));
        }

        let mut permissions: Vec<String> = claims
            .permissions
            .iter()
            .map(|p| p.as_str().to_string())
            .collect();
        permissions.sort();

        let payload = TokenClaims {
            sub: claims.user_id.clone(),
            email: claims.email.clone(),
            role: claims.role.as_str().to_string(),
            org_id: claims.organization_id.as_ref().map(|o| o.to_string()),
            permissions,
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &payload,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| ResolveError::KeyUnavailable(e.to_string()))
    }
}

fn into_claims(raw: TokenClaims) -> Result<Claims, ResolveError> {
    let role: Role = raw
        .role
        .parse()
        .map_err(|e: crate::domain::errors::DomainError| ResolveError::Invalid(e.to_string()))?;

    let organization_id = raw
        .org_id
        .filter(|id| !id.is_empty())
        .map(|id| OrganizationId::from_string(&id))
        .transpose()
        .map_err(|e| ResolveError::Invalid(e.to_string()))?;

    // Unknown permission names are ignored rather than failing the token
    let permissions: HashSet<Permission> = raw
        .permissions
        .iter()
        .filter_map(|name| match name.parse() {
            Ok(permission) => Some(permission),
            Err(_) => {
                debug!(permission = %name, "Ignoring unknown permission in token");
                None
            }
        })
        .collect();

    Ok(Claims {
        user_id: raw.sub,
        email: raw.email,
        role,
        organization_id,
        permissions,
        issued_at: timestamp(raw.iat)?,
        expires_at: timestamp(raw.exp)?,
    })
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, ResolveError> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| ResolveError::Invalid(format!("timestamp out of range: {}", secs)))
}

#[async_trait]
impl ClaimsResolver for JwtClaimsResolver {
    async fn resolve(&self, credential: &Credential) -> Result<Claims, ResolveError> {
        self.verify(credential.expose())
    }
}
