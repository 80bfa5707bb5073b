use sha2::{Digest, Sha256};

/// Where a credential was found on the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    AuthorizationHeader,
    Cookie,
}

/// Opaque bearer token taken from a request.
///
/// The raw value never appears in `Debug` output; logs use [`Credential::fingerprint`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    token: String,
    source: CredentialSource,
}

impl Credential {
    pub fn new(token: impl Into<String>, source: CredentialSource) -> Self {
        Self {
            token: token.into(),
            source,
        }
    }

    pub fn expose(&self) -> &str {
        &self.token
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// First 8 bytes of the SHA-256 of the token, hex encoded
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.token.as_bytes());
        hex::encode(&digest[..8])
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("source", &self.source)
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_token() {
        let credential = Credential::new("super-secret-token", CredentialSource::Cookie);
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains(&credential.fingerprint()));
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = Credential::new("abc", CredentialSource::AuthorizationHeader);
        let b = Credential::new("abc", CredentialSource::Cookie);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 16);
    }
}
