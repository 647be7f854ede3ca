use async_trait::async_trait;
use thiserror::Error;

/// Why a credential was not accepted. All variants end up as a 401.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("missing credential")]
    MissingCredential,
    #[error("token header has no key id")]
    MissingKeyId,
    #[error("unknown signing key {0}")]
    UnknownKey(String),
    #[error("fetch signing keys: {0}")]
    KeyFetch(#[from] reqwest::Error),
    #[error("token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),
}

/// Turns an opaque bearer credential into the provider's stable subject identifier.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<String, VerifyError>;
}

/// Fixed credential to subject table.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct StaticVerifier {
    subjects: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl StaticVerifier {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            subjects: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, credential: &str) -> Result<String, VerifyError> {
        if credential.is_empty() {
            return Err(VerifyError::MissingCredential);
        }
        self.subjects
            .get(credential)
            .cloned()
            .ok_or_else(|| VerifyError::UnknownKey(credential.to_string()))
    }
}
