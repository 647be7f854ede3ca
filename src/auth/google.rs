use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use tokio::sync::RwLock;
use tracing::debug;

use super::claims::GoogleClaims;
use super::verifier::{IdentityVerifier, VerifyError};
use crate::config::GoogleConfig;

const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

/// Verifies Google ID tokens against Google's published signing keys.
pub struct GoogleVerifier {
    client_id: String,
    certs_url: String,
    ttl: Duration,
    http: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
}

impl GoogleVerifier {
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            certs_url: config.certs_url.clone(),
            ttl: Duration::from_secs(config.certs_ttl_secs),
            http: reqwest::Client::new(),
            cache: RwLock::new(None),
        }
    }

    /// Verifier whose key set never goes stale, so it never touches the network.
    #[cfg(test)]
    pub fn with_keys(client_id: &str, keys: JwkSet) -> Self {
        Self {
            client_id: client_id.to_string(),
            certs_url: String::new(),
            ttl: Duration::MAX,
            http: reqwest::Client::new(),
            cache: RwLock::new(Some(CachedKeys {
                keys,
                fetched_at: Instant::now(),
            })),
        }
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, VerifyError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| c.fetched_at.elapsed() < self.ttl) {
                let jwk = cached
                    .keys
                    .find(kid)
                    .ok_or_else(|| VerifyError::UnknownKey(kid.to_string()))?;
                return Ok(DecodingKey::from_jwk(jwk)?);
            }
        }

        let keys = self.fetch_keys().await?;
        let key = keys.find(kid).map(DecodingKey::from_jwk).transpose()?;
        *self.cache.write().await = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });
        key.ok_or_else(|| VerifyError::UnknownKey(kid.to_string()))
    }

    async fn fetch_keys(&self) -> Result<JwkSet, VerifyError> {
        let keys = self
            .http
            .get(&self.certs_url)
            .send()
            .await?
            .error_for_status()?
            .json::<JwkSet>()
            .await?;
        debug!(count = keys.keys.len(), url = %self.certs_url, "google signing keys fetched");
        Ok(keys)
    }
}

#[async_trait]
impl IdentityVerifier for GoogleVerifier {
    async fn verify(&self, credential: &str) -> Result<String, VerifyError> {
        if credential.is_empty() {
            return Err(VerifyError::MissingCredential);
        }
        let header = decode_header(credential)?;
        let kid = header.kid.ok_or(VerifyError::MissingKeyId)?;
        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(std::slice::from_ref(&self.client_id));
        validation.set_issuer(&GOOGLE_ISSUERS[..]);
        let data = decode::<GoogleClaims>(credential, &key, &validation)?;
        debug!(sub = %data.claims.sub, "google id token verified");
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Json, Router};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::OffsetDateTime;

    const CLIENT_ID: &str = "test-client.apps.googleusercontent.com";
    const KID: &str = "test-kid";
    const PRIVATE_KEY: &[u8] = include_bytes!("testdata/google_test_key.pem");
    const MODULUS: &str = "2-ImmSMln05K4VWr9Pd7SkFM78wTNhSJI5oHDNLAi7N6NBfnMgyRnjutmxMX-C5oUK353sIdvEeHq1xMWTMx4hGIgYcwLc_pEDlIsfefflBRFHBRKfcpz8hdgqwVkaGv1bqpOBMnt0RLPWQEi6G5d1BB4wZPWZoij2qrYoiB8q3Era4X1DqWDyH8I3pF6BT62u9vI6Vvy6yKLxDNgtLq59SACLQery3_RbQBY9ij1qBKbuNEH_DZm5_0N6Bz3h-9dXtZVyN7pA-_bh2U3wvNWwrGK-LyKhdMA9EcP3d4hTKoFa4eUdEM6bkF0Bv3-YN7JEzq9tQpNnHo8QsZBANIQw";

    fn jwks_json() -> serde_json::Value {
        serde_json::json!({
            "keys": [{
                "kty": "RSA",
                "alg": "RS256",
                "use": "sig",
                "kid": KID,
                "n": MODULUS,
                "e": "AQAB"
            }]
        })
    }

    fn jwks() -> JwkSet {
        serde_json::from_value(jwks_json()).expect("valid jwks")
    }

    fn claims(sub: &str) -> GoogleClaims {
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        GoogleClaims {
            sub: sub.into(),
            iss: "https://accounts.google.com".into(),
            aud: CLIENT_ID.into(),
            iat: now,
            exp: now + 3600,
            email: Some("someone@example.com".into()),
        }
    }

    fn sign(claims: &GoogleClaims, kid: Option<&str>) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = kid.map(str::to_string);
        let key = EncodingKey::from_rsa_pem(PRIVATE_KEY).expect("test key parses");
        encode(&header, claims, &key).expect("sign token")
    }

    #[tokio::test]
    async fn accepts_valid_token_and_returns_subject() {
        let verifier = GoogleVerifier::with_keys(CLIENT_ID, jwks());
        let token = sign(&claims("google-sub-1"), Some(KID));
        let sub = verifier.verify(&token).await.expect("token verifies");
        assert_eq!(sub, "google-sub-1");
    }

    #[tokio::test]
    async fn accepts_bare_issuer_form() {
        let verifier = GoogleVerifier::with_keys(CLIENT_ID, jwks());
        let mut c = claims("google-sub-2");
        c.iss = "accounts.google.com".into();
        let sub = verifier.verify(&sign(&c, Some(KID))).await.expect("token verifies");
        assert_eq!(sub, "google-sub-2");
    }

    #[tokio::test]
    async fn rejects_wrong_audience() {
        let verifier = GoogleVerifier::with_keys(CLIENT_ID, jwks());
        let mut c = claims("x");
        c.aud = "someone-elses-client".into();
        let err = verifier.verify(&sign(&c, Some(KID))).await.unwrap_err();
        assert!(matches!(err, VerifyError::Rejected(_)));
    }

    #[tokio::test]
    async fn rejects_foreign_issuer() {
        let verifier = GoogleVerifier::with_keys(CLIENT_ID, jwks());
        let mut c = claims("x");
        c.iss = "https://evil.example.com".into();
        let err = verifier.verify(&sign(&c, Some(KID))).await.unwrap_err();
        assert!(matches!(err, VerifyError::Rejected(_)));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let verifier = GoogleVerifier::with_keys(CLIENT_ID, jwks());
        let mut c = claims("x");
        c.iat -= 7200;
        c.exp = c.iat + 60;
        let err = verifier.verify(&sign(&c, Some(KID))).await.unwrap_err();
        assert!(matches!(err, VerifyError::Rejected(_)));
    }

    #[tokio::test]
    async fn rejects_unknown_key_id() {
        let verifier = GoogleVerifier::with_keys(CLIENT_ID, jwks());
        let err = verifier
            .verify(&sign(&claims("x"), Some("rotated-away")))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifyError::UnknownKey(kid) if kid == "rotated-away"));
    }

    #[tokio::test]
    async fn rejects_token_without_key_id() {
        let verifier = GoogleVerifier::with_keys(CLIENT_ID, jwks());
        let err = verifier.verify(&sign(&claims("x"), None)).await.unwrap_err();
        assert!(matches!(err, VerifyError::MissingKeyId));
    }

    #[tokio::test]
    async fn rejects_empty_and_garbage_credentials() {
        let verifier = GoogleVerifier::with_keys(CLIENT_ID, jwks());
        assert!(matches!(
            verifier.verify("").await.unwrap_err(),
            VerifyError::MissingCredential
        ));
        assert!(matches!(
            verifier.verify("valid-token").await.unwrap_err(),
            VerifyError::Rejected(_)
        ));
    }

    #[tokio::test]
    async fn rejects_hmac_signed_token() {
        let verifier = GoogleVerifier::with_keys(CLIENT_ID, jwks());
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(KID.into());
        let token = encode(&header, &claims("x"), &EncodingKey::from_secret(b"guess"))
            .expect("sign hs256");
        let err = verifier.verify(&token).await.unwrap_err();
        assert!(matches!(err, VerifyError::Rejected(_)));
    }

    #[tokio::test]
    async fn fetches_keys_when_cache_is_empty() {
        let app = Router::new().route("/certs", get(|| async { Json(jwks_json()) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let verifier = GoogleVerifier::new(&GoogleConfig {
            client_id: CLIENT_ID.into(),
            certs_url: format!("http://{addr}/certs"),
            certs_ttl_secs: 3600,
        });
        let token = sign(&claims("fetched-sub"), Some(KID));
        let sub = verifier.verify(&token).await.expect("token verifies");
        assert_eq!(sub, "fetched-sub");
        assert!(verifier.cache.read().await.is_some());
    }
}
