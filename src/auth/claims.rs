use serde::{Deserialize, Serialize};

/// Payload of a Google-issued ID token. Only `sub` is used downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleClaims {
    pub sub: String,    // stable Google account id
    pub iss: String,    // accounts.google.com
    pub aud: String,    // OAuth client id
    pub iat: usize,     // issued at (unix timestamp)
    pub exp: usize,     // expires at (unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}
