use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::{error::ApiError, state::AppState};

/// Verifies the `Authorization` credential, yielding the provider subject id.
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let credential = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(credential_from_header)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                warn!("missing Authorization header");
                ApiError::Unauthorized
            })?;

        let subject = state.verifier.verify(credential).await.map_err(|e| {
            warn!(error = %e, "credential rejected");
            ApiError::Unauthorized
        })?;

        Ok(AuthUser(subject))
    }
}

/// Clients send the raw ID token; a `Bearer ` scheme is tolerated and stripped.
fn credential_from_header(value: &str) -> &str {
    let value = value.trim_start();
    value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .unwrap_or(value)
        .trim()
}
