use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::{debug, info, instrument};

use crate::{
    auth::AuthUser,
    error::{internal, ApiError},
    state::AppState,
    users::{dto::ProvisionUserRequest, repo_types::User},
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route("/api/user", post(provision_user))
}

/// Find-or-create keyed on the verified subject. An existing user is returned as stored.
/// A missing or unreadable body provisions with an empty profile.
#[instrument(skip(state, body))]
pub async fn provision_user(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    body: Result<Json<ProvisionUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let payload = match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            debug!(error = %rejection, "no usable profile in body");
            ProvisionUserRequest::default()
        }
    };

    let (user, created) =
        User::find_or_create(&state.db, &subject, &payload.email, &payload.name)
            .await
            .map_err(internal("provision_user"))?;

    info!(user_id = user.id, created, "user provisioned");
    Ok(Json(user))
}
