use serde::Deserialize;

/// Request body for `POST /api/user`. Only used when the user does not exist yet.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProvisionUserRequest {
    pub email: String,
    pub name: String,
}
