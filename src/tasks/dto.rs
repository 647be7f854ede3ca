use serde::{Deserialize, Serialize};

/// Request body for `POST /api/tasks`. Any `completed` value sent by the client is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateTaskRequest {
    pub text: String,
    pub category: String,
    pub priority: String,
}

/// Request body for `PUT /api/tasks/:id`. Fields left out keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTaskRequest {
    pub text: Option<String>,
    pub completed: Option<bool>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: &'static str,
}
