use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Task record in the database. Always owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: i64,
    pub text: String,
    pub completed: bool,
    pub category: String,
    pub priority: String,
    pub owner_id: i64,                // Users.id, fixed at creation
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// New values for a task's mutable fields. `None` leaves the column as stored.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges<'a> {
    pub text: Option<&'a str>,
    pub completed: Option<bool>,
    pub category: Option<&'a str>,
    pub priority: Option<&'a str>,
}
