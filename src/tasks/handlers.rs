use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::AuthUser,
    error::{internal, ApiError},
    state::AppState,
    tasks::{
        dto::{CreateTaskRequest, DeletedResponse, UpdateTaskRequest},
        repo_types::{Task, TaskChanges},
    },
    users::User,
};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tasks", get(list_tasks).post(create_task))
        .route("/api/tasks/:id", put(update_task).delete(delete_task))
}

/// The stored user behind a verified subject, if it has been provisioned.
async fn resolve_owner(state: &AppState, subject: &str) -> Result<Option<User>, ApiError> {
    User::find_by_google_id(&state.db, subject)
        .await
        .map_err(internal("resolve_owner"))
}

/// Ids that are not integers can never match a row.
fn parse_task_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::NotFound)
}

#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
) -> Result<Json<Vec<Task>>, ApiError> {
    let Some(user) = resolve_owner(&state, &subject).await? else {
        debug!("subject not provisioned yet; no tasks");
        return Ok(Json(Vec::new()));
    };

    let tasks = Task::list_by_owner(&state.db, user.id)
        .await
        .map_err(internal("list_tasks"))?;
    Ok(Json(tasks))
}

#[instrument(skip(state, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let Some(user) = resolve_owner(&state, &subject).await? else {
        warn!("create_task before user provisioning");
        return Err(ApiError::Server(anyhow::anyhow!(
            "no user provisioned for subject"
        )));
    };

    let task = Task::create(
        &state.db,
        user.id,
        &payload.text,
        &payload.category,
        &payload.priority,
    )
    .await
    .map_err(internal("create_task"))?;

    info!(task_id = task.id, user_id = user.id, "task created");
    Ok(Json(task))
}

#[instrument(skip(state, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let user = resolve_owner(&state, &subject)
        .await?
        .ok_or(ApiError::NotFound)?;

    let changes = TaskChanges {
        text: payload.text.as_deref(),
        completed: payload.completed,
        category: payload.category.as_deref(),
        priority: payload.priority.as_deref(),
    };
    let task = Task::update_owned(&state.db, user.id, task_id, &changes)
        .await
        .map_err(internal("update_task"))?
        .ok_or(ApiError::NotFound)?;

    info!(task_id, user_id = user.id, "task updated");
    Ok(Json(task))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let task_id = parse_task_id(&id)?;
    let user = resolve_owner(&state, &subject)
        .await?
        .ok_or(ApiError::NotFound)?;

    let deleted = Task::delete_owned(&state.db, user.id, task_id)
        .await
        .map_err(internal("delete_task"))?;
    if !deleted {
        return Err(ApiError::NotFound);
    }

    info!(task_id, user_id = user.id, "task deleted");
    Ok(Json(DeletedResponse {
        message: "Task deleted",
    }))
}
