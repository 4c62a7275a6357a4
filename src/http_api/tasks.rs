use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde::Deserialize;
use tracing::info;

use super::{ApiError, AppState, IdPayload, MessageBody, message, parse_payload};
use crate::calendar::MAX_ESTIMATED_HOURS;
use crate::model::{NewTask, Task, TaskChanges};
use crate::persistence::PersistenceError;

#[derive(Debug, Deserialize)]
pub(super) struct CreateTaskPayload {
    title: String,
    #[serde(default)]
    estimated_hours: u32,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateTaskPayload {
    id: i64,
    title: Option<String>,
    estimated_hours: Option<u32>,
}

const DUPLICATE_TITLE: &str = "Task with the same title already exists";

fn check_estimate(estimated_hours: u32) -> Result<(), ApiError> {
    if estimated_hours > MAX_ESTIMATED_HOURS {
        return Err(ApiError::invalid(format!(
            "estimated_hours must not exceed {MAX_ESTIMATED_HOURS}"
        )));
    }
    Ok(())
}

fn duplicate_title(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::Conflict(_) => ApiError::conflict(DUPLICATE_TITLE),
        other => ApiError::from(other),
    }
}

pub(super) async fn create_task(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let payload: CreateTaskPayload = parse_payload(&body)?;
    if payload.title.trim().is_empty() {
        return Err(ApiError::invalid("title must not be empty"));
    }
    check_estimate(payload.estimated_hours)?;

    let store = state.store();
    if store.find_task_by_title(&payload.title)?.is_some() {
        return Err(ApiError::conflict(DUPLICATE_TITLE));
    }
    let task = store
        .insert_task(&NewTask {
            title: payload.title,
            estimated_hours: payload.estimated_hours,
        })
        .map_err(duplicate_title)?;

    info!(task_id = task.id, title = %task.title, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

pub(super) async fn get_task(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Task>, ApiError> {
    let IdPayload { id } = parse_payload(&body)?;
    state
        .store()
        .find_task(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Task not found"))
}

pub(super) async fn update_task(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Task>, ApiError> {
    let payload: UpdateTaskPayload = parse_payload(&body)?;
    if payload
        .title
        .as_deref()
        .is_some_and(|title| title.trim().is_empty())
    {
        return Err(ApiError::invalid("title must not be empty"));
    }
    if let Some(estimated_hours) = payload.estimated_hours {
        check_estimate(estimated_hours)?;
    }

    let changes = TaskChanges {
        title: payload.title,
        estimated_hours: payload.estimated_hours,
    };
    let task = state
        .store()
        .update_task(payload.id, &changes)
        .map_err(duplicate_title)?
        .ok_or_else(|| ApiError::not_found("Task not found"))?;

    info!(task_id = task.id, "task updated");
    Ok(Json(task))
}

pub(super) async fn delete_task(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageBody>, ApiError> {
    let IdPayload { id } = parse_payload(&body)?;
    if !state.store().delete_task(id)? {
        return Err(ApiError::not_found("Task not found"));
    }
    info!(task_id = id, "task deleted");
    Ok(message("Task deleted successfully"))
}
