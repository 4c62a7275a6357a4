use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde::Deserialize;

use super::{ApiError, AppState, IdPayload, MessageBody, message, parse_payload};
use crate::assignment::{self, AssignmentRequest, AssignmentUpdate};
use crate::model::TaskAssignment;

// `end_date` is computed, so a client-supplied value is ignored.
#[derive(Debug, Deserialize)]
pub(super) struct CreateAssignmentPayload {
    task_id: i64,
    username: String,
    start_date: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateAssignmentPayload {
    id: i64,
    task_id: Option<i64>,
    username: Option<String>,
    start_date: Option<String>,
}

pub(super) async fn create_assignment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<TaskAssignment>), ApiError> {
    let payload: CreateAssignmentPayload = parse_payload(&body)?;
    let request = AssignmentRequest {
        task_id: payload.task_id,
        username: payload.username,
        start_date: payload.start_date,
    };
    let created = assignment::create_assignment(state.store(), &request)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub(super) async fn get_assignment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TaskAssignment>, ApiError> {
    let IdPayload { id } = parse_payload(&body)?;
    state
        .store()
        .find_assignment(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Task Assignment not found"))
}

pub(super) async fn update_assignment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TaskAssignment>, ApiError> {
    let payload: UpdateAssignmentPayload = parse_payload(&body)?;
    let update = AssignmentUpdate {
        task_id: payload.task_id,
        username: payload.username,
        start_date: payload.start_date,
    };
    let updated = assignment::update_assignment(state.store(), payload.id, &update)?;
    Ok(Json(updated))
}

pub(super) async fn delete_assignment(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageBody>, ApiError> {
    let IdPayload { id } = parse_payload(&body)?;
    if !state.store().delete_assignment(id)? {
        return Err(ApiError::not_found("Task Assignment not found"));
    }
    tracing::info!(assignment_id = id, "task assignment deleted");
    Ok(message("Task Assignment entry deleted successfully"))
}
