use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use super::{ApiError, AppState, IdPayload, MessageBody, message, parse_payload};
use crate::model::Holiday;
use crate::persistence::PersistenceError;

#[derive(Debug, Deserialize)]
pub(super) struct CreateHolidayPayload {
    holiday_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateHolidayPayload {
    id: i64,
    holiday_date: Option<NaiveDate>,
}

const ALREADY_DEFINED: &str = "Holiday already defined";

fn already_defined(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::Conflict(_) => ApiError::conflict(ALREADY_DEFINED),
        other => ApiError::from(other),
    }
}

pub(super) async fn create_holiday(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Holiday>), ApiError> {
    let CreateHolidayPayload { holiday_date } = parse_payload(&body)?;
    let store = state.store();
    if store.find_holiday_by_date(holiday_date)?.is_some() {
        return Err(ApiError::conflict(ALREADY_DEFINED));
    }
    let holiday = store
        .insert_holiday(holiday_date)
        .map_err(already_defined)?;

    info!(holiday_id = holiday.id, %holiday_date, "holiday created");
    Ok((StatusCode::CREATED, Json(holiday)))
}

pub(super) async fn get_holiday(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Holiday>, ApiError> {
    let IdPayload { id } = parse_payload(&body)?;
    state
        .store()
        .find_holiday(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Holiday not found"))
}

pub(super) async fn update_holiday(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Holiday>, ApiError> {
    let payload: UpdateHolidayPayload = parse_payload(&body)?;
    let holiday = state
        .store()
        .update_holiday(payload.id, payload.holiday_date)
        .map_err(already_defined)?
        .ok_or_else(|| ApiError::not_found("Holiday not found"))?;

    info!(holiday_id = holiday.id, holiday_date = %holiday.holiday_date, "holiday updated");
    Ok(Json(holiday))
}

pub(super) async fn delete_holiday(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageBody>, ApiError> {
    let IdPayload { id } = parse_payload(&body)?;
    if !state.store().delete_holiday(id)? {
        return Err(ApiError::not_found("Holiday not found"));
    }
    info!(holiday_id = id, "holiday deleted");
    Ok(message("Holiday deleted successfully"))
}
