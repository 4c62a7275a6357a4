//! Creating and rescheduling task assignments.
//!
//! Both paths validate everything before writing: the start timestamp is
//! parsed first, then the user, the task and the one-assignment-per-task
//! rule are checked, and only then is the end date computed and stored.

use crate::calendar::{MAX_ESTIMATED_HOURS, WorkCalendar};
use crate::model::{NewTaskAssignment, Task, TaskAssignment, TaskAssignmentChanges};
use crate::persistence::{PersistenceError, StoredHolidays, TrackerStore};
use crate::timestamp::{TimestampError, format_timestamp, parse_timestamp};
use chrono::NaiveDateTime;
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub task_id: i64,
    pub username: String,
    pub start_date: String,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentUpdate {
    pub task_id: Option<i64>,
    pub username: Option<String>,
    pub start_date: Option<String>,
}

#[derive(Debug)]
pub enum AssignmentError {
    InvalidStart(TimestampError),
    UnknownUser(String),
    UnknownTask(i64),
    AlreadyAssigned(i64),
    NotFound(i64),
    /// The task's budget has no representable end date.
    EstimateOutOfRange { task_id: i64, estimated_hours: u32 },
    Store(PersistenceError),
}

impl fmt::Display for AssignmentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentError::InvalidStart(err) => write!(f, "{err}"),
            AssignmentError::UnknownUser(username) => {
                write!(f, "username '{username}' doesn't exist")
            }
            AssignmentError::UnknownTask(id) => write!(f, "task {id} not found"),
            AssignmentError::AlreadyAssigned(id) => {
                write!(f, "task {id} is already assigned to somebody")
            }
            AssignmentError::NotFound(id) => write!(f, "task assignment {id} not found"),
            AssignmentError::EstimateOutOfRange {
                task_id,
                estimated_hours,
            } => write!(
                f,
                "task {task_id} needs {estimated_hours} hours, more than the calendar can place (max {MAX_ESTIMATED_HOURS})"
            ),
            AssignmentError::Store(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AssignmentError {}

impl From<TimestampError> for AssignmentError {
    fn from(value: TimestampError) -> Self {
        Self::InvalidStart(value)
    }
}

impl From<PersistenceError> for AssignmentError {
    fn from(value: PersistenceError) -> Self {
        Self::Store(value)
    }
}

pub type AssignmentResult<T> = Result<T, AssignmentError>;

/// End of the working window for `task` starting at `start`, using the
/// store's holidays.
pub fn plan_end_date<S: TrackerStore + ?Sized>(
    store: &S,
    task: &Task,
    start: NaiveDateTime,
) -> AssignmentResult<NaiveDateTime> {
    let calendar = WorkCalendar::new(StoredHolidays::new(store));
    calendar
        .compute_end_date(start, task.estimated_hours)
        .ok_or(AssignmentError::EstimateOutOfRange {
            task_id: task.id,
            estimated_hours: task.estimated_hours,
        })
}

pub fn create_assignment<S: TrackerStore + ?Sized>(
    store: &S,
    request: &AssignmentRequest,
) -> AssignmentResult<TaskAssignment> {
    let start = parse_timestamp(&request.start_date)?;
    let task = validate_references(store, &request.username, request.task_id)?;

    if store.find_assignment_by_task(task.id)?.is_some() {
        return Err(AssignmentError::AlreadyAssigned(task.id));
    }

    let end = plan_end_date(store, &task, start)?;
    let record = NewTaskAssignment {
        task_id: task.id,
        username: request.username.clone(),
        start_date: format_timestamp(start),
        end_date: format_timestamp(end),
    };
    let created = store
        .insert_assignment(&record)
        .map_err(|err| already_assigned_on_conflict(err, task.id))?;

    info!(
        assignment_id = created.id,
        task_id = created.task_id,
        username = %created.username,
        end_date = %created.end_date,
        "task assigned"
    );
    Ok(created)
}

pub fn update_assignment<S: TrackerStore + ?Sized>(
    store: &S,
    id: i64,
    update: &AssignmentUpdate,
) -> AssignmentResult<TaskAssignment> {
    let supplied_start = update
        .start_date
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;

    let existing = store
        .find_assignment(id)?
        .ok_or(AssignmentError::NotFound(id))?;

    let start = match supplied_start {
        Some(start) => start,
        None => parse_timestamp(&existing.start_date)?,
    };
    let username = update
        .username
        .clone()
        .unwrap_or_else(|| existing.username.clone());
    let task_id = update.task_id.unwrap_or(existing.task_id);
    let task = validate_references(store, &username, task_id)?;

    if let Some(other) = store.find_assignment_by_task(task.id)? {
        if other.id != id {
            return Err(AssignmentError::AlreadyAssigned(task.id));
        }
    }

    let end = plan_end_date(store, &task, start)?;
    let changes = TaskAssignmentChanges {
        task_id: Some(task.id),
        username: Some(username),
        start_date: Some(format_timestamp(start)),
        end_date: Some(format_timestamp(end)),
    };
    let updated = store
        .update_assignment(id, &changes)
        .map_err(|err| already_assigned_on_conflict(err, task.id))?
        .ok_or(AssignmentError::NotFound(id))?;

    info!(
        assignment_id = updated.id,
        task_id = updated.task_id,
        end_date = %updated.end_date,
        "task assignment rescheduled"
    );
    Ok(updated)
}

fn validate_references<S: TrackerStore + ?Sized>(
    store: &S,
    username: &str,
    task_id: i64,
) -> AssignmentResult<Task> {
    if store.find_user_by_username(username)?.is_none() {
        return Err(AssignmentError::UnknownUser(username.to_string()));
    }
    store
        .find_task(task_id)?
        .ok_or(AssignmentError::UnknownTask(task_id))
}

fn already_assigned_on_conflict(err: PersistenceError, task_id: i64) -> AssignmentError {
    match err {
        PersistenceError::Conflict(_) => AssignmentError::AlreadyAssigned(task_id),
        other => AssignmentError::Store(other),
    }
}
