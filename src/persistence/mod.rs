use crate::calendar::HolidayLookup;
use crate::model::{
    Holiday, NewTask, NewTaskAssignment, NewUser, Task, TaskAssignment, TaskAssignmentChanges,
    TaskChanges, User, UserChanges,
};
use chrono::NaiveDate;
use std::fmt;
use tracing::warn;

#[derive(Debug)]
pub enum PersistenceError {
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    /// A unique column already holds the value being written.
    Conflict(String),
    NotFound,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Conflict(msg) => write!(f, "conflict: {msg}"),
            PersistenceError::NotFound => write!(f, "record not found"),
        }
    }
}

impl std::error::Error for PersistenceError {}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Relational store behind the tracker.
///
/// Lookups return `Ok(None)` for a missing row. `update_*` apply only the
/// supplied fields and return `Ok(None)` when the id is unknown; `delete_*`
/// report whether a row was removed. Writes that collide with a unique
/// column fail with [`PersistenceError::Conflict`].
pub trait TrackerStore: Send + Sync {
    fn insert_user(&self, user: &NewUser) -> PersistenceResult<User>;
    fn find_user_by_username(&self, username: &str) -> PersistenceResult<Option<User>>;
    fn update_user(&self, username: &str, changes: &UserChanges)
    -> PersistenceResult<Option<User>>;

    fn insert_task(&self, task: &NewTask) -> PersistenceResult<Task>;
    fn find_task(&self, id: i64) -> PersistenceResult<Option<Task>>;
    fn find_task_by_title(&self, title: &str) -> PersistenceResult<Option<Task>>;
    fn update_task(&self, id: i64, changes: &TaskChanges) -> PersistenceResult<Option<Task>>;
    fn delete_task(&self, id: i64) -> PersistenceResult<bool>;

    fn insert_assignment(&self, assignment: &NewTaskAssignment)
    -> PersistenceResult<TaskAssignment>;
    fn find_assignment(&self, id: i64) -> PersistenceResult<Option<TaskAssignment>>;
    fn find_assignment_by_task(&self, task_id: i64) -> PersistenceResult<Option<TaskAssignment>>;
    fn update_assignment(
        &self,
        id: i64,
        changes: &TaskAssignmentChanges,
    ) -> PersistenceResult<Option<TaskAssignment>>;
    fn delete_assignment(&self, id: i64) -> PersistenceResult<bool>;

    fn insert_holiday(&self, date: NaiveDate) -> PersistenceResult<Holiday>;
    fn find_holiday(&self, id: i64) -> PersistenceResult<Option<Holiday>>;
    fn find_holiday_by_date(&self, date: NaiveDate) -> PersistenceResult<Option<Holiday>>;
    fn update_holiday(
        &self,
        id: i64,
        holiday_date: Option<NaiveDate>,
    ) -> PersistenceResult<Option<Holiday>>;
    fn delete_holiday(&self, id: i64) -> PersistenceResult<bool>;
}

/// Holiday lookup backed by the store's holiday table.
///
/// A failing query counts as "not a holiday" so the end-date calculation
/// never fails; the error is logged.
pub struct StoredHolidays<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S: TrackerStore + ?Sized> StoredHolidays<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }
}

impl<S: TrackerStore + ?Sized> HolidayLookup for StoredHolidays<'_, S> {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        match self.store.find_holiday_by_date(date) {
            Ok(found) => found.is_some(),
            Err(err) => {
                warn!(%date, error = %err, "holiday lookup failed, treating date as a working day");
                false
            }
        }
    }
}

#[cfg(feature = "sqlite")]
pub mod sqlite;
