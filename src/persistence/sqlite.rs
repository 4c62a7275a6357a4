use super::{PersistenceError, PersistenceResult, TrackerStore};
use crate::model::{
    Holiday, NewTask, NewTaskAssignment, NewUser, Task, TaskAssignment, TaskAssignmentChanges,
    TaskChanges, User, UserChanges,
};
use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use tracing::debug;

const USER_COLUMNS: &str = "id, username, name, email, password_hash";
const TASK_COLUMNS: &str = "id, title, estimated_hours";
const ASSIGNMENT_COLUMNS: &str = "id, task_id, username, start_date, end_date";
const HOLIDAY_COLUMNS: &str = "id, holiday_date";

pub struct SqliteTrackerStore {
    connection: Mutex<Connection>,
}

impl SqliteTrackerStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection)
    }

    pub fn open_in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    // No foreign keys: deleting a task leaves its assignment in place.
    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                password_hash TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL UNIQUE,
                estimated_hours INTEGER NOT NULL CHECK (estimated_hours >= 0)
            );
            CREATE TABLE IF NOT EXISTS task_assignments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id INTEGER NOT NULL UNIQUE,
                username TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS holidays (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                holiday_date TEXT NOT NULL UNIQUE
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            password_hash: row.get(4)?,
        })
    }

    fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            estimated_hours: row.get(2)?,
        })
    }

    fn assignment_from_row(row: &Row<'_>) -> rusqlite::Result<TaskAssignment> {
        Ok(TaskAssignment {
            id: row.get(0)?,
            task_id: row.get(1)?,
            username: row.get(2)?,
            start_date: row.get(3)?,
            end_date: row.get(4)?,
        })
    }

    fn holiday_from_row(row: &Row<'_>) -> rusqlite::Result<Holiday> {
        Ok(Holiday {
            id: row.get(0)?,
            holiday_date: row.get(1)?,
        })
    }

    fn query_user(
        conn: &Connection,
        filter: &str,
        value: &dyn rusqlite::ToSql,
    ) -> PersistenceResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {filter} = ?1");
        let user = conn
            .query_row(&sql, [value], Self::user_from_row)
            .optional()?;
        Ok(user)
    }

    fn query_task(
        conn: &Connection,
        filter: &str,
        value: &dyn rusqlite::ToSql,
    ) -> PersistenceResult<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE {filter} = ?1");
        let task = conn
            .query_row(&sql, [value], Self::task_from_row)
            .optional()?;
        Ok(task)
    }

    fn query_assignment(
        conn: &Connection,
        filter: &str,
        value: &dyn rusqlite::ToSql,
    ) -> PersistenceResult<Option<TaskAssignment>> {
        let sql = format!("SELECT {ASSIGNMENT_COLUMNS} FROM task_assignments WHERE {filter} = ?1");
        let assignment = conn
            .query_row(&sql, [value], Self::assignment_from_row)
            .optional()?;
        Ok(assignment)
    }

    fn query_holiday(
        conn: &Connection,
        filter: &str,
        value: &dyn rusqlite::ToSql,
    ) -> PersistenceResult<Option<Holiday>> {
        let sql = format!("SELECT {HOLIDAY_COLUMNS} FROM holidays WHERE {filter} = ?1");
        let holiday = conn
            .query_row(&sql, [value], Self::holiday_from_row)
            .optional()?;
        Ok(holiday)
    }

    fn delete_by_id(&self, table: &str, id: i64) -> PersistenceResult<bool> {
        let conn = self.connection.lock();
        let removed = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])?;
        debug!(table, id, removed, "delete");
        Ok(removed > 0)
    }
}

/// Turns a UNIQUE/CHECK violation into [`PersistenceError::Conflict`].
fn write_error(err: rusqlite::Error, what: &str) -> PersistenceError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            return PersistenceError::Conflict(format!("{what} already exists"));
        }
    }
    PersistenceError::Sqlite(err)
}

impl TrackerStore for SqliteTrackerStore {
    fn insert_user(&self, user: &NewUser) -> PersistenceResult<User> {
        let conn = self.connection.lock();
        conn.execute(
            "INSERT INTO users (username, name, email, password_hash) VALUES (?1, ?2, ?3, ?4)",
            params![user.username, user.name, user.email, user.password_hash],
        )
        .map_err(|err| write_error(err, "user"))?;
        let id = conn.last_insert_rowid();
        Self::query_user(&conn, "id", &id)?.ok_or(PersistenceError::NotFound)
    }

    fn find_user_by_username(&self, username: &str) -> PersistenceResult<Option<User>> {
        let conn = self.connection.lock();
        Self::query_user(&conn, "username", &username)
    }

    fn update_user(
        &self,
        username: &str,
        changes: &UserChanges,
    ) -> PersistenceResult<Option<User>> {
        let conn = self.connection.lock();
        let updated = conn.execute(
            "UPDATE users SET
                name = COALESCE(?2, name),
                email = COALESCE(?3, email),
                password_hash = COALESCE(?4, password_hash)
             WHERE username = ?1",
            params![username, changes.name, changes.email, changes.password_hash],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        Self::query_user(&conn, "username", &username)
    }

    fn insert_task(&self, task: &NewTask) -> PersistenceResult<Task> {
        let conn = self.connection.lock();
        conn.execute(
            "INSERT INTO tasks (title, estimated_hours) VALUES (?1, ?2)",
            params![task.title, task.estimated_hours],
        )
        .map_err(|err| write_error(err, "task title"))?;
        let id = conn.last_insert_rowid();
        Self::query_task(&conn, "id", &id)?.ok_or(PersistenceError::NotFound)
    }

    fn find_task(&self, id: i64) -> PersistenceResult<Option<Task>> {
        let conn = self.connection.lock();
        Self::query_task(&conn, "id", &id)
    }

    fn find_task_by_title(&self, title: &str) -> PersistenceResult<Option<Task>> {
        let conn = self.connection.lock();
        Self::query_task(&conn, "title", &title)
    }

    fn update_task(&self, id: i64, changes: &TaskChanges) -> PersistenceResult<Option<Task>> {
        let conn = self.connection.lock();
        let updated = conn
            .execute(
                "UPDATE tasks SET
                    title = COALESCE(?2, title),
                    estimated_hours = COALESCE(?3, estimated_hours)
                 WHERE id = ?1",
                params![id, changes.title, changes.estimated_hours],
            )
            .map_err(|err| write_error(err, "task title"))?;
        if updated == 0 {
            return Ok(None);
        }
        Self::query_task(&conn, "id", &id)
    }

    fn delete_task(&self, id: i64) -> PersistenceResult<bool> {
        self.delete_by_id("tasks", id)
    }

    fn insert_assignment(
        &self,
        assignment: &NewTaskAssignment,
    ) -> PersistenceResult<TaskAssignment> {
        let conn = self.connection.lock();
        conn.execute(
            "INSERT INTO task_assignments (task_id, username, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                assignment.task_id,
                assignment.username,
                assignment.start_date,
                assignment.end_date
            ],
        )
        .map_err(|err| write_error(err, "assignment for this task"))?;
        let id = conn.last_insert_rowid();
        Self::query_assignment(&conn, "id", &id)?.ok_or(PersistenceError::NotFound)
    }

    fn find_assignment(&self, id: i64) -> PersistenceResult<Option<TaskAssignment>> {
        let conn = self.connection.lock();
        Self::query_assignment(&conn, "id", &id)
    }

    fn find_assignment_by_task(&self, task_id: i64) -> PersistenceResult<Option<TaskAssignment>> {
        let conn = self.connection.lock();
        Self::query_assignment(&conn, "task_id", &task_id)
    }

    fn update_assignment(
        &self,
        id: i64,
        changes: &TaskAssignmentChanges,
    ) -> PersistenceResult<Option<TaskAssignment>> {
        let conn = self.connection.lock();
        let updated = conn
            .execute(
                "UPDATE task_assignments SET
                    task_id = COALESCE(?2, task_id),
                    username = COALESCE(?3, username),
                    start_date = COALESCE(?4, start_date),
                    end_date = COALESCE(?5, end_date)
                 WHERE id = ?1",
                params![
                    id,
                    changes.task_id,
                    changes.username,
                    changes.start_date,
                    changes.end_date
                ],
            )
            .map_err(|err| write_error(err, "assignment for this task"))?;
        if updated == 0 {
            return Ok(None);
        }
        Self::query_assignment(&conn, "id", &id)
    }

    fn delete_assignment(&self, id: i64) -> PersistenceResult<bool> {
        self.delete_by_id("task_assignments", id)
    }

    fn insert_holiday(&self, date: NaiveDate) -> PersistenceResult<Holiday> {
        let conn = self.connection.lock();
        conn.execute(
            "INSERT INTO holidays (holiday_date) VALUES (?1)",
            params![date],
        )
        .map_err(|err| write_error(err, "holiday"))?;
        let id = conn.last_insert_rowid();
        Self::query_holiday(&conn, "id", &id)?.ok_or(PersistenceError::NotFound)
    }

    fn find_holiday(&self, id: i64) -> PersistenceResult<Option<Holiday>> {
        let conn = self.connection.lock();
        Self::query_holiday(&conn, "id", &id)
    }

    fn find_holiday_by_date(&self, date: NaiveDate) -> PersistenceResult<Option<Holiday>> {
        let conn = self.connection.lock();
        Self::query_holiday(&conn, "holiday_date", &date)
    }

    fn update_holiday(
        &self,
        id: i64,
        holiday_date: Option<NaiveDate>,
    ) -> PersistenceResult<Option<Holiday>> {
        let conn = self.connection.lock();
        let updated = conn
            .execute(
                "UPDATE holidays SET holiday_date = COALESCE(?2, holiday_date) WHERE id = ?1",
                params![id, holiday_date],
            )
            .map_err(|err| write_error(err, "holiday"))?;
        if updated == 0 {
            return Ok(None);
        }
        Self::query_holiday(&conn, "id", &id)
    }

    fn delete_holiday(&self, id: i64) -> PersistenceResult<bool> {
        self.delete_by_id("holidays", id)
    }
}
