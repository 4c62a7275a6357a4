pub mod assignment;
#[cfg(feature = "http_api")]
pub mod auth;
pub mod calendar;
pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod model;
pub mod persistence;
pub mod timestamp;

pub use assignment::{AssignmentError, AssignmentRequest, AssignmentUpdate};
pub use calendar::{HolidayLookup, HolidaySet, MAX_ESTIMATED_HOURS, WorkCalendar};
pub use config::{ConfigError, TrackerConfig};
pub use model::{Holiday, Task, TaskAssignment, User};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteTrackerStore;
pub use persistence::{PersistenceError, StoredHolidays, TrackerStore};
pub use timestamp::{TIMESTAMP_FORMAT, format_timestamp, parse_timestamp};
