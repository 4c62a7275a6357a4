#![cfg(feature = "sqlite")]

use chrono::NaiveDate;
use task_tracker::{
    HolidayLookup, PersistenceError, SqliteTrackerStore, StoredHolidays, TrackerStore,
    model::{NewTask, NewTaskAssignment, NewUser, TaskAssignmentChanges, TaskChanges, UserChanges},
};
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.into(),
        name: "Grace".into(),
        email: format!("{username}@example.com"),
        password_hash: "$argon2id$placeholder".into(),
    }
}

fn new_task(title: &str, hours: u32) -> NewTask {
    NewTask {
        title: title.into(),
        estimated_hours: hours,
    }
}

#[test]
fn records_survive_reopening_the_file() {
    let file = NamedTempFile::new().unwrap();
    {
        let store = SqliteTrackerStore::new(file.path()).unwrap();
        store.insert_user(&new_user("grace")).unwrap();
        store.insert_task(&new_task("Design", 5)).unwrap();
        store.insert_holiday(d(2024, 12, 25)).unwrap();
    }

    let store = SqliteTrackerStore::new(file.path()).unwrap();
    let user = store.find_user_by_username("grace").unwrap().expect("user stored");
    assert_eq!(user.email, "grace@example.com");
    assert_eq!(user.password_hash, "$argon2id$placeholder");

    let task = store.find_task_by_title("Design").unwrap().expect("task stored");
    assert_eq!(task.estimated_hours, 5);

    let holiday = store
        .find_holiday_by_date(d(2024, 12, 25))
        .unwrap()
        .expect("holiday stored");
    assert_eq!(holiday.holiday_date, d(2024, 12, 25));
}

#[test]
fn unique_columns_report_conflicts() {
    let store = SqliteTrackerStore::open_in_memory().unwrap();

    store.insert_user(&new_user("grace")).unwrap();
    assert!(matches!(
        store.insert_user(&new_user("grace")),
        Err(PersistenceError::Conflict(_))
    ));

    let first = store.insert_task(&new_task("Design", 5)).unwrap();
    let second = store.insert_task(&new_task("Build", 3)).unwrap();
    assert_ne!(first.id, second.id);
    assert!(matches!(
        store.insert_task(&new_task("Design", 1)),
        Err(PersistenceError::Conflict(_))
    ));
    let rename = TaskChanges {
        title: Some("Design".into()),
        ..TaskChanges::default()
    };
    assert!(matches!(
        store.update_task(second.id, &rename),
        Err(PersistenceError::Conflict(_))
    ));

    store.insert_holiday(d(2024, 1, 1)).unwrap();
    assert!(matches!(
        store.insert_holiday(d(2024, 1, 1)),
        Err(PersistenceError::Conflict(_))
    ));

    let assignment = NewTaskAssignment {
        task_id: first.id,
        username: "grace".into(),
        start_date: "2024-01-02 9:00 AM".into(),
        end_date: "2024-01-02 3:00 PM".into(),
    };
    store.insert_assignment(&assignment).unwrap();
    assert!(matches!(
        store.insert_assignment(&assignment),
        Err(PersistenceError::Conflict(_))
    ));
}

#[test]
fn partial_updates_only_touch_supplied_fields() {
    let store = SqliteTrackerStore::open_in_memory().unwrap();

    let task = store.insert_task(&new_task("Design", 5)).unwrap();
    let changes = TaskChanges {
        estimated_hours: Some(12),
        ..TaskChanges::default()
    };
    let updated = store.update_task(task.id, &changes).unwrap().unwrap();
    assert_eq!(updated.title, "Design");
    assert_eq!(updated.estimated_hours, 12);
    assert!(store.update_task(999, &changes).unwrap().is_none());

    store.insert_user(&new_user("grace")).unwrap();
    let user = store
        .update_user(
            "grace",
            &UserChanges {
                password_hash: Some("$argon2id$rotated".into()),
                ..UserChanges::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(user.name, "Grace");
    assert_eq!(user.password_hash, "$argon2id$rotated");

    let assignment = store
        .insert_assignment(&NewTaskAssignment {
            task_id: task.id,
            username: "grace".into(),
            start_date: "2024-01-02 9:00 AM".into(),
            end_date: "2024-01-02 3:00 PM".into(),
        })
        .unwrap();
    let moved = store
        .update_assignment(
            assignment.id,
            &TaskAssignmentChanges {
                end_date: Some("2024-01-03 9:00 AM".into()),
                ..TaskAssignmentChanges::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(moved.start_date, "2024-01-02 9:00 AM");
    assert_eq!(moved.end_date, "2024-01-03 9:00 AM");

    let holiday = store.insert_holiday(d(2024, 1, 1)).unwrap();
    let kept = store.update_holiday(holiday.id, None).unwrap().unwrap();
    assert_eq!(kept.holiday_date, d(2024, 1, 1));
    let moved = store
        .update_holiday(holiday.id, Some(d(2024, 1, 2)))
        .unwrap()
        .unwrap();
    assert_eq!(moved.holiday_date, d(2024, 1, 2));
}

#[test]
fn deleting_a_task_keeps_its_assignment() {
    let store = SqliteTrackerStore::open_in_memory().unwrap();
    let task = store.insert_task(&new_task("Design", 5)).unwrap();
    let assignment = store
        .insert_assignment(&NewTaskAssignment {
            task_id: task.id,
            username: "grace".into(),
            start_date: "2024-01-02 9:00 AM".into(),
            end_date: "2024-01-02 3:00 PM".into(),
        })
        .unwrap();

    assert!(store.delete_task(task.id).unwrap());
    assert!(!store.delete_task(task.id).unwrap());
    assert!(store.find_task(task.id).unwrap().is_none());

    let found = store.find_assignment_by_task(task.id).unwrap();
    assert_eq!(found, Some(assignment.clone()));
    assert!(store.delete_assignment(assignment.id).unwrap());
    assert!(store.find_assignment(assignment.id).unwrap().is_none());
}

#[test]
fn stored_holidays_answer_lookups() {
    let store = SqliteTrackerStore::open_in_memory().unwrap();
    let holiday = store.insert_holiday(d(2024, 7, 4)).unwrap();

    let lookup = StoredHolidays::new(&store);
    assert!(lookup.is_holiday(d(2024, 7, 4)));
    assert!(!lookup.is_holiday(d(2024, 7, 5)));

    assert!(store.delete_holiday(holiday.id).unwrap());
    assert!(!lookup.is_holiday(d(2024, 7, 4)));
}
