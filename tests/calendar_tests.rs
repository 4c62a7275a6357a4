use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use task_tracker::calendar::{HolidaySet, MAX_ESTIMATED_HOURS, WorkCalendar};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn weekends_unavailable_weekdays_available() {
    let holidays = HolidaySet::new();
    let cal = WorkCalendar::new(&holidays);
    // 2024-01-06 is a Saturday, 2024-01-07 a Sunday
    assert!(!cal.is_available(date(2024, 1, 6)));
    assert!(!cal.is_available(date(2024, 1, 7)));
    assert!(cal.is_available(date(2024, 1, 8)));
}

#[test]
fn full_day_lands_on_closing_time() {
    let holidays = HolidaySet::new();
    let cal = WorkCalendar::new(&holidays);
    // Monday 09:00, 3 hours before lunch and 5 after.
    assert_eq!(cal.compute_end_date(at(2024, 1, 1, 9, 0), 8), Some(at(2024, 1, 1, 18, 0)));
}

#[test]
fn friday_evening_rolls_over_the_weekend() {
    let holidays = HolidaySet::new();
    let cal = WorkCalendar::new(&holidays);
    assert_eq!(cal.compute_end_date(at(2024, 1, 5, 17, 0), 2), Some(at(2024, 1, 8, 10, 0)));
}

#[test]
fn zero_hours_returns_start_even_outside_working_time() {
    let holidays = HolidaySet::new();
    let cal = WorkCalendar::new(&holidays);
    for start in [
        at(2024, 1, 1, 9, 0),
        at(2024, 1, 6, 23, 15), // Saturday night
        at(2024, 1, 2, 12, 30), // lunch
    ] {
        assert_eq!(cal.compute_end_date(start, 0), Some(start));
    }
}

#[test]
fn holiday_pushes_end_by_a_working_day() {
    let mut holidays = HolidaySet::new();
    let plain = WorkCalendar::new(HolidaySet::new());
    let start = at(2024, 1, 2, 9, 0); // Tuesday
    assert_eq!(plain.compute_end_date(start, 16), Some(at(2024, 1, 3, 18, 0)));

    holidays.add_holiday(date(2024, 1, 3));
    let cal = WorkCalendar::new(&holidays);
    assert_eq!(cal.compute_end_date(start, 16), Some(at(2024, 1, 4, 18, 0)));
}

#[test]
fn start_on_a_holiday_keeps_its_time_of_day() {
    let holidays: HolidaySet = [date(2024, 12, 25)].into_iter().collect();
    let cal = WorkCalendar::new(&holidays);
    // Wednesday 25 Dec is skipped, work resumes Thursday at 14:00.
    assert_eq!(cal.compute_end_date(at(2024, 12, 25, 14, 0), 1), Some(at(2024, 12, 26, 15, 0)));
}

#[test]
fn weekend_start_carries_its_time_to_monday() {
    let holidays = HolidaySet::new();
    let cal = WorkCalendar::new(&holidays);
    // Saturday 14:00 -> Sunday 14:00 -> Monday 14:00, then one hour is worked.
    assert_eq!(cal.compute_end_date(at(2024, 1, 6, 14, 0), 1), Some(at(2024, 1, 8, 15, 0)));
    // Saturday evening reaches Monday after closing and waits for Tuesday's opening.
    assert_eq!(cal.compute_end_date(at(2024, 1, 6, 20, 0), 1), Some(at(2024, 1, 9, 10, 0)));
}

#[test]
fn weekend_and_holiday_chain_is_crossed_in_one_walk() {
    let holidays: HolidaySet = [date(2024, 1, 8)].into_iter().collect();
    let cal = WorkCalendar::new(&holidays);
    // Saturday, Sunday and the Monday holiday are all skipped at 11:00.
    assert_eq!(cal.compute_end_date(at(2024, 1, 6, 11, 0), 2), Some(at(2024, 1, 9, 14, 0)));
}

#[test]
fn start_in_lunch_hour_skips_to_afternoon() {
    let holidays = HolidaySet::new();
    let cal = WorkCalendar::new(&holidays);
    assert_eq!(cal.compute_end_date(at(2024, 1, 2, 12, 0), 1), Some(at(2024, 1, 2, 14, 0)));
}

#[test]
fn start_after_closing_begins_next_morning() {
    let holidays = HolidaySet::new();
    let cal = WorkCalendar::new(&holidays);
    assert_eq!(cal.compute_end_date(at(2024, 1, 2, 20, 0), 1), Some(at(2024, 1, 3, 10, 0)));
}

#[test]
fn off_the_hour_start_can_finish_after_closing() {
    let holidays = HolidaySet::new();
    let cal = WorkCalendar::new(&holidays);
    // 17:30 -> 18:30 consumes the last hour; 18:30 is not past hour 18, so it stays.
    assert_eq!(cal.compute_end_date(at(2024, 1, 2, 17, 30), 1), Some(at(2024, 1, 2, 18, 30)));
}

#[test]
fn results_stay_inside_working_days() {
    let mut holidays = HolidaySet::new();
    holidays.add_holidays(&[date(2024, 1, 1), date(2024, 1, 15)]);
    holidays.add_holiday(date(2024, 12, 25));
    let cal = WorkCalendar::new(&holidays);

    let starts = [
        at(2024, 1, 1, 9, 0),
        at(2024, 1, 5, 17, 0),
        at(2024, 1, 12, 13, 0),
        at(2024, 12, 24, 16, 0),
    ];
    for start in starts {
        for hours in 1..=60 {
            let end = cal.compute_end_date(start, hours).unwrap();
            assert!(end >= start, "{end} before {start}");
            assert!(cal.is_available(end.date()), "{end} on a non-working day");
            assert!((9..=18).contains(&end.hour()), "{end} outside working hours");
            if end.hour() == 12 || end.hour() == 18 {
                assert_eq!(end.minute(), 0, "{end} inside lunch or past closing");
            }
            assert!(!matches!(end.weekday(), Weekday::Sat | Weekday::Sun));
        }
    }
}

#[test]
fn whole_week_of_work() {
    let holidays = HolidaySet::new();
    let cal = WorkCalendar::new(&holidays);
    // Eight working hours a day, so 40 hours fill Monday through Friday.
    assert_eq!(cal.compute_end_date(at(2024, 1, 8, 9, 0), 40), Some(at(2024, 1, 12, 18, 0)));
}

#[test]
fn largest_budget_terminates_with_a_date() {
    let holidays: HolidaySet = [date(2024, 12, 25)].into_iter().collect();
    let cal = WorkCalendar::new(&holidays);
    let start = at(2024, 1, 1, 9, 0);

    let end = cal.compute_end_date(start, MAX_ESTIMATED_HOURS).unwrap();
    assert!(end.year() > 2050, "{end} is too early for {MAX_ESTIMATED_HOURS} hours");
    assert!(cal.is_available(end.date()));
    assert!((9..=18).contains(&end.hour()));
}

#[test]
fn budget_beyond_the_cap_has_no_end_date() {
    let holidays = HolidaySet::new();
    let cal = WorkCalendar::new(&holidays);
    let start = at(2024, 1, 1, 9, 0);
    assert_eq!(cal.compute_end_date(start, MAX_ESTIMATED_HOURS + 1), None);
    assert_eq!(cal.compute_end_date(start, u32::MAX), None);
}
