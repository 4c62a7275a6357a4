use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike, Weekday};
use std::collections::HashSet;

/// First working hour of the day.
pub const OPENING_HOUR: u32 = 9;
/// The hour starting here is lunch and never counts as worked.
pub const LUNCH_HOUR: u32 = 12;
/// Work stops once the clock reaches this hour.
pub const CLOSING_HOUR: u32 = 18;
/// Largest budget the calculator accepts, about 48 years of
/// eight-hour working days.
pub const MAX_ESTIMATED_HOURS: u32 = 100_000;

const NON_WORKING_DAYS: [Weekday; 2] = [Weekday::Sat, Weekday::Sun];

/// Answers whether a calendar date is a configured non-working day.
pub trait HolidayLookup {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

impl<T: HolidayLookup + ?Sized> HolidayLookup for &T {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        (**self).is_holiday(date)
    }
}

/// In-memory holiday list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HolidaySet {
    dates: HashSet<NaiveDate>,
}

impl HolidaySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single holiday
    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.dates.insert(date);
    }

    /// Add multiple holidays at once
    pub fn add_holidays(&mut self, dates: &[NaiveDate]) {
        self.dates.extend(dates);
    }
}

impl FromIterator<NaiveDate> for HolidaySet {
    fn from_iter<I: IntoIterator<Item = NaiveDate>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

impl HolidayLookup for HolidaySet {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// Monday to Friday calendar with a 09:00-18:00 working window and a lunch
/// hour at 12:00, plus whatever holidays the lookup reports.
pub struct WorkCalendar<H> {
    holidays: H,
}

impl<H: HolidayLookup> WorkCalendar<H> {
    pub fn new(holidays: H) -> Self {
        Self { holidays }
    }

    /// Check if a date is a working day
    pub fn is_available(&self, date: NaiveDate) -> bool {
        !NON_WORKING_DAYS.contains(&date.weekday()) && !self.holidays.is_holiday(date)
    }

    /// Timestamp at which `estimated_hours` working hours have elapsed after `start`.
    ///
    /// A zero budget returns `start` untouched. Otherwise the clock walks forward one
    /// hour at a time: a non-working day moves to the same time on the next day, the
    /// lunch hour is stepped over, and anything at or past closing jumps to the next
    /// day's opening. Every other hour is consumed.
    ///
    /// Returns `None` when the budget exceeds [`MAX_ESTIMATED_HOURS`] or the walk
    /// runs off the end of the representable date range.
    pub fn compute_end_date(
        &self,
        start: NaiveDateTime,
        estimated_hours: u32,
    ) -> Option<NaiveDateTime> {
        if estimated_hours > MAX_ESTIMATED_HOURS {
            return None;
        }

        let mut end = start;
        let mut remaining = estimated_hours;
        // The holiday lookup may hit the store, so ask once per date.
        let mut last_checked: Option<(NaiveDate, bool)> = None;

        while remaining > 0 {
            let date = end.date();
            let available = match last_checked {
                Some((checked, available)) if checked == date => available,
                _ => {
                    let available = self.is_available(date);
                    last_checked = Some((date, available));
                    available
                }
            };

            if !available {
                end = end.checked_add_signed(Duration::days(1))?;
                continue;
            }

            if end.hour() == LUNCH_HOUR {
                end = end.checked_add_signed(Duration::hours(1))?;
                continue;
            }

            if end.hour() >= CLOSING_HOUR {
                end = opening_of(date.succ_opt()?)?;
                continue;
            }

            remaining -= 1;
            end = end.checked_add_signed(Duration::hours(1))?;
        }

        // A start off the hour can consume its way past closing.
        if end.hour() > CLOSING_HOUR {
            end = opening_of(end.date().succ_opt()?)?;
        }

        Some(end)
    }
}

fn opening_of(date: NaiveDate) -> Option<NaiveDateTime> {
    date.and_hms_opt(OPENING_HOUR, 0, 0)
}
