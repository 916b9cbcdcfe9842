use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::BTreeSet;

/// Which days count as working days. Weekend days and configured holidays
/// never produce attendance records; punches on them are dropped up front.
#[derive(Debug, Clone)]
pub struct WorkCalendar {
    weekend: Vec<Weekday>,
    holidays: BTreeSet<NaiveDate>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            weekend: vec![Weekday::Fri, Weekday::Sat],
            holidays: BTreeSet::new(),
        }
    }
}

impl WorkCalendar {
    pub fn new(weekend: Vec<Weekday>, holidays: Vec<NaiveDate>) -> Self {
        Self {
            weekend,
            holidays: holidays.into_iter().collect(),
        }
    }

    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.weekend.contains(&date.weekday()) && !self.holidays.contains(&date)
    }

    /// All working days in the inclusive range, ascending.
    pub fn working_days(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        let mut days = Vec::new();
        let mut current = from;
        while current <= to {
            if self.is_working_day(current) {
                days.push(current);
            }
            match current.checked_add_days(Days::new(1)) {
                Some(next) => current = next,
                None => break,
            }
        }
        days
    }
}
