use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::warn;

use crate::model::leave::ApprovedLeave;

/// Approved requests indexed per (employee, day) for O(1) lookup during
/// classification. Built once per batch or report window.
#[derive(Debug, Default)]
pub struct LeaveIndex {
    intervals: Vec<ApprovedLeave>,
    by_day: HashMap<(u64, NaiveDate), usize>,
}

impl LeaveIndex {
    /// Index the intervals against an inclusive window. Days outside the
    /// window are never looked up, so they are not indexed. When two approved
    /// intervals overlap on one day (a forms-subsystem integrity violation),
    /// the earliest start date wins, then the smaller id.
    pub fn build(intervals: Vec<ApprovedLeave>, from: NaiveDate, to: NaiveDate) -> Self {
        let mut index = Self {
            by_day: HashMap::new(),
            intervals,
        };

        for (pos, interval) in index.intervals.iter().enumerate() {
            let mut day = interval.start_date.max(from);
            let last = interval.end_date.min(to);
            while day <= last {
                match index.by_day.get(&(interval.employee_id, day)) {
                    Some(&existing_pos) => {
                        let existing = &index.intervals[existing_pos];
                        warn!(
                            employee_id = interval.employee_id,
                            date = %day,
                            kept = existing.id,
                            dropped = interval.id,
                            "overlapping approved leave intervals, earliest start wins"
                        );
                        if (interval.start_date, interval.id) < (existing.start_date, existing.id)
                        {
                            index.by_day.insert((interval.employee_id, day), pos);
                        }
                    }
                    None => {
                        index.by_day.insert((interval.employee_id, day), pos);
                    }
                }
                day = match day.succ_opt() {
                    Some(next) => next,
                    None => break,
                };
            }
        }
        index
    }

    pub fn for_day(&self, employee_id: u64, date: NaiveDate) -> Option<&ApprovedLeave> {
        self.by_day
            .get(&(employee_id, date))
            .map(|&pos| &self.intervals[pos])
    }

    /// The raw interval list, for the report layer's "approved requests this
    /// month" badges.
    pub fn intervals(&self) -> &[ApprovedLeave] {
        &self.intervals
    }
}
