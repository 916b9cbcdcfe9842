use chrono::{NaiveDate, NaiveTime};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

use crate::config::AttendancePolicy;
use crate::engine::calendar::WorkCalendar;
use crate::engine::classifier::classify_day;
use crate::engine::leave::LeaveIndex;
use crate::engine::parser::FileParse;
use crate::engine::resolver::EmployeeDirectory;
use crate::model::attendance::DailyRecord;
use crate::model::report::{UnmatchedCode, UploadSummary};

/// What one batch produces: the replacement day records and the summary the
/// HR admin sees.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub records: Vec<DailyRecord>,
    pub summary: UploadSummary,
}

/// Inclusive date span observed in a set of parsed files.
pub fn punch_span(parses: &[FileParse]) -> Option<(NaiveDate, NaiveDate)> {
    let dates = parses.iter().flat_map(|p| p.punches.iter().map(|punch| punch.date));
    let min = dates.clone().min()?;
    let max = dates.max()?;
    Some((min, max))
}

/// Turn parsed files into day records. Weekend/holiday punches are dropped
/// before grouping; every active coded employee gets exactly one record per
/// working day inside the observed span, whether or not they punched.
pub fn reconcile_batch(
    parses: Vec<FileParse>,
    directory: &EmployeeDirectory,
    calendar: &WorkCalendar,
    leaves: &LeaveIndex,
    policy: &AttendancePolicy,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    // Per-file counters merge associatively; order carries no meaning.
    for parse in &parses {
        outcome.summary.absorb(UploadSummary {
            processed_files: 1,
            total_files: 1,
            total_records: parse.total_rows,
            successful_records: parse.punches.len() as u64,
            failed_records: parse.failed_rows,
            weekend_skipped: 0,
            unmatched_codes: Vec::new(),
        });
    }

    // Names seen next to codes, for labelling unmatched codes.
    let mut names: HashMap<String, String> = HashMap::new();
    for parse in &parses {
        for (code, name) in &parse.names {
            names.entry(code.clone()).or_insert_with(|| name.clone());
        }
    }

    // Weekend filter first, so off-day punches never reach grouping, then
    // resolution. Unmatched codes dedup by (code, file).
    let mut grouped: HashMap<(u64, NaiveDate), Vec<NaiveTime>> = HashMap::new();
    let mut unmatched: BTreeMap<(String, String), Option<String>> = BTreeMap::new();
    for parse in parses {
        for punch in parse.punches {
            if !calendar.is_working_day(punch.date) {
                outcome.summary.weekend_skipped += 1;
                continue;
            }
            match directory.resolve(&punch.employee_code) {
                Some(employee) => {
                    grouped
                        .entry((employee.id, punch.date))
                        .or_default()
                        .push(punch.time);
                }
                None => {
                    unmatched
                        .entry((punch.employee_code.clone(), punch.source_file))
                        .or_insert_with(|| names.get(&punch.employee_code).cloned());
                }
            }
        }
    }

    outcome.summary.unmatched_codes = unmatched
        .into_iter()
        .map(|((code, file), name)| UnmatchedCode { code, name, file })
        .collect();

    // The span the batch actually evidenced: resolved punches on working
    // days. Unmatched or off-day punches must not widen it.
    let span = {
        let dates = grouped.keys().map(|(_, date)| *date);
        dates.clone().min().zip(dates.max())
    };
    let Some((from, to)) = span else {
        return outcome;
    };

    // Classification covers the full observed span for everyone the device
    // could have seen: a no-punch day inside the span is evidence (absence or
    // approved leave), not a gap.
    let mut employees: Vec<_> = directory.employees().collect();
    employees.sort_by_key(|e| e.id);
    let empty: Vec<NaiveTime> = Vec::new();
    for employee in employees {
        for date in calendar.working_days(from, to) {
            let times = grouped.get(&(employee.id, date)).unwrap_or(&empty);
            let leave = leaves.for_day(employee.id, date);
            outcome
                .records
                .push(classify_day(employee, date, times, leave, policy));
        }
    }

    info!(
        records = outcome.records.len(),
        unmatched = outcome.summary.unmatched_codes.len(),
        weekend_skipped = outcome.summary.weekend_skipped,
        "batch reconciled"
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::{DayStatus, RawPunch};
    use crate::model::employee::Employee;
    use crate::model::leave::{ApprovedLeave, LeaveKind};
    use pretty_assertions::assert_eq;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn employee(id: u64, code: &str) -> Employee {
        Employee {
            id,
            name: format!("Employee {id}"),
            department: "Ops".to_string(),
            employee_code: Some(code.to_string()),
            schedule_start: time(10, 0),
            schedule_end: time(19, 0),
        }
    }

    fn punch(code: &str, d: u32, h: u32, m: u32) -> RawPunch {
        RawPunch {
            employee_code: code.to_string(),
            date: date(d),
            time: time(h, m),
            source_file: "a.xlsx".to_string(),
        }
    }

    fn file(punches: Vec<RawPunch>, total: u64, failed: u64) -> FileParse {
        FileParse {
            file: "a.xlsx".to_string(),
            punches,
            total_rows: total,
            failed_rows: failed,
            names: HashMap::new(),
        }
    }

    fn no_leaves() -> LeaveIndex {
        LeaveIndex::build(vec![], date(1), date(31))
    }

    #[test]
    fn weekend_punches_never_become_records() {
        let directory = EmployeeDirectory::new(vec![employee(1, "1001")]);
        // 2026-03-06 is a Friday.
        let outcome = reconcile_batch(
            vec![file(vec![punch("1001", 6, 10, 0), punch("1001", 6, 19, 0)], 2, 0)],
            &directory,
            &WorkCalendar::default(),
            &no_leaves(),
            &AttendancePolicy::default(),
        );
        assert_eq!(outcome.summary.weekend_skipped, 2);
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn unmatched_codes_are_reported_once_per_file() {
        let directory = EmployeeDirectory::new(vec![employee(1, "1001")]);
        let outcome = reconcile_batch(
            vec![file(
                vec![punch("9999", 2, 10, 0), punch("9999", 2, 19, 0), punch("1001", 2, 10, 0)],
                3,
                0,
            )],
            &directory,
            &WorkCalendar::default(),
            &no_leaves(),
            &AttendancePolicy::default(),
        );
        assert_eq!(outcome.summary.unmatched_codes.len(), 1);
        assert_eq!(outcome.summary.unmatched_codes[0].code, "9999");
        // The resolvable employee still classified.
        assert_eq!(outcome.records.len(), 1);
    }

    #[test]
    fn no_punch_day_with_vacation_becomes_on_leave() {
        let directory = EmployeeDirectory::new(vec![employee(1, "1001")]);
        let leaves = LeaveIndex::build(
            vec![ApprovedLeave {
                id: 42,
                employee_id: 1,
                kind: LeaveKind::Vacation,
                start_date: date(3),
                end_date: date(3),
            }],
            date(1),
            date(31),
        );
        // Punches on Monday the 2nd and Wednesday the 4th; nothing Tuesday.
        let outcome = reconcile_batch(
            vec![file(
                vec![
                    punch("1001", 2, 10, 0),
                    punch("1001", 2, 19, 0),
                    punch("1001", 4, 10, 0),
                    punch("1001", 4, 19, 0),
                ],
                4,
                0,
            )],
            &directory,
            &WorkCalendar::default(),
            &leaves,
            &AttendancePolicy::default(),
        );

        assert_eq!(outcome.records.len(), 3);
        let tuesday = outcome.records.iter().find(|r| r.date == date(3)).unwrap();
        assert_eq!(tuesday.status, DayStatus::OnLeave);
        assert_eq!(tuesday.related_leave_id, Some(42));
        assert_eq!(tuesday.fingerprint_deduction, 0.0);
    }

    #[test]
    fn no_punch_day_without_leave_becomes_absent() {
        let directory = EmployeeDirectory::new(vec![employee(1, "1001"), employee(2, "1002")]);
        let outcome = reconcile_batch(
            vec![file(vec![punch("1001", 2, 10, 0), punch("1001", 2, 19, 0)], 2, 0)],
            &directory,
            &WorkCalendar::default(),
            &no_leaves(),
            &AttendancePolicy::default(),
        );
        // Span is one day; both directory employees get a record.
        assert_eq!(outcome.records.len(), 2);
        let absent = outcome.records.iter().find(|r| r.employee_id == 2).unwrap();
        assert_eq!(absent.status, DayStatus::Absent);
    }

    #[test]
    fn file_counters_roll_up() {
        let directory = EmployeeDirectory::new(vec![employee(1, "1001")]);
        let outcome = reconcile_batch(
            vec![
                file(vec![punch("1001", 2, 10, 0)], 2, 1),
                file(vec![punch("1001", 3, 10, 0)], 1, 0),
                file(vec![], 0, 0),
            ],
            &directory,
            &WorkCalendar::default(),
            &no_leaves(),
            &AttendancePolicy::default(),
        );
        assert_eq!(outcome.summary.processed_files, 3);
        assert_eq!(outcome.summary.total_files, 3);
        assert_eq!(outcome.summary.total_records, 3);
        assert_eq!(outcome.summary.successful_records, 2);
        assert_eq!(outcome.summary.failed_records, 1);
    }

    #[test]
    fn exactly_one_record_per_employee_day() {
        let directory = EmployeeDirectory::new(vec![employee(1, "1001")]);
        let outcome = reconcile_batch(
            vec![file(
                vec![
                    punch("1001", 2, 10, 0),
                    punch("1001", 2, 13, 0),
                    punch("1001", 2, 19, 0),
                ],
                3,
                0,
            )],
            &directory,
            &WorkCalendar::default(),
            &no_leaves(),
            &AttendancePolicy::default(),
        );
        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.clock_in, Some(time(10, 0)));
        assert_eq!(record.clock_out, Some(time(19, 0)));
    }
}
