use chrono::{NaiveDate, NaiveTime};

use crate::config::AttendancePolicy;
use crate::model::attendance::{DailyRecord, DayStatus, FingerprintMiss};
use crate::model::employee::Employee;
use crate::model::leave::{ApprovedLeave, LeaveKind};

/// What is known about one (employee, date) before classification. Approved
/// forms always outrank punch data for the same date, so this is an ordered
/// dispatch, not a pile of nested conditionals.
#[derive(Debug, Clone, Copy)]
enum DayEvidence<'a> {
    Leave(&'a ApprovedLeave),
    Excuse(&'a ApprovedLeave),
    Wfh(&'a ApprovedLeave),
    Punches,
}

impl<'a> DayEvidence<'a> {
    fn from_leave(leave: Option<&'a ApprovedLeave>) -> Self {
        match leave {
            Some(leave) => match leave.kind {
                LeaveKind::Vacation | LeaveKind::SickLeave => DayEvidence::Leave(leave),
                LeaveKind::Excuse => DayEvidence::Excuse(leave),
                LeaveKind::Wfh => DayEvidence::Wfh(leave),
            },
            None => DayEvidence::Punches,
        }
    }
}

/// Produce the canonical day record for one employee on one working date.
///
/// Missing data never errors: no punches degrades to `absent`, a single punch
/// to a missed-punch flag plus the policy deduction. An employee who badges
/// in while on approved vacation stays `on_leave`; the punches are kept on
/// the record for audit only.
pub fn classify_day(
    employee: &Employee,
    date: NaiveDate,
    punch_times: &[NaiveTime],
    leave: Option<&ApprovedLeave>,
    policy: &AttendancePolicy,
) -> DailyRecord {
    let (clock_in, clock_out) = bracket_punches(punch_times);

    let mut record = DailyRecord {
        employee_id: employee.id,
        date,
        clock_in,
        clock_out,
        status: DayStatus::Absent,
        minutes_late: 0,
        minutes_overtime: 0,
        missed_clock_in: false,
        missed_clock_out: false,
        fingerprint_miss: FingerprintMiss::None,
        fingerprint_deduction: 0.0,
        related_leave_id: None,
    };

    match DayEvidence::from_leave(leave) {
        DayEvidence::Leave(leave) => {
            record.status = DayStatus::OnLeave;
            record.related_leave_id = Some(leave.id);
        }
        DayEvidence::Excuse(leave) => {
            record.status = DayStatus::Excused;
            record.related_leave_id = Some(leave.id);
        }
        DayEvidence::Wfh(leave) => {
            record.status = DayStatus::Wfh;
            record.related_leave_id = Some(leave.id);
        }
        DayEvidence::Punches => classify_punches(employee, policy, &mut record),
    }

    record
}

/// Earliest punch opens the day, latest distinct punch closes it. A single
/// punch is always the clock-in.
fn bracket_punches(punch_times: &[NaiveTime]) -> (Option<NaiveTime>, Option<NaiveTime>) {
    let clock_in = punch_times.iter().min().copied();
    let clock_out = punch_times.iter().max().copied().filter(|t| Some(*t) != clock_in);
    (clock_in, clock_out)
}

fn classify_punches(employee: &Employee, policy: &AttendancePolicy, record: &mut DailyRecord) {
    match (record.clock_in, record.clock_out) {
        (None, None) => {
            record.status = DayStatus::Absent;
            record.missed_clock_in = true;
            record.missed_clock_out = true;
            record.fingerprint_miss = FingerprintMiss::Both;
        }
        (Some(clock_in), clock_out) => {
            if clock_out.is_none() {
                record.missed_clock_out = true;
                record.fingerprint_miss = FingerprintMiss::ClockOut;
                record.fingerprint_deduction = policy.fingerprint_deduction_days;
            }

            record.minutes_late = (clock_in - employee.schedule_start).num_minutes().max(0);
            record.status = if record.minutes_late > policy.late_grace_minutes {
                DayStatus::Late
            } else {
                DayStatus::Present
            };

            // Overtime is only credited against a real clock-out.
            if let Some(clock_out) = clock_out {
                record.minutes_overtime =
                    (clock_out - employee.schedule_end).num_minutes().max(0);
            }
        }
        (None, Some(_)) => {
            // Not derivable from punches alone, but the record shape allows
            // it; mirror the missed clock-out handling.
            record.missed_clock_in = true;
            record.fingerprint_miss = FingerprintMiss::ClockIn;
            record.fingerprint_deduction = policy.fingerprint_deduction_days;
            record.status = DayStatus::Present;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn employee() -> Employee {
        Employee {
            id: 1,
            name: "John Doe".to_string(),
            department: "Engineering".to_string(),
            employee_code: Some("1001".to_string()),
            schedule_start: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            schedule_end: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        }
    }

    fn policy() -> AttendancePolicy {
        AttendancePolicy {
            late_grace_minutes: 10,
            fingerprint_deduction_days: 0.25,
        }
    }

    fn date() -> NaiveDate {
        // A Monday.
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn vacation(id: u64) -> ApprovedLeave {
        ApprovedLeave {
            id,
            employee_id: 1,
            kind: LeaveKind::Vacation,
            start_date: date(),
            end_date: date(),
        }
    }

    #[test]
    fn late_arrival_with_overtime() {
        let record = classify_day(
            &employee(),
            date(),
            &[time(10, 15), time(19, 40)],
            None,
            &policy(),
        );
        assert_eq!(record.status, DayStatus::Late);
        assert_eq!(record.minutes_late, 15);
        assert_eq!(record.minutes_overtime, 40);
        assert!(!record.missed_clock_in);
        assert!(!record.missed_clock_out);
        assert_eq!(record.fingerprint_miss, FingerprintMiss::None);
        assert_eq!(record.fingerprint_deduction, 0.0);
    }

    #[test]
    fn arrival_within_grace_is_never_late() {
        let policy = policy();
        for minute in [0, 5, 10] {
            let record = classify_day(
                &employee(),
                date(),
                &[time(10, minute), time(19, 0)],
                None,
                &policy,
            );
            assert_eq!(record.status, DayStatus::Present, "minute {minute}");
        }
        // One past the grace flips it.
        let record = classify_day(&employee(), date(), &[time(10, 11), time(19, 0)], None, &policy);
        assert_eq!(record.status, DayStatus::Late);
        assert_eq!(record.minutes_late, 11);
    }

    #[test]
    fn early_arrival_is_not_negative_lateness() {
        let record = classify_day(&employee(), date(), &[time(9, 30), time(19, 0)], None, &policy());
        assert_eq!(record.minutes_late, 0);
        assert_eq!(record.status, DayStatus::Present);
    }

    #[test]
    fn no_punches_is_an_absence_without_deduction() {
        let record = classify_day(&employee(), date(), &[], None, &policy());
        assert_eq!(record.status, DayStatus::Absent);
        assert!(record.missed_clock_in);
        assert!(record.missed_clock_out);
        assert_eq!(record.fingerprint_miss, FingerprintMiss::Both);
        assert_eq!(record.fingerprint_deduction, 0.0);
    }

    #[test]
    fn single_punch_is_a_missed_clock_out_with_penalty() {
        let record = classify_day(&employee(), date(), &[time(10, 5)], None, &policy());
        assert_eq!(record.status, DayStatus::Present);
        assert_eq!(record.clock_in, Some(time(10, 5)));
        assert_eq!(record.clock_out, None);
        assert!(record.missed_clock_out);
        assert_eq!(record.fingerprint_miss, FingerprintMiss::ClockOut);
        assert_eq!(record.fingerprint_deduction, 0.25);
        assert_eq!(record.minutes_overtime, 0);
    }

    #[test]
    fn vacation_wins_over_punches() {
        let leave = vacation(42);
        let record = classify_day(
            &employee(),
            date(),
            &[time(10, 45), time(19, 30)],
            Some(&leave),
            &policy(),
        );
        assert_eq!(record.status, DayStatus::OnLeave);
        assert_eq!(record.related_leave_id, Some(42));
        assert_eq!(record.minutes_late, 0);
        assert_eq!(record.minutes_overtime, 0);
        assert_eq!(record.fingerprint_deduction, 0.0);
        // Punches stay on the record for audit.
        assert_eq!(record.clock_in, Some(time(10, 45)));
        assert_eq!(record.clock_out, Some(time(19, 30)));
    }

    #[test]
    fn vacation_day_without_punches_accrues_nothing() {
        let leave = vacation(42);
        let record = classify_day(&employee(), date(), &[], Some(&leave), &policy());
        assert_eq!(record.status, DayStatus::OnLeave);
        assert_eq!(record.related_leave_id, Some(42));
        assert_eq!(record.fingerprint_deduction, 0.0);
        assert!(!record.missed_clock_in);
    }

    #[test]
    fn excuse_and_wfh_map_to_their_statuses() {
        let mut leave = vacation(7);
        leave.kind = LeaveKind::Excuse;
        let record = classify_day(&employee(), date(), &[], Some(&leave), &policy());
        assert_eq!(record.status, DayStatus::Excused);

        leave.kind = LeaveKind::Wfh;
        let record = classify_day(&employee(), date(), &[], Some(&leave), &policy());
        assert_eq!(record.status, DayStatus::Wfh);
        assert_eq!(record.related_leave_id, Some(7));
    }

    #[test]
    fn punch_order_does_not_matter() {
        let forward = classify_day(&employee(), date(), &[time(10, 0), time(19, 5)], None, &policy());
        let reverse = classify_day(&employee(), date(), &[time(19, 5), time(10, 0)], None, &policy());
        assert_eq!(forward, reverse);
        assert_eq!(forward.clock_in, Some(time(10, 0)));
        assert_eq!(forward.clock_out, Some(time(19, 5)));
    }

    #[test]
    fn repeated_punches_collapse_to_one_clock_in() {
        let record = classify_day(
            &employee(),
            date(),
            &[time(10, 0), time(10, 0)],
            None,
            &policy(),
        );
        assert_eq!(record.clock_in, Some(time(10, 0)));
        assert_eq!(record.clock_out, None);
        assert!(record.missed_clock_out);
    }
}
