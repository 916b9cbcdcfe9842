use crate::model::attendance::{DailyRecord, DayStatus, FingerprintMiss};
use crate::model::employee::Employee;
use crate::model::leave::ApprovedLeave;
use crate::model::report::{
    EmployeeMonthly, MonthlyReport, MonthlyStats, OvertimeEntry, OvertimeSummary,
};

/// Minutes to hours, one decimal. The same rule applies to the company total
/// and each per-employee figure so the report is internally consistent.
pub fn overtime_hours(minutes: i64) -> f64 {
    (minutes as f64 / 60.0 * 10.0).round() / 10.0
}

/// Fold one employee-month of day records into the stats object. Pure
/// counting and summation; no cross-day dependencies.
pub fn monthly_stats(records: &[DailyRecord]) -> MonthlyStats {
    let mut stats = MonthlyStats::default();
    for record in records {
        stats.total_days += 1;
        match record.status {
            DayStatus::Present => stats.present += 1,
            DayStatus::Late => stats.late += 1,
            DayStatus::Absent => stats.unexcused_absences += 1,
            DayStatus::Excused => stats.excused += 1,
            DayStatus::OnLeave => stats.on_leave += 1,
            DayStatus::Wfh => stats.wfh += 1,
        }
        // Partial misses only; a fully absent day is already counted above.
        if matches!(
            record.fingerprint_miss,
            FingerprintMiss::ClockIn | FingerprintMiss::ClockOut
        ) {
            stats.fingerprint_misses += 1;
        }
        stats.total_fingerprint_deduction += record.fingerprint_deduction;
        stats.total_minutes_overtime += record.minutes_overtime;
    }
    stats
}

/// Assemble the month view. `per_employee` pairs each employee with their day
/// records for the month; ordering of the input does not affect the output.
pub fn build_monthly_report(
    per_employee: Vec<(Employee, Vec<DailyRecord>)>,
    approved_leaves: Vec<ApprovedLeave>,
) -> MonthlyReport {
    let mut report: Vec<EmployeeMonthly> = per_employee
        .into_iter()
        .map(|(user, mut records)| {
            records.sort_by_key(|r| r.date);
            let stats = monthly_stats(&records);
            EmployeeMonthly {
                user,
                stats,
                records,
            }
        })
        .collect();
    report.sort_by(|a, b| a.user.name.cmp(&b.user.name).then(a.user.id.cmp(&b.user.id)));

    let overtime_summary = overtime_summary(&report);

    MonthlyReport {
        total_employees: report.len(),
        report,
        overtime_summary,
        approved_leaves,
    }
}

fn overtime_summary(report: &[EmployeeMonthly]) -> OvertimeSummary {
    let total_overtime_minutes: i64 = report
        .iter()
        .map(|entry| entry.stats.total_minutes_overtime)
        .sum();

    let mut employees_with_overtime: Vec<(&EmployeeMonthly, i64)> = report
        .iter()
        .filter(|entry| entry.stats.total_minutes_overtime > 0)
        .map(|entry| (entry, entry.stats.total_minutes_overtime))
        .collect();
    // Biggest overtime first; names break ties so the output is stable.
    employees_with_overtime
        .sort_by(|(a, a_min), (b, b_min)| b_min.cmp(a_min).then(a.user.name.cmp(&b.user.name)));

    OvertimeSummary {
        total_overtime_minutes,
        total_overtime_hours: overtime_hours(total_overtime_minutes),
        employees_with_overtime: employees_with_overtime
            .into_iter()
            .map(|(entry, minutes)| OvertimeEntry {
                name: entry.user.name.clone(),
                department: entry.user.department.clone(),
                overtime_hours: overtime_hours(minutes),
            })
            .collect(),
    }
}
