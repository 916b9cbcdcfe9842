use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use sqlx::MySqlPool;
use tracing::warn;

use crate::model::attendance::DailyRecord;
use crate::model::employee::{Employee, EmployeeRow};
use crate::model::leave::ApprovedLeave;

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// Active employees as the user-management subsystem stores them. Schedule
/// columns may be NULL there; the configured default fills them in.
pub async fn load_active_employees(
    pool: &MySqlPool,
    default_start: NaiveTime,
    default_end: NaiveTime,
) -> Result<Vec<Employee>> {
    let rows = sqlx::query_as::<_, EmployeeRow>(
        r#"
        SELECT id, name, department, employee_code, schedule_start, schedule_end
        FROM employees
        WHERE status = 'active'
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| row.into_employee(default_start, default_end))
        .collect())
}

pub async fn load_employee(
    pool: &MySqlPool,
    employee_id: u64,
    default_start: NaiveTime,
    default_end: NaiveTime,
) -> Result<Option<Employee>> {
    let row = sqlx::query_as::<_, EmployeeRow>(
        r#"
        SELECT id, name, department, employee_code, schedule_start, schedule_end
        FROM employees
        WHERE id = ? AND status = 'active'
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| row.into_employee(default_start, default_end)))
}

/// Approved requests whose range intersects [from, to]. Only terminal
/// approved rows are visible to the engine; pending/rejected never load.
pub async fn load_approved_leaves(
    pool: &MySqlPool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<ApprovedLeave>> {
    let leaves = sqlx::query_as::<_, ApprovedLeave>(
        r#"
        SELECT id, employee_id, leave_type AS kind, start_date, end_date
        FROM leave_requests
        WHERE status = 'approved' AND start_date <= ? AND end_date >= ?
        "#,
    )
    .bind(to)
    .bind(from)
    .fetch_all(pool)
    .await?;

    Ok(leaves)
}

/// Replace day records wholesale: the unique key on (employee_id, date) makes
/// re-ingestion of an overlapping range a last-write-wins overwrite, never a
/// field-by-field merge.
pub async fn upsert_daily_records(pool: &MySqlPool, records: &[DailyRecord]) -> Result<u64> {
    let mut written = 0u64;
    for record in records {
        let result = sqlx::query(
            r#"
            INSERT INTO daily_attendance
                (employee_id, date, clock_in, clock_out, status,
                 minutes_late, minutes_overtime, missed_clock_in, missed_clock_out,
                 fingerprint_miss, fingerprint_deduction, related_leave_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                clock_in = VALUES(clock_in),
                clock_out = VALUES(clock_out),
                status = VALUES(status),
                minutes_late = VALUES(minutes_late),
                minutes_overtime = VALUES(minutes_overtime),
                missed_clock_in = VALUES(missed_clock_in),
                missed_clock_out = VALUES(missed_clock_out),
                fingerprint_miss = VALUES(fingerprint_miss),
                fingerprint_deduction = VALUES(fingerprint_deduction),
                related_leave_id = VALUES(related_leave_id)
            "#,
        )
        .bind(record.employee_id)
        .bind(record.date)
        .bind(record.clock_in)
        .bind(record.clock_out)
        .bind(record.status)
        .bind(record.minutes_late)
        .bind(record.minutes_overtime)
        .bind(record.missed_clock_in)
        .bind(record.missed_clock_out)
        .bind(record.fingerprint_miss)
        .bind(record.fingerprint_deduction)
        .bind(record.related_leave_id)
        .execute(pool)
        .await;

        match result {
            Ok(_) => written += 1,
            Err(e) => {
                warn!(error = %e, employee_id = record.employee_id, date = %record.date,
                    "failed to persist day record");
            }
        }
    }
    Ok(written)
}

/// Day records for one month, optionally narrowed to one employee.
pub async fn load_month_records(
    pool: &MySqlPool,
    from: NaiveDate,
    to: NaiveDate,
    employee_id: Option<u64>,
) -> Result<Vec<DailyRecord>> {
    let mut sql = String::from(
        r#"
        SELECT employee_id, date, clock_in, clock_out, status,
               minutes_late, minutes_overtime, missed_clock_in, missed_clock_out,
               fingerprint_miss, fingerprint_deduction, related_leave_id
        FROM daily_attendance
        WHERE date BETWEEN ? AND ?
        "#,
    );
    if employee_id.is_some() {
        sql.push_str(" AND employee_id = ?");
    }
    sql.push_str(" ORDER BY employee_id, date");

    let mut query = sqlx::query_as::<_, DailyRecord>(&sql).bind(from).bind(to);
    if let Some(id) = employee_id {
        query = query.bind(id);
    }

    Ok(query.fetch_all(pool).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn month_bounds_handles_year_end() {
        assert_eq!(
            month_bounds(2026, 12),
            Some((
                NaiveDate::from_ymd_opt(2026, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()
            ))
        );
        assert_eq!(
            month_bounds(2026, 2),
            Some((
                NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
            ))
        );
        assert_eq!(month_bounds(2026, 13), None);
    }
}
