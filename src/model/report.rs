use serde::Serialize;
use utoipa::ToSchema;

use crate::model::attendance::DailyRecord;
use crate::model::employee::Employee;
use crate::model::leave::ApprovedLeave;

/// Per-employee counters for one calendar month. Pure fold over the day
/// records; no cross-day state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct MonthlyStats {
    #[schema(example = 22)]
    pub total_days: u32,
    #[schema(example = 17)]
    pub present: u32,
    #[schema(example = 2)]
    pub late: u32,
    #[schema(example = 1)]
    pub unexcused_absences: u32,
    #[schema(example = 2)]
    pub on_leave: u32,
    #[schema(example = 0)]
    pub wfh: u32,
    #[schema(example = 0)]
    pub excused: u32,
    #[schema(example = 1)]
    pub fingerprint_misses: u32,
    #[schema(example = 0.25)]
    pub total_fingerprint_deduction: f64,
    #[schema(example = 120)]
    pub total_minutes_overtime: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeMonthly {
    pub user: Employee,
    pub stats: MonthlyStats,
    pub records: Vec<DailyRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OvertimeEntry {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = 2.5)]
    pub overtime_hours: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct OvertimeSummary {
    #[schema(example = 150)]
    pub total_overtime_minutes: i64,
    #[schema(example = 2.5)]
    pub total_overtime_hours: f64,
    pub employees_with_overtime: Vec<OvertimeEntry>,
}

/// The on-demand month view. Derived from persisted day records on every
/// query, never stored itself.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonthlyReport {
    #[schema(example = 12)]
    pub total_employees: usize,
    pub report: Vec<EmployeeMonthly>,
    pub overtime_summary: OvertimeSummary,
    /// Approved requests intersecting the month, independent of day records.
    pub approved_leaves: Vec<ApprovedLeave>,
}

/// Single-employee drill-down.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeDetail {
    pub user: Employee,
    pub stats: MonthlyStats,
    pub records: Vec<DailyRecord>,
    pub approved_leaves: Vec<ApprovedLeave>,
}

/// Device code that parsed fine but matched no active employee. HR follow-up
/// material, not an error.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, ToSchema)]
pub struct UnmatchedCode {
    #[schema(example = "9044")]
    pub code: String,
    #[schema(example = "J. Smith", nullable = true)]
    pub name: Option<String>,
    #[schema(example = "device-a-march.xlsx")]
    pub file: String,
}

/// What an ingest batch reports back. Counters combine associatively so
/// per-file summaries can be merged in any order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct UploadSummary {
    #[schema(example = 3)]
    pub processed_files: usize,
    #[schema(example = 3)]
    pub total_files: usize,
    #[schema(example = 412)]
    pub total_records: u64,
    #[schema(example = 409)]
    pub successful_records: u64,
    #[schema(example = 3)]
    pub failed_records: u64,
    #[schema(example = 12)]
    pub weekend_skipped: u64,
    pub unmatched_codes: Vec<UnmatchedCode>,
}

impl UploadSummary {
    /// Merge another summary into this one. Sums and set-union only, so the
    /// result does not depend on merge order.
    pub fn absorb(&mut self, other: UploadSummary) {
        self.processed_files += other.processed_files;
        self.total_files += other.total_files;
        self.total_records += other.total_records;
        self.successful_records += other.successful_records;
        self.failed_records += other.failed_records;
        self.weekend_skipped += other.weekend_skipped;
        for unmatched in other.unmatched_codes {
            if !self
                .unmatched_codes
                .iter()
                .any(|u| u.code == unmatched.code && u.file == unmatched.file)
            {
                self.unmatched_codes.push(unmatched);
            }
        }
        self.unmatched_codes.sort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn summary(files: usize, ok: u64, failed: u64, codes: &[(&str, &str)]) -> UploadSummary {
        UploadSummary {
            processed_files: files,
            total_files: files,
            total_records: ok + failed,
            successful_records: ok,
            failed_records: failed,
            weekend_skipped: 0,
            unmatched_codes: codes
                .iter()
                .map(|(code, file)| UnmatchedCode {
                    code: code.to_string(),
                    name: None,
                    file: file.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn absorb_is_order_independent() {
        let a = summary(1, 10, 1, &[("77", "a.xlsx")]);
        let b = summary(1, 5, 0, &[("77", "a.xlsx"), ("88", "b.xlsx")]);
        let c = summary(1, 2, 2, &[("88", "b.xlsx")]);

        let mut left = a.clone();
        left.absorb(b.clone());
        left.absorb(c.clone());

        let mut right = c;
        right.absorb(a);
        right.absorb(b);

        assert_eq!(left, right);
        assert_eq!(left.unmatched_codes.len(), 2);
        assert_eq!(left.total_records, 20);
        assert_eq!(left.failed_records, 3);
    }

    #[test]
    fn absorb_dedups_same_code_in_same_file_only() {
        let mut summary_a = summary(1, 1, 0, &[("77", "a.xlsx")]);
        let summary_b = summary(1, 1, 0, &[("77", "b.xlsx")]);
        summary_a.absorb(summary_b);
        assert_eq!(summary_a.unmatched_codes.len(), 2);
    }
}
