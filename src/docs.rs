use crate::api::attendance::UploadRequest;
use crate::api::report::MonthQuery;
use crate::model::attendance::{DailyRecord, DayStatus, FingerprintMiss};
use crate::model::employee::Employee;
use crate::model::leave::{ApprovedLeave, LeaveKind};
use crate::model::report::{
    EmployeeDetail, EmployeeMonthly, MonthlyReport, MonthlyStats, OvertimeEntry, OvertimeSummary,
    UnmatchedCode, UploadSummary,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Reconciliation API",
        version = "1.0.0",
        description = r#"
## Attendance Reconciliation Engine

Turns raw biometric clock-event exports into authoritative daily attendance
records and monthly statistics.

### 🔹 Key Features
- **Batch Ingestion**
  - Parse vendor-variable spreadsheet exports, tolerant of malformed rows
- **Daily Classification**
  - Lateness, overtime, missed punches, reconciled against approved leave
- **Monthly Reporting**
  - Per-employee statistics and a company-wide overtime summary

### 📦 Response Format
- JSON-based RESTful responses
- Detailed per-batch upload summaries with unmatched-code follow-ups

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::upload_batch,

        crate::api::report::monthly_report,
        crate::api::report::employee_detail,
        crate::api::report::employee_records
    ),
    components(
        schemas(
            UploadRequest,
            UploadSummary,
            UnmatchedCode,
            MonthQuery,
            MonthlyReport,
            EmployeeMonthly,
            MonthlyStats,
            OvertimeSummary,
            OvertimeEntry,
            EmployeeDetail,
            DailyRecord,
            DayStatus,
            FingerprintMiss,
            Employee,
            ApprovedLeave,
            LeaveKind
        )
    ),
    tags(
        (name = "Attendance", description = "Biometric batch ingestion APIs"),
        (name = "Report", description = "Monthly attendance reporting APIs"),
    )
)]
pub struct ApiDoc;
