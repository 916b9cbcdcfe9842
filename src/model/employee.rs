use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employee identity as the user-management subsystem exposes it to the
/// attendance engine. Read-only here; the engine never writes this table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "John Doe",
        "department": "Engineering",
        "employee_code": "3001",
        "schedule_start": "10:00:00",
        "schedule_end": "19:00:00"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "Engineering")]
    pub department: String,

    /// Code programmed into the biometric device. Employees without one
    /// never appear in punch exports.
    #[schema(example = "3001", nullable = true)]
    pub employee_code: Option<String>,

    #[schema(example = "10:00:00", value_type = String, format = "time")]
    pub schedule_start: NaiveTime,

    #[schema(example = "19:00:00", value_type = String, format = "time")]
    pub schedule_end: NaiveTime,
}

/// Row shape of the collaborator-owned `employees` table. Schedule columns
/// are nullable there; missing ones fall back to the configured default.
#[derive(Debug, sqlx::FromRow)]
pub struct EmployeeRow {
    pub id: u64,
    pub name: String,
    pub department: String,
    pub employee_code: Option<String>,
    pub schedule_start: Option<NaiveTime>,
    pub schedule_end: Option<NaiveTime>,
}

impl EmployeeRow {
    pub fn into_employee(self, default_start: NaiveTime, default_end: NaiveTime) -> Employee {
        Employee {
            id: self.id,
            name: self.name,
            department: self.department,
            employee_code: self.employee_code,
            schedule_start: self.schedule_start.unwrap_or(default_start),
            schedule_end: self.schedule_end.unwrap_or(default_end),
        }
    }
}
