use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum LeaveKind {
    Vacation,
    Excuse,
    SickLeave,
    Wfh,
}

/// One approved request from the forms subsystem. Only rows already in the
/// approved terminal state are ever visible to the engine; pending and
/// rejected requests do not exist from its point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 42,
        "employee_id": 1,
        "kind": "vacation",
        "start_date": "2026-03-02",
        "end_date": "2026-03-05"
    })
)]
pub struct ApprovedLeave {
    #[schema(example = 42)]
    pub id: u64,

    #[schema(example = 1)]
    pub employee_id: u64,

    pub kind: LeaveKind,

    #[schema(example = "2026-03-02", value_type = String, format = "date")]
    pub start_date: NaiveDate,

    #[schema(example = "2026-03-05", value_type = String, format = "date")]
    pub end_date: NaiveDate,
}

impl ApprovedLeave {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
