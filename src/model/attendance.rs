use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use utoipa::ToSchema;

/// One clock event as read from a biometric export row. Direction is not
/// known at this point; earliest/latest per day decide in/out later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPunch {
    pub employee_code: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub source_file: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum DayStatus {
    Present,
    Late,
    Absent,
    Excused,
    OnLeave,
    Wfh,
}

/// Which expected punch was missing on a working day.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, sqlx::Type, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum FingerprintMiss {
    None,
    ClockIn,
    ClockOut,
    Both,
}

/// The persisted per-(employee, date) unit. Recomputed and replaced wholesale
/// whenever its source data changes; the UI never mutates it directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "employee_id": 1,
        "date": "2026-03-02",
        "clock_in": "10:15:00",
        "clock_out": "19:40:00",
        "status": "late",
        "minutes_late": 15,
        "minutes_overtime": 40,
        "missed_clock_in": false,
        "missed_clock_out": false,
        "fingerprint_miss": "none",
        "fingerprint_deduction": 0.0,
        "related_leave_id": null
    })
)]
pub struct DailyRecord {
    #[schema(example = 1)]
    pub employee_id: u64,

    #[schema(example = "2026-03-02", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "10:15:00", value_type = String, format = "time", nullable = true)]
    pub clock_in: Option<NaiveTime>,

    #[schema(example = "19:40:00", value_type = String, format = "time", nullable = true)]
    pub clock_out: Option<NaiveTime>,

    pub status: DayStatus,

    #[schema(example = 15)]
    pub minutes_late: i64,

    #[schema(example = 40)]
    pub minutes_overtime: i64,

    pub missed_clock_in: bool,
    pub missed_clock_out: bool,

    pub fingerprint_miss: FingerprintMiss,

    /// Fractional working days deducted for a forgotten punch.
    #[schema(example = 0.25)]
    pub fingerprint_deduction: f64,

    /// Approved request that decided this day's status, if any.
    #[schema(example = 42, nullable = true)]
    pub related_leave_id: Option<u64>,
}
