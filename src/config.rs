use chrono::{NaiveDate, NaiveTime, Weekday};
use dotenvy::dotenv;
use std::env;

/// Policy constants the classifier applies. HR policy, so these are
/// configuration, never hardcoded at the use sites.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttendancePolicy {
    /// Minutes of tolerance after schedule start before a day counts as late.
    pub late_grace_minutes: i64,
    /// Fractional working days deducted per forgotten punch.
    pub fingerprint_deduction_days: f64,
}

impl Default for AttendancePolicy {
    fn default() -> Self {
        Self {
            late_grace_minutes: 15,
            fingerprint_deduction_days: 0.25,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_upload_per_min: u32,
    pub rate_report_per_min: u32,

    // Ingestion
    pub max_batch_files: usize,
    pub weekend_days: Vec<Weekday>,
    pub holidays: Vec<NaiveDate>,
    pub default_schedule_start: NaiveTime,
    pub default_schedule_end: NaiveTime,

    pub policy: AttendancePolicy,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api/v1".to_string()),

            rate_upload_per_min: env::var("RATE_UPLOAD_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_report_per_min: env::var("RATE_REPORT_PER_MIN")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .unwrap(),

            max_batch_files: env::var("MAX_BATCH_FILES")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap(),

            // The source business closes Friday and Saturday.
            weekend_days: parse_weekdays(
                &env::var("WEEKEND_DAYS").unwrap_or_else(|_| "fri,sat".to_string()),
            ),
            holidays: parse_dates(&env::var("HOLIDAYS").unwrap_or_default()),

            default_schedule_start: parse_time(
                &env::var("DEFAULT_SCHEDULE_START").unwrap_or_else(|_| "10:00".to_string()),
            ),
            default_schedule_end: parse_time(
                &env::var("DEFAULT_SCHEDULE_END").unwrap_or_else(|_| "19:00".to_string()),
            ),

            policy: AttendancePolicy {
                late_grace_minutes: env::var("LATE_GRACE_MINUTES")
                    .unwrap_or_else(|_| "15".to_string())
                    .parse()
                    .unwrap(),
                fingerprint_deduction_days: env::var("FINGERPRINT_DEDUCTION_DAYS")
                    .unwrap_or_else(|_| "0.25".to_string())
                    .parse()
                    .unwrap(),
            },
        }
    }
}

fn parse_weekdays(raw: &str) -> Vec<Weekday> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            part.trim()
                .parse::<Weekday>()
                .unwrap_or_else(|_| panic!("invalid weekday in WEEKEND_DAYS: {part}"))
        })
        .collect()
}

fn parse_dates(raw: &str) -> Vec<NaiveDate> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            NaiveDate::parse_from_str(part.trim(), "%Y-%m-%d")
                .unwrap_or_else(|_| panic!("invalid date in HOLIDAYS: {part}"))
        })
        .collect()
}

fn parse_time(raw: &str) -> NaiveTime {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .unwrap_or_else(|_| panic!("invalid time of day: {raw}"))
}
