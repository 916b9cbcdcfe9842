use calamine::{Data, DataType, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::model::attendance::RawPunch;

/// How many leading rows are scanned for a recognizable header before the
/// file is rejected. Device exports put banners and date ranges above the
/// real header, never this many.
const HEADER_SCAN_ROWS: usize = 10;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
];

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("could not open workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("workbook contains no sheets")]
    NoSheet,
    #[error("no recognizable header row in the first {0} rows")]
    HeaderNotFound(usize),
}

/// Candidate header names per logical column, compared after normalization.
/// Every biometric vendor ships its own spelling; this table is what keeps
/// the parser free of fixed column offsets.
#[derive(Debug, Clone)]
pub struct HeaderAliases {
    pub code: Vec<String>,
    pub name: Vec<String>,
    pub date: Vec<String>,
    pub time: Vec<String>,
    pub datetime: Vec<String>,
}

impl Default for HeaderAliases {
    fn default() -> Self {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        Self {
            code: list(&[
                "ac no", "acno", "id", "user id", "userid", "emp no", "emp code",
                "employee code", "employee id", "enroll number", "enrollnumber", "person id",
                "badge number", "staff code", "code",
            ]),
            name: list(&["name", "employee name", "full name", "user name", "first name"]),
            date: list(&["date", "att date", "attdate", "punch date", "work date", "day"]),
            time: list(&["time", "att time", "atttime", "punch time", "clock time"]),
            datetime: list(&[
                "datetime", "date time", "timestamp", "check time", "checktime", "punch",
                "clocking time",
            ]),
        }
    }
}

impl HeaderAliases {
    /// Default table extended with deployment-specific spellings from the
    /// environment (comma-separated, e.g. `EXTRA_CODE_HEADERS=matricule`).
    pub fn from_env() -> Self {
        let mut aliases = Self::default();
        let extend = |target: &mut Vec<String>, var: &str| {
            if let Ok(raw) = env::var(var) {
                target.extend(
                    raw.split(',')
                        .map(|s| normalize_header(s))
                        .filter(|s| !s.is_empty()),
                );
            }
        };
        extend(&mut aliases.code, "EXTRA_CODE_HEADERS");
        extend(&mut aliases.name, "EXTRA_NAME_HEADERS");
        extend(&mut aliases.date, "EXTRA_DATE_HEADERS");
        extend(&mut aliases.time, "EXTRA_TIME_HEADERS");
        extend(&mut aliases.datetime, "EXTRA_DATETIME_HEADERS");
        aliases
    }
}

/// Where date and time live in a detected layout. ZKTeco-style exports carry
/// one combined check-time column; most others split the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WhenColumns {
    Split { date: usize, time: usize },
    Combined(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnMap {
    header_row: usize,
    code: usize,
    name: Option<usize>,
    when: WhenColumns,
}

/// Everything one file contributes to a batch: punches that parsed, row
/// counters, and the name column content keyed by code (used later to label
/// unmatched codes for HR).
#[derive(Debug, Default)]
pub struct FileParse {
    pub file: String,
    pub punches: Vec<RawPunch>,
    pub total_rows: u64,
    pub failed_rows: u64,
    pub names: HashMap<String, String>,
}

/// Parse the first sheet of one `.xls`/`.xlsx` export. Fails per row, not per
/// file: malformed rows are counted and skipped.
pub fn parse_workbook(path: &Path, aliases: &HeaderAliases) -> Result<FileParse, ParseError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ParseError::NoSheet)?;
    let range = workbook.worksheet_range(&sheet)?;

    parse_rows(range.rows(), &file_name, aliases)
}

/// Core of the parser, separated from workbook IO so layouts can be exercised
/// directly in tests.
pub(crate) fn parse_rows<'a, I>(
    rows: I,
    file_name: &str,
    aliases: &HeaderAliases,
) -> Result<FileParse, ParseError>
where
    I: Iterator<Item = &'a [Data]>,
{
    let rows: Vec<&[Data]> = rows.collect();
    let columns =
        detect_header(&rows, aliases).ok_or(ParseError::HeaderNotFound(HEADER_SCAN_ROWS))?;

    let mut parse = FileParse {
        file: file_name.to_string(),
        ..FileParse::default()
    };

    for row in rows.iter().skip(columns.header_row + 1) {
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        parse.total_rows += 1;

        match parse_row(row, &columns, file_name) {
            Some((punch, name)) => {
                if let Some(name) = name {
                    parse
                        .names
                        .entry(punch.employee_code.clone())
                        .or_insert(name);
                }
                parse.punches.push(punch);
            }
            None => {
                parse.failed_rows += 1;
                debug!(file = %file_name, row = ?row, "skipping malformed punch row");
            }
        }
    }

    Ok(parse)
}

fn detect_header(rows: &[&[Data]], aliases: &HeaderAliases) -> Option<ColumnMap> {
    for (row_idx, row) in rows.iter().take(HEADER_SCAN_ROWS).enumerate() {
        let headers: Vec<String> = row
            .iter()
            .map(|cell| cell.get_string().map(normalize_header).unwrap_or_default())
            .collect();

        let find = |candidates: &[String]| {
            headers
                .iter()
                .position(|h| !h.is_empty() && candidates.iter().any(|c| c == h))
        };

        let Some(code) = find(&aliases.code) else {
            continue;
        };
        let date = find(&aliases.date);
        let time = find(&aliases.time);
        let datetime = find(&aliases.datetime);

        let when = match (date, time, datetime) {
            (Some(date), Some(time), _) => WhenColumns::Split { date, time },
            (_, _, Some(combined)) => WhenColumns::Combined(combined),
            // A lone "Time" column in ZKTeco exports carries full timestamps.
            (None, Some(combined), None) => WhenColumns::Combined(combined),
            _ => continue,
        };

        return Some(ColumnMap {
            header_row: row_idx,
            code,
            name: find(&aliases.name),
            when,
        });
    }
    None
}

fn parse_row(
    row: &[Data],
    columns: &ColumnMap,
    file_name: &str,
) -> Option<(RawPunch, Option<String>)> {
    let code = cell_code(row.get(columns.code)?)?;

    let (date, time) = match columns.when {
        WhenColumns::Split { date, time } => (
            cell_date(row.get(date)?)?,
            cell_time(row.get(time)?)?,
        ),
        WhenColumns::Combined(idx) => {
            let stamp = cell_datetime(row.get(idx)?)?;
            (stamp.date(), stamp.time())
        }
    };

    let name = columns
        .name
        .and_then(|idx| row.get(idx))
        .and_then(|cell| cell.get_string())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Some((
        RawPunch {
            employee_code: code,
            date,
            time,
            source_file: file_name.to_string(),
        },
        name,
    ))
}

/// Lowercase, trim, and collapse separators so "AC-No." and "ac no" compare
/// equal.
fn normalize_header(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
        } else if !out.ends_with(' ') {
            out.push(' ');
        }
    }
    out.trim().to_string()
}

/// Employee codes arrive as text in some exports and as numeric cells in
/// others; "1001.0" and "1001" must resolve identically.
fn cell_code(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.fract() == 0.0 => Some(format!("{}", *f as i64)),
        Data::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

fn cell_date(cell: &Data) -> Option<NaiveDate> {
    if let Some(date) = cell.as_date() {
        return Some(date);
    }
    let s = cell.get_string()?.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| cell_datetime(cell).map(|dt| dt.date()))
}

fn cell_time(cell: &Data) -> Option<NaiveTime> {
    if let Some(time) = cell.as_time() {
        return Some(time);
    }
    let s = cell.get_string()?.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .or_else(|| cell_datetime(cell).map(|dt| dt.time()))
}

fn cell_datetime(cell: &Data) -> Option<NaiveDateTime> {
    if let Some(stamp) = cell.as_datetime() {
        return Some(stamp);
    }
    let s = cell.get_string()?.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}
