use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use std::collections::HashMap;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::config::Config;
use crate::engine::aggregate::{build_monthly_report, monthly_stats};
use crate::model::attendance::DailyRecord;
use crate::model::report::{EmployeeDetail, MonthlyReport};
use crate::utils::db_utils;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct MonthQuery {
    /// Calendar month, `YYYY-MM`.
    #[schema(example = "2026-03")]
    pub month: String,
}

fn month_range(query: &MonthQuery) -> Result<(NaiveDate, NaiveDate), actix_web::Error> {
    let parsed = query
        .month
        .split_once('-')
        .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
        .and_then(|(year, month)| db_utils::month_bounds(year, month));
    parsed.ok_or_else(|| actix_web::error::ErrorBadRequest("month must be YYYY-MM"))
}

/// Company-wide monthly attendance report
#[utoipa::path(
    get,
    path = "/api/v1/attendance/report",
    params(MonthQuery),
    responses(
        (status = 200, description = "Monthly report", body = MonthlyReport),
        (status = 400, description = "Malformed month"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Report"
)]
pub async fn monthly_report(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let (from, to) = month_range(&query)?;

    let records = db_utils::load_month_records(pool.get_ref(), from, to, None)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to load day records");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let employees = db_utils::load_active_employees(
        pool.get_ref(),
        config.default_schedule_start,
        config.default_schedule_end,
    )
    .await
    .map_err(|e| {
        error!(error = %e, "failed to load employees");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let leaves = db_utils::load_approved_leaves(pool.get_ref(), from, to)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to load approved leave");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let mut by_employee: HashMap<u64, Vec<DailyRecord>> = HashMap::new();
    for record in records {
        by_employee.entry(record.employee_id).or_default().push(record);
    }

    let per_employee = employees
        .into_iter()
        .filter_map(|employee| {
            by_employee
                .remove(&employee.id)
                .map(|records| (employee, records))
        })
        .collect();

    Ok(HttpResponse::Ok().json(build_monthly_report(per_employee, leaves)))
}

/// Single-employee monthly drill-down
#[utoipa::path(
    get,
    path = "/api/v1/attendance/report/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        MonthQuery
    ),
    responses(
        (status = 200, description = "Employee detail", body = EmployeeDetail),
        (status = 400, description = "Malformed month"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Report"
)]
pub async fn employee_detail(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let (from, to) = month_range(&query)?;

    let employee = db_utils::load_employee(
        pool.get_ref(),
        employee_id,
        config.default_schedule_start,
        config.default_schedule_end,
    )
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "failed to load employee");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(user) = employee else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Employee not found"
        })));
    };

    let records = db_utils::load_month_records(pool.get_ref(), from, to, Some(employee_id))
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "failed to load day records");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let approved_leaves = db_utils::load_approved_leaves(pool.get_ref(), from, to)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "failed to load approved leave");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .into_iter()
        .filter(|leave| leave.employee_id == employee_id)
        .collect();

    let stats = monthly_stats(&records);

    Ok(HttpResponse::Ok().json(EmployeeDetail {
        user,
        stats,
        records,
        approved_leaves,
    }))
}

/// Raw day rows for one employee, for the drill-down table
#[utoipa::path(
    get,
    path = "/api/v1/attendance/records/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        MonthQuery
    ),
    responses(
        (status = 200, description = "Day records", body = [DailyRecord]),
        (status = 400, description = "Malformed month"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Report"
)]
pub async fn employee_records(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let (from, to) = month_range(&query)?;

    let records = db_utils::load_month_records(pool.get_ref(), from, to, Some(employee_id))
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "failed to load day records");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(records))
}
