use actix_web::{HttpResponse, Responder, web};
use futures::future::join_all;
use serde::Deserialize;
use sqlx::MySqlPool;
use std::path::PathBuf;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::config::Config;
use crate::engine::calendar::WorkCalendar;
use crate::engine::ingest::{punch_span, reconcile_batch};
use crate::engine::leave::LeaveIndex;
use crate::engine::parser::{HeaderAliases, parse_workbook};
use crate::engine::resolver::EmployeeDirectory;
use crate::model::report::UploadSummary;
use crate::utils::db_utils;

#[derive(Deserialize, ToSchema)]
pub struct UploadRequest {
    /// Server-local paths of biometric export files already on disk.
    #[schema(example = json!(["/var/hr/exports/device-a-march.xlsx"]))]
    pub files: Vec<String>,
}

/// Ingest a batch of biometric export files
#[utoipa::path(
    post,
    path = "/api/v1/attendance/upload",
    request_body(
        content = UploadRequest,
        description = "Batch of export files to ingest",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Batch processed, summary returned", body = UploadSummary),
        (status = 400, description = "Empty batch or batch over the file cap", body = Object, example = json!({
            "message": "Batch exceeds the configured file limit"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn upload_batch(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    payload: web::Json<UploadRequest>,
) -> actix_web::Result<impl Responder> {
    let files = payload.into_inner().files;

    if files.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No files in batch"
        })));
    }
    if files.len() > config.max_batch_files {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Batch exceeds the configured file limit"
        })));
    }

    let total_files = files.len();
    let aliases = HeaderAliases::from_env();

    // Files are independent; parse them on the blocking pool and join. The
    // per-file summaries merge associatively afterwards.
    let tasks: Vec<_> = files
        .iter()
        .map(|file| {
            let path = PathBuf::from(file);
            let aliases = aliases.clone();
            web::block(move || parse_workbook(&path, &aliases))
        })
        .collect();
    let results = join_all(tasks).await;

    let mut parses = Vec::new();
    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(Ok(parse)) => {
                info!(file = %file, punches = parse.punches.len(), failed = parse.failed_rows,
                    "parsed export file");
                parses.push(parse);
            }
            Ok(Err(e)) => {
                // File-level failure: skip this file, keep the batch going.
                error!(file = %file, error = %e, "skipping unreadable export file");
            }
            Err(e) => {
                error!(file = %file, error = %e, "parse task failed");
            }
        }
    }

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
    let directory = EmployeeDirectory::new(employees);
    let calendar = WorkCalendar::new(config.weekend_days.clone(), config.holidays.clone());

    let leave_index = match punch_span(&parses) {
        Some((from, to)) => {
            let leaves = db_utils::load_approved_leaves(pool.get_ref(), from, to)
                .await
                .map_err(|e| {
                    error!(error = %e, "failed to load approved leave");
                    actix_web::error::ErrorInternalServerError("Internal Server Error")
                })?;
            LeaveIndex::build(leaves, from, to)
        }
        None => LeaveIndex::default(),
    };

    let mut outcome = reconcile_batch(parses, &directory, &calendar, &leave_index, &config.policy);
    // Files that never opened count against the batch, not the parse stage.
    outcome.summary.total_files = total_files;

    db_utils::upsert_daily_records(pool.get_ref(), &outcome.records)
        .await
        .map_err(|e| {
            error!(error = %e, "failed to persist day records");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(outcome.summary))
}
