use crate::auth::auth::AuthUser;
use crate::engine::{
    AttendanceRecord, DeviceRoster, MalformedPunch, PunchEvent, collect_valid, derive_attendance,
    derive_exceptions,
};
use crate::utils::{directory_cache, regularized_filter};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportQuery {
    /// Inclusive start of the reporting period (defaults to today)
    #[schema(example = "2025-02-10", value_type = Option<String>, format = "date")]
    pub from: Option<NaiveDate>,
    /// Inclusive end of the reporting period (defaults to today)
    #[schema(example = "2025-02-14", value_type = Option<String>, format = "date")]
    pub to: Option<NaiveDate>,
    pub employee_id: Option<u64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct ReportRow {
    #[schema(example = 1042)]
    pub employee_id: u64,
    #[schema(example = "Asha Rahman")]
    pub name: String,
    #[schema(example = "Platform")]
    pub department: String,
    #[schema(example = "Engineer")]
    pub job_title: String,
    #[schema(example = "2025-02-10", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "2025-02-10T07:55:00", value_type = Option<String>)]
    pub first_in: Option<NaiveDateTime>,
    #[schema(example = "2025-02-10T16:10:00", value_type = Option<String>)]
    pub last_out: Option<NaiveDateTime>,
    #[schema(example = "08:15:00", value_type = String)]
    pub total_in: crate::engine::WorkedDuration,
    #[schema(example = "00:00:00", value_type = String)]
    pub total_out: crate::engine::WorkedDuration,
    #[schema(example = "08:15:00", value_type = String)]
    pub total_span: crate::engine::WorkedDuration,
    #[schema(example = "PRESENT")]
    pub status: crate::engine::AttendanceStatus,
    /// Whether a manual correction is already saved for this day; the UI
    /// suppresses the edit action when set.
    #[schema(example = false)]
    pub regularized: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ReportResponse {
    pub data: Vec<ReportRow>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 57)]
    pub total: i64,
}

/// Daily attendance report derived from the punch log
#[utoipa::path(
    get,
    path = "/api/v1/attendance/report",
    params(
        ("from", Query, description = "Inclusive start date (defaults to today)"),
        ("to", Query, description = "Inclusive end date (defaults to today)"),
        ("employee_id", Query, description = "Restrict to one employee"),
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Derived attendance rows", body = ReportResponse),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    roster: web::Data<DeviceRoster>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;
    run_report(pool, roster, query.into_inner(), false).await
}

/// Exceptions-only variant of the attendance report
#[utoipa::path(
    get,
    path = "/api/v1/attendance/exceptions",
    params(
        ("from", Query, description = "Inclusive start date (defaults to today)"),
        ("to", Query, description = "Inclusive end date (defaults to today)"),
        ("employee_id", Query, description = "Restrict to one employee"),
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Rows with status outside PRESENT/PRESENT_LATE", body = ReportResponse),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_exceptions(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    roster: web::Data<DeviceRoster>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;
    run_report(pool, roster, query.into_inner(), true).await
}

async fn run_report(
    pool: web::Data<MySqlPool>,
    roster: web::Data<DeviceRoster>,
    query: ReportQuery,
    exceptions_only: bool,
) -> actix_web::Result<HttpResponse> {
    let today = Local::now().date_naive();
    let from = query.from.unwrap_or(today);
    let to = query.to.unwrap_or(today);

    if from > to {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "from must not be after to"
        })));
    }

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let punches = load_punches(pool.get_ref(), roster.get_ref(), from, to, query.employee_id).await?;

    let records = if exceptions_only {
        derive_exceptions(&punches, roster.get_ref())
    } else {
        derive_attendance(&punches, roster.get_ref())
    };

    // Enrich from the directory; ids with no directory entry drop out of the
    // report entirely (their raw punches stay visible in the punch listing).
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let Some(profile) = directory_cache::get_profile(pool.get_ref(), record.employee_id).await
        else {
            debug!(employee_id = record.employee_id, "No directory entry, dropping report row");
            continue;
        };

        let regularized =
            regularized_filter::is_regularized(pool.get_ref(), record.employee_id, record.date)
                .await;

        rows.push(to_row(record, profile, regularized));
    }

    // Derived records are a projection, not a table; paginate in memory.
    let total = rows.len() as i64;
    let start = ((page - 1) * per_page) as usize;
    let data: Vec<ReportRow> = rows
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect();

    Ok(HttpResponse::Ok().json(ReportResponse {
        data,
        page,
        per_page,
        total,
    }))
}

fn to_row(
    record: AttendanceRecord,
    profile: directory_cache::EmployeeProfile,
    regularized: bool,
) -> ReportRow {
    ReportRow {
        employee_id: record.employee_id,
        name: profile.name,
        department: profile.department,
        job_title: profile.job_title,
        date: record.date,
        first_in: record.first_in,
        last_out: record.last_out,
        total_in: record.total_in,
        total_out: record.total_out,
        total_span: record.total_span,
        status: record.status,
        regularized,
    }
}

/// Load the period's punches restricted to the monitored devices. Rows with
/// an empty timestamp are skipped with a warning, never fatal.
async fn load_punches(
    pool: &MySqlPool,
    roster: &DeviceRoster,
    from: NaiveDate,
    to: NaiveDate,
    employee_id: Option<u64>,
) -> actix_web::Result<Vec<PunchEvent>> {
    let devices: Vec<&str> = roster.all_devices().collect();
    let placeholders = vec!["?"; devices.len()].join(", ");

    let mut sql = format!(
        "SELECT employee_id, device_id, punched_at FROM punches \
         WHERE punched_at >= ? AND punched_at < ? AND device_id IN ({})",
        placeholders
    );
    if employee_id.is_some() {
        sql.push_str(" AND employee_id = ?");
    }

    let range_start = from.format("%Y-%m-%d 00:00:00").to_string();
    let range_end = (to + Duration::days(1)).format("%Y-%m-%d 00:00:00").to_string();

    debug!(sql = %sql, %range_start, %range_end, "Loading punches for derivation");

    let mut q = sqlx::query_as::<_, (u64, String, Option<NaiveDateTime>)>(&sql)
        .bind(range_start)
        .bind(range_end);
    for device in &devices {
        q = q.bind(*device);
    }
    if let Some(id) = employee_id {
        q = q.bind(id);
    }

    let raw = q.fetch_all(pool).await.map_err(|e| {
        error!(error = %e, "Failed to load punches");
        ErrorInternalServerError("Database error")
    })?;

    // Rows with an empty timestamp count as malformed and drop out here.
    Ok(collect_valid(raw.into_iter().map(
        |(employee_id, device_id, punched_at)| match punched_at {
            Some(at) => Ok(PunchEvent {
                employee_id,
                device_id,
                at,
            }),
            None => Err(MalformedPunch {
                employee_id,
                raw: String::new(),
            }),
        },
    )))
}
