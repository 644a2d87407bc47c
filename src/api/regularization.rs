use crate::auth::auth::AuthUser;
use crate::model::regularization::Regularization;
use crate::utils::db_utils::{build_update_sql, execute_update};
use crate::utils::regularized_filter;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

// Columns a manager may touch on a pending correction
const UPDATABLE: &[&str] = &["check_in", "check_out", "reason"];

#[derive(Deserialize, ToSchema)]
pub struct CreateRegularization {
    #[schema(example = 1042)]
    pub employee_id: u64,
    #[schema(example = "2025-02-10", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = Option<String>)]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = Option<String>)]
    pub check_out: Option<NaiveTime>,
    #[schema(example = "Forgot badge, gate opened by security")]
    pub reason: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct RegularizationFilter {
    #[schema(example = 1042)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by workflow status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>, // 1-based
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>, // items per page
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateRegularization {
    #[schema(example = "09:00:00", value_type = Option<String>)]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = Option<String>)]
    pub check_out: Option<NaiveTime>,
    #[schema(example = "Corrected after CCTV review")]
    pub reason: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct RegularizationListResponse {
    pub data: Vec<Regularization>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/* =========================
Create correction (manager)
========================= */
/// Swagger doc for create_regularization endpoint
#[utoipa::path(
    post,
    path = "/api/v1/regularization",
    request_body(
        content = CreateRegularization,
        description = "Manual correction payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Correction saved as pending",
         body = Object,
         example = json!({
            "message": "Regularization submitted",
            "status": "pending"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Day already regularized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Regularization"
)]
pub async fn create_regularization(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateRegularization>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    // 1. a correction must change at least one side of the day
    if payload.check_in.is_none() && payload.check_out.is_none() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "At least one of check_in/check_out is required"
        })));
    }

    if let (Some(check_in), Some(check_out)) = (payload.check_in, payload.check_out) {
        if check_in > check_out {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "check_in cannot be after check_out"
            })));
        }
    }

    if payload.reason.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "A reason is required"
        })));
    }

    // 2. fast duplicate check before touching the table
    if regularized_filter::is_regularized(pool.get_ref(), payload.employee_id, payload.date).await {
        return Ok(HttpResponse::Conflict().json(serde_json::json!({
            "message": "Day already has a saved correction"
        })));
    }

    // 3. insert; the unique (employee_id, date) key backstops the filter
    let result = sqlx::query(
        r#"
        INSERT INTO regularizations
            (employee_id, date, check_in, check_out, reason)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.date)
    .bind(payload.check_in)
    .bind(payload.check_out)
    .bind(payload.reason.trim())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            regularized_filter::insert(payload.employee_id, payload.date);
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "message": "Regularization submitted",
                "status": "pending"
            })))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(serde_json::json!({
                        "message": "Day already has a saved correction"
                    })));
                }
            }

            tracing::error!(error = %e, employee_id = payload.employee_id, "Failed to create regularization");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/* =========================
Approve correction (manager)
========================= */
/// Swagger doc for approve_regularization endpoint
#[utoipa::path(
    put,
    path = "/api/v1/regularization/{regularization_id}/approve",
    params(
        ("regularization_id" = u64, Path, description = "ID of the correction to approve")
    ),
    responses(
        (status = 200, description = "Correction approved", body = Object, example = json!({
            "message": "Regularization approved"
        })),
        (status = 400, description = "Correction not found or already processed", body = Object, example = json!({
            "message": "Regularization not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Regularization"
)]
pub async fn approve_regularization(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    transition(pool.get_ref(), path.into_inner(), "approved").await
}

/* =========================
Reject correction (manager)
========================= */
/// Swagger doc for reject_regularization endpoint
#[utoipa::path(
    put,
    path = "/api/v1/regularization/{regularization_id}/reject",
    params(
        ("regularization_id" = u64, Path, description = "ID of the correction to reject")
    ),
    responses(
        (status = 200, description = "Correction rejected", body = Object, example = json!({
            "message": "Regularization rejected"
        })),
        (status = 400, description = "Correction not found or already processed", body = Object, example = json!({
            "message": "Regularization not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Regularization"
)]
pub async fn reject_regularization(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    transition(pool.get_ref(), path.into_inner(), "rejected").await
}

// pending-only state transition shared by approve/reject
async fn transition(
    pool: &MySqlPool,
    regularization_id: u64,
    to_status: &str,
) -> actix_web::Result<HttpResponse> {
    let result = sqlx::query(
        r#"
        UPDATE regularizations
        SET status = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(to_status)
    .bind(regularization_id)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, regularization_id, to_status, "Regularization transition failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Regularization not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Regularization {}", to_status)
    })))
}

/// Update a pending correction's fields
#[utoipa::path(
    put,
    path = "/api/v1/regularization/{regularization_id}",
    params(
        ("regularization_id" = u64, Path, description = "ID of the correction to update")
    ),
    request_body = UpdateRegularization,
    responses(
        (status = 200, description = "Correction updated", body = Object, example = json!({
            "message": "Regularization updated"
        })),
        (status = 400, description = "Not pending or bad payload"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Correction not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Regularization"
)]
pub async fn update_regularization(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let regularization_id = path.into_inner();

    // Only pending corrections stay editable
    let status = sqlx::query_scalar::<_, String>("SELECT status FROM regularizations WHERE id = ?")
        .bind(regularization_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, regularization_id, "Failed to fetch regularization status");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match status.as_deref() {
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Regularization not found"
            })));
        }
        Some("pending") => {}
        Some(_) => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Only pending regularizations can be edited"
            })));
        }
    }

    let update = build_update_sql(
        "regularizations",
        &body,
        UPDATABLE,
        "id",
        regularization_id as i64,
    )?;

    execute_update(pool.get_ref(), update)
        .await
        .map_err(actix_web::error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Regularization updated"
    })))
}

/// for getting a single correction endpoint
#[utoipa::path(
    get,
    path = "/api/v1/regularization/{regularization_id}",
    params(
        ("regularization_id" = u64, Path, description = "ID of the correction to fetch")
    ),
    responses(
        (status = 200, description = "Correction found", body = Regularization),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Correction not found", body = Object, example = json!({
            "message": "Regularization not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Regularization"
)]
pub async fn get_regularization(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let regularization_id = path.into_inner();

    let record = sqlx::query_as::<_, Regularization>(
        r#"
        SELECT id, employee_id, date, check_in, check_out, reason, status, created_at
        FROM regularizations
        WHERE id = ?
        "#,
    )
    .bind(regularization_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, regularization_id, "Failed to fetch regularization");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match record {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Regularization not found"
        }))),
    }
}

/// for getting corrections list endpoint
#[utoipa::path(
    get,
    path = "/api/v1/regularization",
    params(RegularizationFilter),
    responses(
        (status = 200, description = "Paginated correction list", body = RegularizationListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Regularization"
)]
pub async fn regularization_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RegularizationFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM regularizations{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error=%e, "Failed to count regularizations");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT id, employee_id, date, check_in, check_out, reason, status, created_at
        FROM regularizations
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Regularization>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let records = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error=%e, "Failed to fetch regularization list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    // -------------------------
    // Response
    // -------------------------
    let response = RegularizationListResponse {
        data: records,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
