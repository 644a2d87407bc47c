use crate::auth::auth::AuthUser;
use crate::engine::PunchEvent;
use crate::model::punch::PunchRow;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct IngestPunch {
    #[schema(example = 1042)]
    pub employee_id: u64,
    #[schema(example = "GATE-IN-1")]
    pub device_id: String,
    /// Local wall-clock timestamp as the controller reports it.
    #[schema(example = "2025-02-10 07:55:00")]
    pub punched_at: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PunchQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub employee_id: Option<u64>,
    pub device_id: Option<String>,
    /// Inclusive lower date bound (YYYY-MM-DD)
    #[schema(value_type = Option<String>, format = "date")]
    pub from: Option<chrono::NaiveDate>,
    /// Inclusive upper date bound (YYYY-MM-DD)
    #[schema(value_type = Option<String>, format = "date")]
    pub to: Option<chrono::NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct PunchListResponse {
    pub data: Vec<PunchRow>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 50)]
    pub per_page: u32,
    #[schema(example = 1234)]
    pub total: i64,
}

/// Punch feed endpoint for door controllers
#[utoipa::path(
    post,
    path = "/api/v1/punch",
    request_body = IngestPunch,
    responses(
        (status = 201, description = "Punch stored", body = Object, example = json!({
            "message": "Punch stored"
        })),
        (status = 400, description = "Malformed punch timestamp"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Punch"
)]
pub async fn ingest_punch(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<IngestPunch>,
) -> actix_web::Result<impl Responder> {
    auth.require_feed()?;

    // Validate through the engine's parser so the log only ever holds
    // timestamps the derivation can read. Unmonitored devices are stored
    // anyway; the derivation filters by roster at query time.
    let punch = match PunchEvent::parse(payload.employee_id, &payload.device_id, &payload.punched_at)
    {
        Ok(p) => p,
        Err(bad) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": bad.to_string()
            })));
        }
    };

    sqlx::query(
        r#"
        INSERT INTO punches (employee_id, device_id, punched_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(punch.employee_id)
    .bind(&punch.device_id)
    .bind(punch.at)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = punch.employee_id, "Failed to store punch");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Punch stored"
    })))
}

/// Raw punch listing for diagnostics
#[utoipa::path(
    get,
    path = "/api/v1/punch",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page"),
        ("employee_id", Query, description = "Filter by employee"),
        ("device_id", Query, description = "Filter by device"),
        ("from", Query, description = "Inclusive lower date bound"),
        ("to", Query, description = "Inclusive upper date bound")
    ),
    responses(
        (status = 200, description = "Paginated raw punch list", body = PunchListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Punch"
)]
pub async fn list_punches(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PunchQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 500);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<sqlx::types::JsonValue> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        conditions.push("employee_id = ?");
        bindings.push(employee_id.into());
    }

    if let Some(device_id) = &query.device_id {
        conditions.push("device_id = ?");
        bindings.push(device_id.clone().into());
    }

    if let Some(from) = query.from {
        conditions.push("punched_at >= ?");
        bindings.push(from.format("%Y-%m-%d 00:00:00").to_string().into());
    }

    if let Some(to) = query.to {
        conditions.push("punched_at < ?");
        bindings.push(
            (to + chrono::Duration::days(1))
                .format("%Y-%m-%d 00:00:00")
                .to_string()
                .into(),
        );
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) as total FROM punches {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting punches");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count punches");
        ErrorInternalServerError("Database error")
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        "SELECT * FROM punches {} ORDER BY punched_at DESC, id DESC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, bindings = ?bindings, page, per_page, offset, "Fetching punches");

    let mut data_query = sqlx::query_as::<_, PunchRow>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let punches = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %data_sql, "Failed to fetch punches");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(PunchListResponse {
        data: punches,
        page,
        per_page,
        total,
    }))
}
