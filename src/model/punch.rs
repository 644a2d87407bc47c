use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Raw punch row as stored by the feed. `punched_at` is nullable because
/// early controller firmware occasionally uploaded empty timestamps; such
/// rows are skipped during derivation instead of failing the report.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PunchRow {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1042)]
    pub employee_id: u64,

    #[schema(example = "GATE-IN-1")]
    pub device_id: String,

    #[schema(example = "2025-02-10T07:55:00", value_type = Option<String>)]
    pub punched_at: Option<NaiveDateTime>,
}
