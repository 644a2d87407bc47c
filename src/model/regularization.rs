use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A manager's manual correction of a derived attendance day. One per
/// (employee, date); derived records themselves are never stored, so this
/// table is the only mutable attendance state in the system.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Regularization {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1042)]
    pub employee_id: u64,

    #[schema(example = "2025-02-10", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "09:00:00", value_type = Option<String>)]
    pub check_in: Option<NaiveTime>,

    #[schema(example = "18:00:00", value_type = Option<String>)]
    pub check_out: Option<NaiveTime>,

    #[schema(example = "Forgot badge, gate opened by security")]
    pub reason: String,

    #[schema(example = "pending")]
    pub status: Option<String>,

    #[schema(example = "2025-02-11T09:12:00Z", value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}
