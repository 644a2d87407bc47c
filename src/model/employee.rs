use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1042,
        "badge_code": "BDG-1042",
        "first_name": "Asha",
        "last_name": "Rahman",
        "email": "asha.rahman@company.com",
        "department": "Platform",
        "job_title": "Engineer",
        "joined_on": "2024-01-01",
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1042)]
    pub id: u64,

    /// Badge code enrolled on the door controllers.
    #[schema(example = "BDG-1042")]
    pub badge_code: String,

    #[schema(example = "Asha")]
    pub first_name: String,

    #[schema(example = "Rahman")]
    pub last_name: String,

    #[schema(example = "asha.rahman@company.com")]
    pub email: String,

    #[schema(example = "Platform")]
    pub department: String,

    #[schema(example = "Engineer")]
    pub job_title: String,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub joined_on: NaiveDate,

    #[schema(example = "active")]
    pub status: String,
}
