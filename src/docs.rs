use crate::api::attendance::{ReportQuery, ReportResponse, ReportRow};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery, UpdateEmployee};
use crate::api::punch::{IngestPunch, PunchListResponse, PunchQuery};
use crate::api::regularization::{
    CreateRegularization, RegularizationFilter, RegularizationListResponse, UpdateRegularization,
};
use crate::engine::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;
use crate::model::punch::PunchRow;
use crate::model::regularization::Regularization;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Biometric Attendance API",
        version = "1.0.0",
        description = r#"
## Biometric Attendance Service

This API ingests raw door-controller punch logs and derives daily attendance
records on every query, with a manager-facing regularization workflow on top.

### Key Features
- **Punch Feed**
  - Append-only ingestion endpoint for access-control hardware, raw listing for diagnostics
- **Attendance Reports**
  - First-in/last-out, innings-summed worked time, status classification
  - Exceptions-only view for days that need a manager's attention
- **Regularization**
  - Create manual corrections, approve/reject them, edit while pending
- **Employee Directory**
  - Create, update, list, and view the profiles used for report enrichment

### Security
Most endpoints are protected using **JWT Bearer authentication**.
Door controllers authenticate with **api-user** service accounts; reports and
regularization require **Manager** or **Admin**.

### Response Format
- JSON-based RESTful responses
- Durations rendered clock-style as `HH:MM:SS`
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::punch::ingest_punch,
        crate::api::punch::list_punches,

        crate::api::attendance::attendance_report,
        crate::api::attendance::attendance_exceptions,

        crate::api::regularization::regularization_list,
        crate::api::regularization::get_regularization,
        crate::api::regularization::create_regularization,
        crate::api::regularization::update_regularization,
        crate::api::regularization::approve_regularization,
        crate::api::regularization::reject_regularization,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            IngestPunch,
            PunchQuery,
            PunchRow,
            PunchListResponse,
            ReportQuery,
            ReportRow,
            ReportResponse,
            AttendanceRecord,
            AttendanceStatus,
            CreateRegularization,
            UpdateRegularization,
            RegularizationFilter,
            Regularization,
            RegularizationListResponse,
            CreateEmployee,
            UpdateEmployee,
            EmployeeQuery,
            Employee,
            EmployeeListResponse
        )
    ),
    tags(
        (name = "Punch", description = "Door-controller feed APIs"),
        (name = "Attendance", description = "Derived attendance report APIs"),
        (name = "Regularization", description = "Manual correction workflow APIs"),
        (name = "Employee", description = "Employee directory APIs"),
    )
)]
pub struct ApiDoc;
