use crate::api::attendance::{
    AttendanceListResponse, CreateAttendance, UpdateAttendance,
};
use crate::api::regularization::{
    DecideRegularization, RegularizationListResponse, SubmitRegularization,
};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::regularization::{Decision, RegularizationRequest, RequestStatus};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance & Regularization API",
        version = "1.0.0",
        description = r#"
## Attendance & Regularization Module

Attendance tracking and the correction workflow of the HRM suite.

### 🔹 Key Features
- **Attendance Tracking**
  - Daily clock-in and clock-out with late detection
  - Manual record management for admins and managers
- **Regularization Workflow**
  - Employees submit corrections for mis-recorded days
  - Admin/manager approval writes the correction back onto the day
- **Role-scoped Queries**
  - Employees see their own data, admins and managers see everything
  - Filtering by employee, date range and status with pagination

### 🔐 Security
All endpoints are protected using **JWT Bearer authentication** issued by the
identity service. Record management and request decisions require the
**Admin** or **Manager** role.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::create_record,
        crate::api::attendance::get_record,
        crate::api::attendance::update_record,
        crate::api::attendance::delete_record,
        crate::api::attendance::list_attendance,

        crate::api::regularization::submit_request,
        crate::api::regularization::get_request,
        crate::api::regularization::decide_request,
        crate::api::regularization::list_requests,
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceStatus,
            AttendanceListResponse,
            CreateAttendance,
            UpdateAttendance,
            RegularizationRequest,
            RequestStatus,
            Decision,
            SubmitRegularization,
            DecideRegularization,
            RegularizationListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance tracking APIs"),
        (name = "Regularization", description = "Attendance correction workflow APIs"),
    )
)]
pub struct ApiDoc;
