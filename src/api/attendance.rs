use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::role::Action;
use crate::pagination::{PageParams, Paginated};
use crate::service::attendance::{self, AttendanceChanges, ClockPolicy, NewAttendance};
use crate::service::query::{self, AttendanceFilter};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "data": [
        {
            "id": 1,
            "employee_id": 1000,
            "date": "2024-01-10",
            "clock_in": "09:00:00",
            "clock_out": "18:00:00",
            "work_hours": 8.0,
            "status": "present",
            "notes": null
        }
    ],
    "page": 1,
    "per_page": 10,
    "total": 1,
    "total_pages": 1
}))]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
    #[schema(example = 1)]
    pub total_pages: u64,
}

impl From<Paginated<AttendanceRecord>> for AttendanceListResponse {
    fn from(page: Paginated<AttendanceRecord>) -> Self {
        Self {
            data: page.data,
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateAttendance {
    #[schema(example = 1000)]
    pub employee_id: i64,
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = String, nullable = true)]
    pub clock_in: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = String, nullable = true)]
    pub clock_out: Option<NaiveTime>,
    pub status: Option<AttendanceStatus>,
    #[schema(example = "worked from office", nullable = true)]
    pub notes: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAttendance {
    #[schema(example = "09:00:00", value_type = String, nullable = true)]
    pub clock_in: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = String, nullable = true)]
    pub clock_out: Option<NaiveTime>,
    pub status: Option<AttendanceStatus>,
    #[schema(example = "corrected by hr", nullable = true)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttendanceListQuery {
    /// Filter by employee ID (ignored for employee-role callers)
    #[param(example = 1000)]
    pub employee_id: Option<i64>,
    /// Inclusive range start
    #[param(example = "2024-01-01", value_type = String)]
    pub start_date: Option<NaiveDate>,
    /// Inclusive range end
    #[param(example = "2024-01-31", value_type = String)]
    pub end_date: Option<NaiveDate>,
    /// Filter by day status
    pub status: Option<AttendanceStatus>,
    /// Pagination page number (start with 1)
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[param(example = 10)]
    pub per_page: Option<u64>,
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-in",
    responses(
        (status = 200, description = "Clocked in successfully", body = AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 409, description = "Already clocked in today", body = Object, example = json!({
            "error": "AlreadyClockedIn",
            "message": "Already clocked in today"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    policy: web::Data<ClockPolicy>,
) -> Result<impl Responder, ApiError> {
    auth.require(Action::ClockSelf)?;
    let employee_id = auth.employee_profile()?;

    let now = Local::now();
    let record = attendance::clock_in(
        pool.get_ref(),
        &policy,
        employee_id,
        now.date_naive(),
        now.time(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Clock-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/clock-out",
    responses(
        (status = 200, description = "Clocked out successfully", body = AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 409, description = "No open session found for today", body = Object, example = json!({
            "error": "NoOpenSession",
            "message": "No open session found for today"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    policy: web::Data<ClockPolicy>,
) -> Result<impl Responder, ApiError> {
    auth.require(Action::ClockSelf)?;
    let employee_id = auth.employee_profile()?;

    let now = Local::now();
    let record = attendance::clock_out(
        pool.get_ref(),
        &policy,
        employee_id,
        now.date_naive(),
        now.time(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Manual record creation (admin/manager)
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = CreateAttendance,
    responses(
        (status = 200, description = "Attendance record created", body = AttendanceRecord),
        (status = 400, description = "Invalid clock pair"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Record already exists for this employee and date")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn create_record(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    policy: web::Data<ClockPolicy>,
    payload: web::Json<CreateAttendance>,
) -> Result<impl Responder, ApiError> {
    auth.require(Action::ManageRecords)?;

    let payload = payload.into_inner();
    let record = attendance::create_record(
        pool.get_ref(),
        &policy,
        NewAttendance {
            employee_id: payload.employee_id,
            date: payload.date,
            clock_in: payload.clock_in,
            clock_out: payload.clock_out,
            status: payload.status,
            notes: payload.notes,
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Fetch one attendance record
#[utoipa::path(
    get,
    path = "/api/v1/attendance/{id}",
    params(
        ("id" = i64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Attendance record found", body = AttendanceRecord),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn get_record(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    let record = attendance::get_record(pool.get_ref(), path.into_inner()).await?;

    // employees may only look at their own days
    if !auth.role.allows(Action::ViewAllRecords) && Some(record.employee_id) != auth.employee_id {
        return Err(ApiError::NotFound("Attendance record"));
    }

    Ok(HttpResponse::Ok().json(record))
}

/// Partial update of a record (admin/manager)
#[utoipa::path(
    put,
    path = "/api/v1/attendance/{id}",
    params(
        ("id" = i64, Path, description = "Attendance record ID")
    ),
    request_body = UpdateAttendance,
    responses(
        (status = 200, description = "Attendance record updated", body = AttendanceRecord),
        (status = 400, description = "Invalid clock pair after merge"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn update_record(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    policy: web::Data<ClockPolicy>,
    path: web::Path<i64>,
    payload: web::Json<UpdateAttendance>,
) -> Result<impl Responder, ApiError> {
    auth.require(Action::ManageRecords)?;

    let payload = payload.into_inner();
    let record = attendance::update_record(
        pool.get_ref(),
        &policy,
        path.into_inner(),
        AttendanceChanges {
            clock_in: payload.clock_in,
            clock_out: payload.clock_out,
            status: payload.status,
            notes: payload.notes,
        },
    )
    .await?;

    Ok(HttpResponse::Ok().json(record))
}

/// Delete a record (admin/manager), irreversible
#[utoipa::path(
    delete,
    path = "/api/v1/attendance/{id}",
    params(
        ("id" = i64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Attendance record deleted"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn delete_record(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    auth.require(Action::ManageRecords)?;

    attendance::delete_record(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Attendance record deleted"
    })))
}

/// Paginated attendance list, role-scoped
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceListQuery),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    q: web::Query<AttendanceListQuery>,
) -> Result<impl Responder, ApiError> {
    let filter = AttendanceFilter {
        employee_id: q.employee_id,
        start_date: q.start_date,
        end_date: q.end_date,
        status: q.status,
    };
    let params = PageParams::new(q.page, q.per_page);

    let page = query::list_attendance(pool.get_ref(), &filter, params, auth.role, auth.employee_id)
        .await?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse::from(page)))
}
