use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::regularization::{Decision, RegularizationRequest, RequestStatus};
use crate::model::role::Action;
use crate::pagination::{PageParams, Paginated};
use crate::service::attendance::ClockPolicy;
use crate::service::query::{self, RequestFilter};
use crate::service::regularization;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct SubmitRegularization {
    #[schema(example = "2024-01-10", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = String)]
    pub requested_clock_in: NaiveTime,
    #[schema(example = "18:00:00", value_type = String)]
    pub requested_clock_out: NaiveTime,
    #[schema(example = "forgot badge")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct DecideRegularization {
    #[schema(example = "approved")]
    pub status: Decision,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RegularizationListQuery {
    /// Filter by submitting employee ID (ignored for employee-role callers)
    #[param(example = 1000)]
    pub employee_id: Option<i64>,
    /// Inclusive range start for the corrected day
    #[param(example = "2024-01-01", value_type = String)]
    pub start_date: Option<NaiveDate>,
    /// Inclusive range end for the corrected day
    #[param(example = "2024-01-31", value_type = String)]
    pub end_date: Option<NaiveDate>,
    /// Filter by request status
    pub status: Option<RequestStatus>,
    /// Pagination page number (start with 1)
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[param(example = 10)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct RegularizationListResponse {
    pub data: Vec<RegularizationRequest>,
    #[schema(example = 1)]
    pub page: u64,
    #[schema(example = 10)]
    pub per_page: u64,
    #[schema(example = 1)]
    pub total: i64,
    #[schema(example = 1)]
    pub total_pages: u64,
}

impl From<Paginated<RegularizationRequest>> for RegularizationListResponse {
    fn from(page: Paginated<RegularizationRequest>) -> Self {
        Self {
            data: page.data,
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            total_pages: page.total_pages,
        }
    }
}

/// Submit a correction request for one day
#[utoipa::path(
    post,
    path = "/api/v1/attendance/regularize",
    request_body = SubmitRegularization,
    responses(
        (status = 200, description = "Regularization request submitted", body = RegularizationRequest),
        (status = 400, description = "Missing reason or inverted clock pair"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Regularization"
)]
pub async fn submit_request(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<SubmitRegularization>,
) -> Result<impl Responder, ApiError> {
    auth.require(Action::SubmitRegularization)?;
    let employee_id = auth.employee_profile()?;

    let request = regularization::submit(
        pool.get_ref(),
        employee_id,
        payload.date,
        payload.requested_clock_in,
        payload.requested_clock_out,
        &payload.reason,
    )
    .await?;

    Ok(HttpResponse::Ok().json(request))
}

/// Fetch one regularization request
#[utoipa::path(
    get,
    path = "/api/v1/attendance/regularize/{id}",
    params(
        ("id" = i64, Path, description = "Regularization request ID")
    ),
    responses(
        (status = 200, description = "Regularization request found", body = RegularizationRequest),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Regularization request not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Regularization"
)]
pub async fn get_request(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<impl Responder, ApiError> {
    let request = regularization::get_request(pool.get_ref(), path.into_inner()).await?;

    // employees may only look at their own requests
    if !auth.role.allows(Action::ViewAllRecords) && Some(request.submitted_by) != auth.employee_id {
        return Err(ApiError::NotFound("Regularization request"));
    }

    Ok(HttpResponse::Ok().json(request))
}

/// Decide a pending request (admin/manager)
#[utoipa::path(
    put,
    path = "/api/v1/attendance/regularize/{id}",
    params(
        ("id" = i64, Path, description = "Regularization request ID")
    ),
    request_body = DecideRegularization,
    responses(
        (status = 200, description = "Decision applied", body = RegularizationRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Regularization request not found"),
        (status = 409, description = "Request already decided", body = Object, example = json!({
            "error": "InvalidTransition",
            "message": "Request is not pending and cannot be decided"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Regularization"
)]
pub async fn decide_request(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    policy: web::Data<ClockPolicy>,
    path: web::Path<i64>,
    payload: web::Json<DecideRegularization>,
) -> Result<impl Responder, ApiError> {
    auth.require(Action::DecideRegularization)?;

    let request = regularization::decide(
        pool.get_ref(),
        &policy,
        path.into_inner(),
        payload.status,
        auth.user_id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(request))
}

/// Paginated regularization list, role-scoped
#[utoipa::path(
    get,
    path = "/api/v1/attendance/regularize",
    params(RegularizationListQuery),
    responses(
        (status = 200, description = "Paginated regularization list", body = RegularizationListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Regularization"
)]
pub async fn list_requests(
    auth: AuthUser,
    pool: web::Data<SqlitePool>,
    q: web::Query<RegularizationListQuery>,
) -> Result<impl Responder, ApiError> {
    let filter = RequestFilter {
        employee_id: q.employee_id,
        start_date: q.start_date,
        end_date: q.end_date,
        status: q.status,
    };
    let params = PageParams::new(q.page, q.per_page);

    let page =
        query::list_requests(pool.get_ref(), &filter, params, auth.role, auth.employee_id).await?;

    Ok(HttpResponse::Ok().json(RegularizationListResponse::from(page)))
}
