use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::error::ApiError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::regularization::{RegularizationRequest, RequestStatus};
use crate::model::role::{Action, Role};
use crate::pagination::{PageParams, Paginated};

/// Typed bind values for dynamically assembled WHERE clauses.
enum FilterValue {
    Int(i64),
    Text(String),
    Day(NaiveDate),
}

/// Role scoping happens before any caller-supplied employee filter is looked
/// at: an employee-role caller is always pinned to their own id, whatever
/// they asked for.
fn scoped_employee(
    role: Role,
    caller_employee_id: Option<i64>,
    requested: Option<i64>,
) -> Result<Option<i64>, ApiError> {
    if role.allows(Action::ViewAllRecords) {
        Ok(requested)
    } else {
        caller_employee_id
            .map(Some)
            .ok_or(ApiError::Forbidden("No employee profile"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub employee_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub employee_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<RequestStatus>,
}

fn date_range_clause(
    where_sql: &mut String,
    args: &mut Vec<FilterValue>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) {
    if let Some(d) = start {
        where_sql.push_str(" AND date >= ?");
        args.push(FilterValue::Day(d));
    }
    if let Some(d) = end {
        where_sql.push_str(" AND date <= ?");
        args.push(FilterValue::Day(d));
    }
}

/// Attendance list, ordered by date descending, then employee, then id.
pub async fn list_attendance(
    pool: &SqlitePool,
    filter: &AttendanceFilter,
    params: PageParams,
    role: Role,
    caller_employee_id: Option<i64>,
) -> Result<Paginated<AttendanceRecord>, ApiError> {
    let employee_id = scoped_employee(role, caller_employee_id, filter.employee_id)?;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(id) = employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::Int(id));
    }
    date_range_clause(&mut where_sql, &mut args, filter.start_date, filter.end_date);
    if let Some(status) = filter.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Text(status.to_string()));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM attendance{where_sql}");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::Int(v) => count_q.bind(*v),
            FilterValue::Text(s) => count_q.bind(s.as_str()),
            FilterValue::Day(d) => count_q.bind(*d),
        };
    }
    let total = count_q.fetch_one(pool).await?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        "SELECT id, employee_id, date, clock_in, clock_out, work_hours, status, notes \
         FROM attendance{where_sql} \
         ORDER BY date DESC, employee_id ASC, id ASC LIMIT ? OFFSET ?"
    );

    let mut data_q = sqlx::query_as::<_, AttendanceRecord>(&data_sql);
    for arg in &args {
        data_q = match arg {
            FilterValue::Int(v) => data_q.bind(*v),
            FilterValue::Text(s) => data_q.bind(s.as_str()),
            FilterValue::Day(d) => data_q.bind(*d),
        };
    }
    let data = data_q
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

    Ok(Paginated::new(data, params, total))
}

/// Regularization list, ordered by target date descending, then id.
pub async fn list_requests(
    pool: &SqlitePool,
    filter: &RequestFilter,
    params: PageParams,
    role: Role,
    caller_employee_id: Option<i64>,
) -> Result<Paginated<RegularizationRequest>, ApiError> {
    let employee_id = scoped_employee(role, caller_employee_id, filter.employee_id)?;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(id) = employee_id {
        where_sql.push_str(" AND submitted_by = ?");
        args.push(FilterValue::Int(id));
    }
    date_range_clause(&mut where_sql, &mut args, filter.start_date, filter.end_date);
    if let Some(status) = filter.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Text(status.to_string()));
    }

    let count_sql = format!("SELECT COUNT(*) FROM regularization_requests{where_sql}");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::Int(v) => count_q.bind(*v),
            FilterValue::Text(s) => count_q.bind(s.as_str()),
            FilterValue::Day(d) => count_q.bind(*d),
        };
    }
    let total = count_q.fetch_one(pool).await?;

    let data_sql = format!(
        "SELECT id, employee_id, date, original_clock_in, original_clock_out, \
         requested_clock_in, requested_clock_out, reason, status, submitted_by, decided_by, \
         created_at, decided_at \
         FROM regularization_requests{where_sql} \
         ORDER BY date DESC, id DESC LIMIT ? OFFSET ?"
    );

    let mut data_q = sqlx::query_as::<_, RegularizationRequest>(&data_sql);
    for arg in &args {
        data_q = match arg {
            FilterValue::Int(v) => data_q.bind(*v),
            FilterValue::Text(s) => data_q.bind(s.as_str()),
            FilterValue::Day(d) => data_q.bind(*d),
        };
    }
    let data = data_q
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

    Ok(Paginated::new(data, params, total))
}
