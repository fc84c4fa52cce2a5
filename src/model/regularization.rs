use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of a regularization request. `Pending` is the only state a
/// decision can move out of; `Approved` and `Rejected` are terminal.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    sqlx::Type,
    strum_macros::Display,
    strum_macros::EnumString,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

/// The two terminal outcomes an approver can pick.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_status(self) -> RequestStatus {
        match self {
            Decision::Approved => RequestStatus::Approved,
            Decision::Rejected => RequestStatus::Rejected,
        }
    }
}

/// An employee-submitted correction of the clock times for one day.
///
/// `original_*` snapshot the attendance row as it stood at submission time,
/// so the approver sees what the employee was correcting even if the row was
/// edited in between.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 1000,
    "date": "2024-01-10",
    "original_clock_in": null,
    "original_clock_out": null,
    "requested_clock_in": "09:00:00",
    "requested_clock_out": "18:00:00",
    "reason": "forgot badge",
    "status": "pending",
    "submitted_by": 1000,
    "decided_by": null,
    "created_at": "2024-01-11T08:30:00",
    "decided_at": null
}))]
pub struct RegularizationRequest {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 1000)]
    pub employee_id: i64,

    #[schema(example = "2024-01-10", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "08:55:00", value_type = String, nullable = true)]
    pub original_clock_in: Option<NaiveTime>,

    #[schema(example = "17:45:00", value_type = String, nullable = true)]
    pub original_clock_out: Option<NaiveTime>,

    #[schema(example = "09:00:00", value_type = String)]
    pub requested_clock_in: NaiveTime,

    #[schema(example = "18:00:00", value_type = String)]
    pub requested_clock_out: NaiveTime,

    #[schema(example = "forgot badge")]
    pub reason: String,

    pub status: RequestStatus,

    #[schema(example = 1000)]
    pub submitted_by: i64,

    #[schema(example = 17, nullable = true)]
    pub decided_by: Option<i64>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub decided_at: Option<NaiveDateTime>,
}
