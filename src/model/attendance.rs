use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Day-level status of an attendance record. Stored as lowercase text.
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
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    HalfDay,
    Leave,
}

/// One employee's clock times and status for one calendar day.
/// At most one row exists per (employee_id, date).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 1000,
    "date": "2024-01-10",
    "clock_in": "09:00:00",
    "clock_out": "18:00:00",
    "work_hours": 8.0,
    "status": "present",
    "notes": null
}))]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 1000)]
    pub employee_id: i64,

    #[schema(example = "2024-01-10", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "09:00:00", value_type = String, nullable = true)]
    pub clock_in: Option<NaiveTime>,

    #[schema(example = "18:00:00", value_type = String, nullable = true)]
    pub clock_out: Option<NaiveTime>,

    /// Derived from the clock pair minus the configured break; null until
    /// both clock times are present.
    #[schema(example = 8.0, nullable = true)]
    pub work_hours: Option<f64>,

    pub status: AttendanceStatus,

    #[schema(example = "worked from office", nullable = true)]
    pub notes: Option<String>,
}
