use chrono::{Duration, NaiveDate, NaiveTime};
use sqlx::SqlitePool;

use crate::error::ApiError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

const RECORD_COLUMNS: &str =
    "id, employee_id, date, clock_in, clock_out, work_hours, status, notes";

/// Attendance policy fed from the settings collaborator: when a clock-in
/// counts as late and how much unpaid break to deduct from worked hours.
#[derive(Debug, Clone)]
pub struct ClockPolicy {
    /// No configured start means no automatic late detection.
    pub work_day_start: Option<NaiveTime>,
    pub late_grace_minutes: i64,
    pub break_minutes: i64,
}

impl ClockPolicy {
    pub fn status_for_clock_in(&self, at: NaiveTime) -> AttendanceStatus {
        match self.work_day_start {
            Some(start) if at > start + Duration::minutes(self.late_grace_minutes) => {
                AttendanceStatus::Late
            }
            _ => AttendanceStatus::Present,
        }
    }

    /// Worked hours for a closed clock pair, break deducted, floored at zero
    /// and rounded to two decimals.
    pub fn work_hours(&self, clock_in: NaiveTime, clock_out: NaiveTime) -> f64 {
        let worked = (clock_out - clock_in) - Duration::minutes(self.break_minutes);
        let seconds = worked.num_seconds().max(0);
        (seconds as f64 / 3600.0 * 100.0).round() / 100.0
    }
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub clock_in: Option<NaiveTime>,
    pub clock_out: Option<NaiveTime>,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct AttendanceChanges {
    pub clock_in: Option<NaiveTime>,
    pub clock_out: Option<NaiveTime>,
    pub status: Option<AttendanceStatus>,
    pub notes: Option<String>,
}

fn validate_clock_pair(
    clock_in: Option<NaiveTime>,
    clock_out: Option<NaiveTime>,
) -> Result<(), ApiError> {
    if let (Some(i), Some(o)) = (clock_in, clock_out) {
        if o < i {
            return Err(ApiError::Validation(
                "clock_out must not be earlier than clock_in".to_string(),
            ));
        }
    }
    Ok(())
}

pub async fn find_by_day(
    pool: &SqlitePool,
    employee_id: i64,
    date: NaiveDate,
) -> Result<Option<AttendanceRecord>, ApiError> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM attendance WHERE employee_id = ? AND date = ?");

    let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(employee_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;

    Ok(record)
}

pub async fn get_record(pool: &SqlitePool, id: i64) -> Result<AttendanceRecord, ApiError> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM attendance WHERE id = ?");

    sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("Attendance record"))
}

/// Open today's session. The existence check and the write are one guarded
/// statement, so two near-simultaneous calls cannot both open a session.
/// Re-clocking in on a day that was already closed reopens it.
pub async fn clock_in(
    pool: &SqlitePool,
    policy: &ClockPolicy,
    employee_id: i64,
    date: NaiveDate,
    now: NaiveTime,
) -> Result<AttendanceRecord, ApiError> {
    let status = policy.status_for_clock_in(now);

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, clock_in, status)
        VALUES (?, ?, ?, ?)
        ON CONFLICT (employee_id, date) DO UPDATE
        SET clock_in = excluded.clock_in,
            clock_out = NULL,
            work_hours = NULL,
            status = excluded.status
        WHERE attendance.clock_in IS NULL OR attendance.clock_out IS NOT NULL
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .bind(now)
    .bind(status)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::AlreadyClockedIn);
    }

    find_by_day(pool, employee_id, date)
        .await?
        .ok_or(ApiError::NotFound("Attendance record"))
}

/// Close today's open session and compute worked hours. The final UPDATE is
/// guarded on `clock_out IS NULL` so a racing call gets `NoOpenSession`.
pub async fn clock_out(
    pool: &SqlitePool,
    policy: &ClockPolicy,
    employee_id: i64,
    date: NaiveDate,
    now: NaiveTime,
) -> Result<AttendanceRecord, ApiError> {
    let mut tx = pool.begin().await?;

    let sql = format!("SELECT {RECORD_COLUMNS} FROM attendance WHERE employee_id = ? AND date = ?");
    let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(employee_id)
        .bind(date)
        .fetch_optional(&mut *tx)
        .await?;

    let record = match record {
        Some(r) if r.clock_in.is_some() && r.clock_out.is_none() => r,
        _ => return Err(ApiError::NoOpenSession),
    };
    let Some(clock_in) = record.clock_in else {
        return Err(ApiError::NoOpenSession);
    };

    if now < clock_in {
        return Err(ApiError::Validation(
            "clock_out must not be earlier than clock_in".to_string(),
        ));
    }

    let hours = policy.work_hours(clock_in, now);

    let result = sqlx::query(
        "UPDATE attendance SET clock_out = ?, work_hours = ? WHERE id = ? AND clock_out IS NULL",
    )
    .bind(now)
    .bind(hours)
    .bind(record.id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NoOpenSession);
    }

    tx.commit().await?;

    get_record(pool, record.id).await
}

/// Manual record creation (admin/manager path). Status defaults from the
/// clock-in via the late policy, or to `absent` when no clock times exist.
pub async fn create_record(
    pool: &SqlitePool,
    policy: &ClockPolicy,
    new: NewAttendance,
) -> Result<AttendanceRecord, ApiError> {
    validate_clock_pair(new.clock_in, new.clock_out)?;

    let work_hours = match (new.clock_in, new.clock_out) {
        (Some(i), Some(o)) => Some(policy.work_hours(i, o)),
        _ => None,
    };

    let status = new.status.unwrap_or_else(|| match new.clock_in {
        Some(at) => policy.status_for_clock_in(at),
        None => AttendanceStatus::Absent,
    });

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, clock_in, clock_out, work_hours, status, notes)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (employee_id, date) DO NOTHING
        "#,
    )
    .bind(new.employee_id)
    .bind(new.date)
    .bind(new.clock_in)
    .bind(new.clock_out)
    .bind(work_hours)
    .bind(status)
    .bind(&new.notes)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::DuplicateRecord);
    }

    find_by_day(pool, new.employee_id, new.date)
        .await?
        .ok_or(ApiError::NotFound("Attendance record"))
}

/// Merge a partial edit onto the stored row, re-validate the clock pair and
/// recompute worked hours from the merged values.
pub async fn update_record(
    pool: &SqlitePool,
    policy: &ClockPolicy,
    id: i64,
    changes: AttendanceChanges,
) -> Result<AttendanceRecord, ApiError> {
    let mut tx = pool.begin().await?;

    let sql = format!("SELECT {RECORD_COLUMNS} FROM attendance WHERE id = ?");
    let current = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("Attendance record"))?;

    let clock_in = changes.clock_in.or(current.clock_in);
    let clock_out = changes.clock_out.or(current.clock_out);
    validate_clock_pair(clock_in, clock_out)?;

    let work_hours = match (clock_in, clock_out) {
        (Some(i), Some(o)) => Some(policy.work_hours(i, o)),
        _ => None,
    };
    let status = changes.status.unwrap_or(current.status);
    let notes = changes.notes.or(current.notes);

    sqlx::query(
        r#"
        UPDATE attendance
        SET clock_in = ?, clock_out = ?, work_hours = ?, status = ?, notes = ?
        WHERE id = ?
        "#,
    )
    .bind(clock_in)
    .bind(clock_out)
    .bind(work_hours)
    .bind(status)
    .bind(&notes)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    get_record(pool, id).await
}

/// Irreversible; the role gate sits in the handler.
pub async fn delete_record(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    let result = sqlx::query("DELETE FROM attendance WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Attendance record"));
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    pub(crate) async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::ensure_schema(&pool).await.unwrap();
        pool
    }

    pub(crate) fn test_policy() -> ClockPolicy {
        ClockPolicy {
            work_day_start: Some(t(9, 0)),
            late_grace_minutes: 15,
            break_minutes: 60,
        }
    }

    pub(crate) fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    pub(crate) fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[actix_web::test]
    async fn clock_in_creates_todays_record() {
        let pool = test_pool().await;
        let record = clock_in(&pool, &test_policy(), 1, d("2024-01-10"), t(8, 58))
            .await
            .unwrap();

        assert_eq!(record.employee_id, 1);
        assert_eq!(record.clock_in, Some(t(8, 58)));
        assert_eq!(record.clock_out, None);
        assert_eq!(record.status, AttendanceStatus::Present);
    }

    #[actix_web::test]
    async fn clock_in_after_grace_is_late() {
        let pool = test_pool().await;
        let policy = test_policy();

        // 09:15 is the last on-time minute with a 15 minute grace
        let r = clock_in(&pool, &policy, 1, d("2024-01-10"), t(9, 15))
            .await
            .unwrap();
        assert_eq!(r.status, AttendanceStatus::Present);

        let r = clock_in(&pool, &policy, 2, d("2024-01-10"), t(9, 16))
            .await
            .unwrap();
        assert_eq!(r.status, AttendanceStatus::Late);
    }

    #[actix_web::test]
    async fn no_late_detection_without_configured_start() {
        let pool = test_pool().await;
        let policy = ClockPolicy {
            work_day_start: None,
            late_grace_minutes: 15,
            break_minutes: 0,
        };

        let r = clock_in(&pool, &policy, 1, d("2024-01-10"), t(13, 30))
            .await
            .unwrap();
        assert_eq!(r.status, AttendanceStatus::Present);
    }

    #[actix_web::test]
    async fn second_clock_in_conflicts() {
        let pool = test_pool().await;
        let policy = test_policy();

        clock_in(&pool, &policy, 1, d("2024-01-10"), t(9, 0))
            .await
            .unwrap();
        let err = clock_in(&pool, &policy, 1, d("2024-01-10"), t(9, 5))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::AlreadyClockedIn));
    }

    #[actix_web::test]
    async fn clock_in_reopens_a_closed_day() {
        let pool = test_pool().await;
        let policy = test_policy();
        let date = d("2024-01-10");

        clock_in(&pool, &policy, 1, date, t(9, 0)).await.unwrap();
        clock_out(&pool, &policy, 1, date, t(12, 0)).await.unwrap();

        let reopened = clock_in(&pool, &policy, 1, date, t(13, 0)).await.unwrap();
        assert_eq!(reopened.clock_in, Some(t(13, 0)));
        assert_eq!(reopened.clock_out, None);
        assert_eq!(reopened.work_hours, None);
    }

    #[actix_web::test]
    async fn clock_out_without_open_session_conflicts() {
        let pool = test_pool().await;
        let err = clock_out(&pool, &test_policy(), 1, d("2024-01-10"), t(17, 0))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::NoOpenSession));
    }

    #[actix_web::test]
    async fn clock_out_computes_hours_minus_break() {
        let pool = test_pool().await;
        let policy = test_policy();
        let date = d("2024-01-10");

        clock_in(&pool, &policy, 1, date, t(9, 0)).await.unwrap();
        let record = clock_out(&pool, &policy, 1, date, t(18, 0)).await.unwrap();

        assert_eq!(record.clock_out, Some(t(18, 0)));
        assert_eq!(record.work_hours, Some(8.0));

        let err = clock_out(&pool, &policy, 1, date, t(19, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NoOpenSession));
    }

    #[actix_web::test]
    async fn short_session_never_goes_negative() {
        let policy = test_policy();
        assert_eq!(policy.work_hours(t(9, 0), t(9, 30)), 0.0);
        assert_eq!(policy.work_hours(t(9, 0), t(10, 45)), 0.75);
    }

    #[actix_web::test]
    async fn duplicate_create_conflicts() {
        let pool = test_pool().await;
        let policy = test_policy();
        let new = NewAttendance {
            employee_id: 1,
            date: d("2024-01-10"),
            clock_in: Some(t(9, 0)),
            clock_out: Some(t(18, 0)),
            status: None,
            notes: None,
        };

        let record = create_record(&pool, &policy, new.clone()).await.unwrap();
        assert_eq!(record.work_hours, Some(8.0));
        assert_eq!(record.status, AttendanceStatus::Present);

        let err = create_record(&pool, &policy, new).await.unwrap_err();
        assert!(matches!(err, ApiError::DuplicateRecord));
    }

    #[actix_web::test]
    async fn create_without_clock_times_is_absent() {
        let pool = test_pool().await;
        let record = create_record(
            &pool,
            &test_policy(),
            NewAttendance {
                employee_id: 1,
                date: d("2024-01-10"),
                clock_in: None,
                clock_out: None,
                status: None,
                notes: Some("no show".into()),
            },
        )
        .await
        .unwrap();

        assert_eq!(record.status, AttendanceStatus::Absent);
        assert_eq!(record.work_hours, None);
    }

    #[actix_web::test]
    async fn create_rejects_inverted_clock_pair() {
        let pool = test_pool().await;
        let err = create_record(
            &pool,
            &test_policy(),
            NewAttendance {
                employee_id: 1,
                date: d("2024-01-10"),
                clock_in: Some(t(18, 0)),
                clock_out: Some(t(9, 0)),
                status: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[actix_web::test]
    async fn update_merges_and_revalidates() {
        let pool = test_pool().await;
        let policy = test_policy();
        let record = create_record(
            &pool,
            &policy,
            NewAttendance {
                employee_id: 1,
                date: d("2024-01-10"),
                clock_in: Some(t(9, 0)),
                clock_out: None,
                status: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        // merging a clock_out earlier than the stored clock_in must fail
        let err = update_record(
            &pool,
            &policy,
            record.id,
            AttendanceChanges {
                clock_out: Some(t(8, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let updated = update_record(
            &pool,
            &policy,
            record.id,
            AttendanceChanges {
                clock_out: Some(t(17, 30)),
                status: Some(AttendanceStatus::HalfDay),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.clock_in, Some(t(9, 0)));
        assert_eq!(updated.clock_out, Some(t(17, 30)));
        assert_eq!(updated.work_hours, Some(7.5));
        assert_eq!(updated.status, AttendanceStatus::HalfDay);
    }

    #[actix_web::test]
    async fn update_unknown_id_is_not_found() {
        let pool = test_pool().await;
        let err = update_record(&pool, &test_policy(), 999, AttendanceChanges::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn delete_removes_the_record() {
        let pool = test_pool().await;
        let policy = test_policy();
        let record = clock_in(&pool, &policy, 1, d("2024-01-10"), t(9, 0))
            .await
            .unwrap();

        delete_record(&pool, record.id).await.unwrap();

        let err = get_record(&pool, record.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = delete_record(&pool, record.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
