use chrono::{NaiveDate, NaiveTime, Utc};
use sqlx::SqlitePool;

use crate::error::ApiError;
use crate::model::regularization::{Decision, RegularizationRequest};
use crate::service::attendance::{self, ClockPolicy};

const REQUEST_COLUMNS: &str = "id, employee_id, date, original_clock_in, original_clock_out, \
     requested_clock_in, requested_clock_out, reason, status, submitted_by, decided_by, \
     created_at, decided_at";

pub async fn get_request(pool: &SqlitePool, id: i64) -> Result<RegularizationRequest, ApiError> {
    let sql = format!("SELECT {REQUEST_COLUMNS} FROM regularization_requests WHERE id = ?");

    sqlx::query_as::<_, RegularizationRequest>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("Regularization request"))
}

/// File a correction for one day. Snapshots the attendance row's clock values
/// as they stand right now; the attendance row itself is not touched until an
/// approval lands.
pub async fn submit(
    pool: &SqlitePool,
    employee_id: i64,
    date: NaiveDate,
    requested_clock_in: NaiveTime,
    requested_clock_out: NaiveTime,
    reason: &str,
) -> Result<RegularizationRequest, ApiError> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(ApiError::Validation("reason must not be empty".to_string()));
    }
    if requested_clock_out < requested_clock_in {
        return Err(ApiError::Validation(
            "requested_clock_out must not be earlier than requested_clock_in".to_string(),
        ));
    }

    // Snapshot at submission time, not decision time: the approver must see
    // what the employee was correcting, not whatever the row became through
    // unrelated edits in between.
    let current = attendance::find_by_day(pool, employee_id, date).await?;
    let (original_clock_in, original_clock_out) = current
        .map(|r| (r.clock_in, r.clock_out))
        .unwrap_or((None, None));

    let result = sqlx::query(
        r#"
        INSERT INTO regularization_requests
            (employee_id, date, original_clock_in, original_clock_out,
             requested_clock_in, requested_clock_out, reason, status, submitted_by, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .bind(original_clock_in)
    .bind(original_clock_out)
    .bind(requested_clock_in)
    .bind(requested_clock_out)
    .bind(reason)
    .bind(employee_id)
    .bind(Utc::now().naive_utc())
    .execute(pool)
    .await?;

    get_request(pool, result.last_insert_rowid()).await
}

/// Apply a decision. The transition is a compare-and-swap on the stored
/// status (`WHERE status = 'pending'`), and the attendance upsert an approval
/// triggers happens in the same transaction, so a concurrent second decide
/// observes `InvalidTransition` instead of double-applying.
pub async fn decide(
    pool: &SqlitePool,
    policy: &ClockPolicy,
    request_id: i64,
    decision: Decision,
    decided_by: i64,
) -> Result<RegularizationRequest, ApiError> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE regularization_requests
        SET status = ?, decided_by = ?, decided_at = ?
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(decision.as_status())
    .bind(decided_by)
    .bind(Utc::now().naive_utc())
    .bind(request_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        let exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM regularization_requests WHERE id = ?")
                .bind(request_id)
                .fetch_optional(&mut *tx)
                .await?;

        return Err(match exists {
            Some(_) => ApiError::InvalidTransition,
            None => ApiError::NotFound("Regularization request"),
        });
    }

    if decision == Decision::Approved {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM regularization_requests WHERE id = ?");
        let request = sqlx::query_as::<_, RegularizationRequest>(&sql)
            .bind(request_id)
            .fetch_one(&mut *tx)
            .await?;

        let work_hours = policy.work_hours(request.requested_clock_in, request.requested_clock_out);
        let status = policy.status_for_clock_in(request.requested_clock_in);

        sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, date, clock_in, clock_out, work_hours, status)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (employee_id, date) DO UPDATE
            SET clock_in = excluded.clock_in,
                clock_out = excluded.clock_out,
                work_hours = excluded.work_hours,
                status = excluded.status
            "#,
        )
        .bind(request.employee_id)
        .bind(request.date)
        .bind(request.requested_clock_in)
        .bind(request.requested_clock_out)
        .bind(work_hours)
        .bind(status)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    get_request(pool, request_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::AttendanceStatus;
    use crate::model::regularization::RequestStatus;
    use crate::service::attendance::tests::{d, t, test_policy, test_pool};
    use crate::service::attendance::{NewAttendance, create_record, find_by_day};

    const MANAGER: i64 = 17;

    #[actix_web::test]
    async fn submit_snapshots_missing_record_as_nulls() {
        let pool = test_pool().await;
        let request = submit(&pool, 1000, d("2024-01-10"), t(9, 0), t(18, 0), "forgot badge")
            .await
            .unwrap();

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(request.original_clock_in, None);
        assert_eq!(request.original_clock_out, None);
        assert_eq!(request.submitted_by, 1000);
        assert_eq!(request.decided_by, None);

        // submission never touches the attendance store
        assert!(find_by_day(&pool, 1000, d("2024-01-10"))
            .await
            .unwrap()
            .is_none());
    }

    #[actix_web::test]
    async fn submit_snapshots_existing_clock_values() {
        let pool = test_pool().await;
        create_record(
            &pool,
            &test_policy(),
            NewAttendance {
                employee_id: 1,
                date: d("2024-01-10"),
                clock_in: Some(t(10, 30)),
                clock_out: None,
                status: None,
                notes: None,
            },
        )
        .await
        .unwrap();

        let request = submit(&pool, 1, d("2024-01-10"), t(9, 0), t(18, 0), "badge reader down")
            .await
            .unwrap();

        assert_eq!(request.original_clock_in, Some(t(10, 30)));
        assert_eq!(request.original_clock_out, None);
    }

    #[actix_web::test]
    async fn submit_requires_reason_and_ordered_times() {
        let pool = test_pool().await;

        let err = submit(&pool, 1, d("2024-01-10"), t(9, 0), t(18, 0), "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = submit(&pool, 1, d("2024-01-10"), t(18, 0), t(9, 0), "swapped")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[actix_web::test]
    async fn approval_creates_the_missing_record() {
        let pool = test_pool().await;
        let policy = test_policy();

        let request = submit(&pool, 1000, d("2024-01-10"), t(9, 0), t(18, 0), "forgot badge")
            .await
            .unwrap();
        let decided = decide(&pool, &policy, request.id, Decision::Approved, MANAGER)
            .await
            .unwrap();

        assert_eq!(decided.status, RequestStatus::Approved);
        assert_eq!(decided.decided_by, Some(MANAGER));
        assert!(decided.decided_at.is_some());

        let record = find_by_day(&pool, 1000, d("2024-01-10"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.clock_in, Some(t(9, 0)));
        assert_eq!(record.clock_out, Some(t(18, 0)));
        assert_eq!(record.status, AttendanceStatus::Present);
        assert_eq!(record.work_hours, Some(8.0));
    }

    #[actix_web::test]
    async fn approval_overwrites_an_existing_record() {
        let pool = test_pool().await;
        let policy = test_policy();
        create_record(
            &pool,
            &policy,
            NewAttendance {
                employee_id: 1,
                date: d("2024-01-10"),
                clock_in: Some(t(11, 0)),
                clock_out: Some(t(12, 0)),
                status: None,
                notes: Some("partial day".into()),
            },
        )
        .await
        .unwrap();

        let request = submit(&pool, 1, d("2024-01-10"), t(9, 0), t(17, 0), "badge reader down")
            .await
            .unwrap();
        decide(&pool, &policy, request.id, Decision::Approved, MANAGER)
            .await
            .unwrap();

        let record = find_by_day(&pool, 1, d("2024-01-10")).await.unwrap().unwrap();
        assert_eq!(record.clock_in, Some(t(9, 0)));
        assert_eq!(record.clock_out, Some(t(17, 0)));
        assert_eq!(record.work_hours, Some(7.0));
        // notes survive a correction
        assert_eq!(record.notes, Some("partial day".into()));
    }

    #[actix_web::test]
    async fn rejection_leaves_attendance_untouched() {
        let pool = test_pool().await;
        let request = submit(&pool, 1000, d("2024-01-10"), t(9, 0), t(18, 0), "forgot badge")
            .await
            .unwrap();

        let decided = decide(&pool, &test_policy(), request.id, Decision::Rejected, MANAGER)
            .await
            .unwrap();

        assert_eq!(decided.status, RequestStatus::Rejected);
        assert!(find_by_day(&pool, 1000, d("2024-01-10"))
            .await
            .unwrap()
            .is_none());
    }

    #[actix_web::test]
    async fn terminal_requests_cannot_be_decided_again() {
        let pool = test_pool().await;
        let policy = test_policy();
        let request = submit(&pool, 1000, d("2024-01-10"), t(9, 0), t(18, 0), "forgot badge")
            .await
            .unwrap();

        decide(&pool, &policy, request.id, Decision::Rejected, MANAGER)
            .await
            .unwrap();

        for decision in [Decision::Approved, Decision::Rejected] {
            let err = decide(&pool, &policy, request.id, decision, MANAGER)
                .await
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidTransition));
        }

        // the rejected request stayed rejected
        let request = get_request(&pool, request.id).await.unwrap();
        assert_eq!(request.status, RequestStatus::Rejected);
    }

    #[actix_web::test]
    async fn unknown_request_is_not_found() {
        let pool = test_pool().await;
        let err = decide(&pool, &test_policy(), 999, Decision::Approved, MANAGER)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[actix_web::test]
    async fn concurrent_decides_resolve_to_one_winner() {
        let pool = test_pool().await;
        let policy = test_policy();
        let request = submit(&pool, 1000, d("2024-01-10"), t(9, 0), t(18, 0), "forgot badge")
            .await
            .unwrap();

        let (a, b) = futures::join!(
            decide(&pool, &policy, request.id, Decision::Approved, MANAGER),
            decide(&pool, &policy, request.id, Decision::Approved, MANAGER + 1),
        );

        assert!(a.is_ok() != b.is_ok(), "exactly one decide must win");
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser.unwrap_err(), ApiError::InvalidTransition));

        // the attendance write happened exactly once, from the winner
        let record = find_by_day(&pool, 1000, d("2024-01-10"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.clock_in, Some(t(9, 0)));
    }
}
