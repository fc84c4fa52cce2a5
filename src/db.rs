// Attendance runs on sqlite so the module stays self-contained; the schema
// is applied idempotently at startup in lieu of external migrations.

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        clock_in TEXT,
        clock_out TEXT,
        work_hours REAL,
        status TEXT NOT NULL DEFAULT 'absent',
        notes TEXT,
        UNIQUE (employee_id, date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS regularization_requests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        employee_id INTEGER NOT NULL,
        date TEXT NOT NULL,
        original_clock_in TEXT,
        original_clock_out TEXT,
        requested_clock_in TEXT NOT NULL,
        requested_clock_out TEXT NOT NULL,
        reason TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending',
        submitted_by INTEGER NOT NULL,
        decided_by INTEGER,
        created_at TEXT NOT NULL,
        decided_at TEXT
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_regularization_employee_date
        ON regularization_requests (employee_id, date)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_regularization_status
        ON regularization_requests (status)
    "#,
];

pub async fn init_db(database_url: &str) -> SqlitePool {
    let options = SqliteConnectOptions::from_str(database_url)
        .expect("DATABASE_URL must be a valid sqlite URL")
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("Failed to connect to database");

    ensure_schema(&pool)
        .await
        .expect("Failed to apply database schema");

    pool
}

pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
