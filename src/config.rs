use chrono::NaiveTime;
use dotenvy::dotenv;
use std::env;

use crate::service::attendance::ClockPolicy;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,
    pub rate_clock_per_min: u32,

    // Attendance policy, fed from the settings collaborator.
    // No WORK_DAY_START means no automatic late detection.
    pub work_day_start: Option<NaiveTime>,
    pub late_grace_minutes: i64,
    pub break_minutes: i64,

    pub api_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),

            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),
            rate_clock_per_min: env::var("RATE_CLOCK_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),

            work_day_start: env::var("WORK_DAY_START").ok().map(|s| {
                NaiveTime::parse_from_str(&s, "%H:%M:%S")
                    .expect("WORK_DAY_START must be HH:MM:SS")
            }),
            late_grace_minutes: env::var("LATE_GRACE_MINUTES")
                .unwrap_or_else(|_| "15".to_string())
                .parse()
                .unwrap(),
            break_minutes: env::var("BREAK_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
        }
    }

    pub fn clock_policy(&self) -> ClockPolicy {
        ClockPolicy {
            work_day_start: self.work_day_start,
            late_grace_minutes: self.late_grace_minutes,
            break_minutes: self.break_minutes,
        }
    }
}
