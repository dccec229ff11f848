/// Gallery years are plain calendar years (the primary key of `olympics_years`).
pub type Year = i32;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Current UTC time as Unix seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
