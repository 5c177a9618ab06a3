/// Current UTC timestamp (milliseconds)
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// UTC calendar date of a Unix-millis timestamp
pub fn utc_date(millis: i64) -> chrono::NaiveDate {
    chrono::DateTime::from_timestamp_millis(millis)
        .unwrap_or_default()
        .date_naive()
}
