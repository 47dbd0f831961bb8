//! Timestamp utilities
//!
//! Entity timestamps (`createdAt`) are integer epoch milliseconds.

use chrono::{DateTime, TimeZone, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current time as epoch milliseconds
pub fn now_millis() -> i64 {
    now().timestamp_millis()
}

/// Convert epoch milliseconds to a UTC timestamp, `None` if out of range
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_now_millis_is_recent() {
        let millis = now_millis();
        // After 2020-01-01 and before 2100-01-01
        assert!(millis > 1_577_836_800_000);
        assert!(millis < 4_102_444_800_000);
    }

    #[tokio::test]
    async fn test_now_millis_advances() {
        let t1 = now_millis();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let t2 = now_millis();
        assert!(t2 > t1);
    }

    #[test]
    fn test_from_millis_roundtrip() {
        let dt = from_millis(1_000).unwrap();
        assert_eq!(dt.timestamp_millis(), 1_000);
    }
}
