use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, 0 if the system clock is before it.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

fn now_secs() -> i64 {
    now_millis().div_euclid(1000)
}

/// Split seconds since the epoch into a UTC civil date and time of day.
pub fn civil_from_secs(secs: i64) -> (i64, u32, u32, u32, u32, u32) {
    let days = secs.div_euclid(86400);
    let time_of_day = secs.rem_euclid(86400) as u32;
    let (year, month, day) = civil_from_days(days);
    (
        year,
        month,
        day,
        time_of_day / 3600,
        (time_of_day % 3600) / 60,
        time_of_day % 60,
    )
}

// Howard Hinnant's days-to-civil algorithm
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

/// Format a millisecond timestamp as `YYYY-MM-DD HH:MM` (UTC).
pub fn format_millis(millis: i64) -> String {
    let (year, month, day, hours, minutes, _) = civil_from_secs(millis.div_euclid(1000));
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}",
        year, month, day, hours, minutes
    )
}

/// Current time as `YYYY-MM-DDTHH:MM:SS` (UTC).
pub fn format_timestamp() -> String {
    let (year, month, day, hours, minutes, seconds) = civil_from_secs(now_secs());
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        year, month, day, hours, minutes, seconds
    )
}

/// Current date as `YYYY-MM-DD` (UTC).
pub fn format_today() -> String {
    let (year, month, day, ..) = civil_from_secs(now_secs());
    format!("{:04}-{:02}-{:02}", year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_civil_from_days_epoch() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
    }

    #[test]
    fn test_civil_from_days_leap_day() {
        assert_eq!(civil_from_days(11016), (2000, 2, 29));
    }

    #[test]
    fn test_civil_from_secs_time_of_day() {
        // 2024-12-31T23:59:58
        let secs = 20088 * 86400 + 23 * 3600 + 59 * 60 + 58;
        assert_eq!(civil_from_secs(secs), (2024, 12, 31, 23, 59, 58));
    }

    #[test]
    fn test_civil_from_secs_before_epoch() {
        assert_eq!(civil_from_secs(-1), (1969, 12, 31, 23, 59, 59));
    }

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(0), "1970-01-01 00:00");
        assert_eq!(format_millis(1_700_000_000_000), "2023-11-14 22:13");
    }
}
