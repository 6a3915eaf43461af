use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// `m:ss`, as shown by the question countdown.
#[must_use]
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let minutes = seconds / 60;
    let remainder = seconds % 60;
    if minutes == 0 {
        format!("{remainder}s")
    } else {
        format!("{minutes}m {remainder:02}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[test]
    fn formats_times() {
        assert_eq!(format_datetime(fixed_now()), "2023-11-14 22:13 UTC");
        assert_eq!(format_countdown(5), "0:05");
        assert_eq!(format_countdown(90), "1:30");
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 05s");
    }
}
