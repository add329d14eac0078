use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Preview cutoffs for history entries, in characters.
pub const PROMPT_PREVIEW_CHARS: usize = 150;
pub const RESPONSE_PREVIEW_CHARS: usize = 100;

/// First `max_chars` characters plus an ellipsis, or the text unchanged if
/// it already fits.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}

pub fn needs_truncation(text: &str, max_chars: usize) -> bool {
    text.chars().count() > max_chars
}

/// The bridge stores naive local `isoformat` timestamps; newer builds emit
/// RFC 3339. Accept both.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Bucketed "time ago" label, recomputed at render time.
pub fn format_relative(ts: DateTime<Local>, now: DateTime<Local>) -> String {
    let elapsed = now.signed_duration_since(ts);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        ago(minutes, "minute")
    } else if hours < 24 {
        ago(hours, "hour")
    } else if days < 7 {
        ago(days, "day")
    } else {
        ts.format("%b %-d, %H:%M").to_string()
    }
}

/// Render-ready label for a raw server timestamp. Unparseable input is shown
/// as-is rather than dropped.
pub fn timestamp_label(raw: &str, now: DateTime<Local>) -> String {
    match parse_timestamp(raw) {
        Some(ts) => format_relative(ts, now),
        None => raw.to_string(),
    }
}

fn ago(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 5, 27, 12, 44, 0).unwrap()
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("exact", 5), "exact");
    }

    #[test]
    fn truncate_cuts_at_char_boundaries() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        // multibyte input must be cut by characters, not bytes
        assert_eq!(truncate("日本語のテキスト", 3), "日本語...");
    }

    #[test]
    fn truncate_is_idempotent_at_the_same_bound() {
        let once = truncate("abcdefghij", 4);
        assert_eq!(truncate(&once, 4), once);
        assert_eq!(truncate(&once, 10), once);
    }

    #[test]
    fn needs_truncation_matches_the_cutoff() {
        assert!(!needs_truncation("abc", 3));
        assert!(needs_truncation("abcd", 3));
    }

    #[test]
    fn just_now_under_one_minute() {
        let now = fixed_now();
        assert_eq!(format_relative(now - Duration::seconds(30), now), "just now");
        assert_eq!(format_relative(now - Duration::seconds(59), now), "just now");
    }

    #[test]
    fn boundaries_fall_into_the_next_bucket() {
        let now = fixed_now();
        assert_eq!(
            format_relative(now - Duration::seconds(60), now),
            "1 minute ago"
        );
        assert_eq!(
            format_relative(now - Duration::minutes(60), now),
            "1 hour ago"
        );
        assert_eq!(format_relative(now - Duration::hours(24), now), "1 day ago");
        // exactly seven days switches to the absolute form
        assert_eq!(
            format_relative(now - Duration::days(7), now),
            "May 20, 12:44"
        );
    }

    #[test]
    fn intermediate_buckets() {
        let now = fixed_now();
        assert_eq!(
            format_relative(now - Duration::minutes(5), now),
            "5 minutes ago"
        );
        assert_eq!(
            format_relative(now - Duration::hours(2), now),
            "2 hours ago"
        );
        assert_eq!(format_relative(now - Duration::days(3), now), "3 days ago");
    }

    #[test]
    fn parses_naive_and_rfc3339_timestamps() {
        assert!(parse_timestamp("2025-05-27T12:44:00.123456").is_some());
        assert!(parse_timestamp("2025-05-27T11:00:00").is_some());
        assert!(parse_timestamp("2025-05-27T11:00:00+09:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn timestamp_label_falls_back_to_raw_text() {
        assert_eq!(timestamp_label("not a date", fixed_now()), "not a date");
    }
}
