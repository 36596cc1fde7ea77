//! Countdown duration parsing and formatting.

/// Parse a manual duration override typed by the user.
///
/// Accepts plain seconds (`"90"`), `mm:ss` or `hh:mm:ss`. Anything that is not
/// a positive duration yields `None`, which callers treat as "use the default".
pub fn parse_duration_override(input: &str) -> Option<u32> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let parts: Vec<&str> = input.split(':').collect();
    if parts.len() > 3 {
        return None;
    }

    let mut total: u64 = 0;
    for (i, part) in parts.iter().enumerate() {
        let value: u64 = part.trim().parse().ok()?;
        // Only the leading field may exceed 59.
        if i > 0 && value >= 60 {
            return None;
        }
        total = total.checked_mul(60)?.checked_add(value)?;
    }

    u32::try_from(total).ok().filter(|secs| *secs > 0)
}

/// Resolve an optional override against the configured default.
pub fn effective_duration(duration_override: Option<i64>, default_secs: u32) -> u32 {
    duration_override
        .filter(|secs| *secs > 0)
        .and_then(|secs| u32::try_from(secs).ok())
        .unwrap_or(default_secs)
}

/// Render remaining seconds as `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_remaining(secs: u32) -> String {
    let (hours, rest) = (secs / 3600, secs % 3600);
    let (minutes, seconds) = (rest / 60, rest % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_seconds() {
        assert_eq!(parse_duration_override("90"), Some(90));
        assert_eq!(parse_duration_override(" 10 "), Some(10));
    }

    #[test]
    fn parses_clock_formats() {
        assert_eq!(parse_duration_override("05:00"), Some(300));
        assert_eq!(parse_duration_override("1:00:00"), Some(3600));
        assert_eq!(parse_duration_override("75:30"), Some(4530));
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(parse_duration_override(""), None);
        assert_eq!(parse_duration_override("abc"), None);
        assert_eq!(parse_duration_override("0"), None);
        assert_eq!(parse_duration_override("-5"), None);
        assert_eq!(parse_duration_override("1:60"), None);
        assert_eq!(parse_duration_override("1:2:3:4"), None);
        assert_eq!(parse_duration_override("99999999999"), None);
    }

    #[test]
    fn non_positive_override_falls_back() {
        assert_eq!(effective_duration(None, 3600), 3600);
        assert_eq!(effective_duration(Some(0), 3600), 3600);
        assert_eq!(effective_duration(Some(-10), 3600), 3600);
        assert_eq!(effective_duration(Some(10), 3600), 10);
    }

    #[test]
    fn formats_remaining() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(299), "04:59");
        assert_eq!(format_remaining(3599), "59:59");
        assert_eq!(format_remaining(3600), "1:00:00");
    }
}
