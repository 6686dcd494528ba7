//! ISO-8601 durations as returned in `contentDetails.duration`.

/// Total seconds in a `P[nD]T[nH][nM][nS]` duration, `None` if malformed.
pub fn parse_iso8601_seconds(raw: &str) -> Option<u64> {
    let rest = raw.trim().strip_prefix('P')?;
    if rest.is_empty() {
        return None;
    }

    let mut total = 0u64;
    let mut number = String::new();
    let mut in_time = false;

    for c in rest.chars() {
        match c {
            'T' if !in_time && number.is_empty() => in_time = true,
            c if c.is_ascii_digit() => number.push(c),
            unit => {
                let value: u64 = number.parse().ok()?;
                number.clear();
                let multiplier = match (in_time, unit) {
                    (false, 'W') => 7 * 86_400,
                    (false, 'D') => 86_400,
                    (true, 'H') => 3_600,
                    (true, 'M') => 60,
                    (true, 'S') => 1,
                    _ => return None,
                };
                total = total.checked_add(value.checked_mul(multiplier)?)?;
            }
        }
    }

    if number.is_empty() {
        Some(total)
    } else {
        None
    }
}

/// `m:ss` under an hour, `h:mm:ss` otherwise.
pub fn format_seconds(total: u64) -> String {
    let hours = total / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Display string for a platform duration; malformed input renders as `0:00`.
pub fn humanize_duration(raw: &str) -> String {
    format_seconds(parse_iso8601_seconds(raw).unwrap_or(0))
}
