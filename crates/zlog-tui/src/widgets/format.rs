//! Display formatting for log rows and project metadata.

use chrono::{DateTime, Local, Utc};

const MISSING: &str = "─";

/// Local wall-clock time of a log row, with date when not today.
pub fn fmt_log_time(time: Option<DateTime<Utc>>, today: chrono::NaiveDate) -> String {
    time.map_or_else(
        || MISSING.into(),
        |t| {
            let local = t.with_timezone(&Local);
            if local.date_naive() == today {
                local.format("%H:%M:%S").to_string()
            } else {
                local.format("%m-%d %H:%M:%S").to_string()
            }
        },
    )
}

pub fn fmt_created(time: Option<DateTime<Utc>>) -> String {
    time.map_or_else(
        || MISSING.into(),
        |t| t.with_timezone(&Local).format("%Y-%m-%d").to_string(),
    )
}

pub fn fmt_latency(latency_ms: Option<u64>) -> String {
    match latency_ms {
        None => MISSING.into(),
        Some(ms) if ms >= 10_000 => format!("{}s", ms / 1000),
        Some(ms) => format!("{ms}ms"),
    }
}

/// Grouped thousands for stats cards: 1234567 → "1,234,567".
pub fn fmt_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Truncate to `max` chars with a trailing ellipsis.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn counts_are_grouped() {
        assert_eq!(fmt_count(0), "0");
        assert_eq!(fmt_count(999), "999");
        assert_eq!(fmt_count(1000), "1,000");
        assert_eq!(fmt_count(1_234_567), "1,234,567");
    }

    #[test]
    fn latency_formats() {
        assert_eq!(fmt_latency(None), "─");
        assert_eq!(fmt_latency(Some(42)), "42ms");
        assert_eq!(fmt_latency(Some(12_500)), "12s");
    }

    #[test]
    fn missing_times_render_as_dash() {
        let today = Local::now().date_naive();
        assert_eq!(fmt_log_time(None, today), "─");
        assert_eq!(fmt_created(None), "─");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("/api/orders", 20), "/api/orders");
        assert_eq!(truncate("/api/orders/12345", 8), "/api/or…");
    }
}
