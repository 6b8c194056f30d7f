//! Relative time phrases ("3 days", "a few seconds") for window descriptions.

use chrono::Duration;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;
const MONTH: f64 = 30.4 * DAY;
const YEAR: f64 = 365.0 * DAY;

/// Describe a span of time in words, ignoring its sign.
///
/// The span is rounded to each unit before it is compared with that unit's
/// bounds, so 21.6 hours reads "a day" rather than "22 hours".
pub fn humanize(span: Duration) -> String {
    let secs = (span.num_milliseconds() as f64 / 1000.0).abs();
    let rounded = |unit: f64| (secs / unit).round() as i64;

    let seconds = rounded(1.0);
    if seconds <= 44 {
        return "a few seconds".to_string();
    }
    if seconds <= 89 {
        return "a minute".to_string();
    }

    let minutes = rounded(MINUTE);
    if minutes <= 44 {
        return format!("{} minutes", minutes);
    }
    if minutes <= 89 {
        return "an hour".to_string();
    }

    let hours = rounded(HOUR);
    if hours <= 21 {
        return format!("{} hours", hours);
    }
    if hours <= 35 {
        return "a day".to_string();
    }

    let days = rounded(DAY);
    if days <= 25 {
        return format!("{} days", days);
    }
    if days <= 45 {
        return "a month".to_string();
    }

    let months = rounded(MONTH);
    if months <= 10 {
        return format!("{} months", months);
    }
    if months <= 17 {
        return "a year".to_string();
    }

    format!("{} years", rounded(YEAR))
}
