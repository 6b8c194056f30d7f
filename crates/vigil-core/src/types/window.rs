//! History window bounds.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::VigilError;

static DURATION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d+)\s*(second|minute|hour|day|week)s?\s*$")
        .expect("duration pattern is valid")
});

/// How much of an author's history to consider.
///
/// On the wire this is either an integer (`50`) or a duration string
/// (`"7 days"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowRepr", into = "WindowRepr")]
pub enum ActivityWindow {
    /// The most recent N activities.
    Count(usize),
    /// Activities created within this span of now.
    Duration(Duration),
}

impl fmt::Display for ActivityWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{} items", n),
            Self::Duration(d) => {
                let secs = d.num_seconds();
                let (n, unit) = [(604_800, "week"), (86_400, "day"), (3_600, "hour"), (60, "minute")]
                    .into_iter()
                    .find(|(size, _)| secs != 0 && secs % size == 0)
                    .map(|(size, unit)| (secs / size, unit))
                    .unwrap_or((secs, "second"));
                write!(f, "{} {}{}", n, unit, if n == 1 { "" } else { "s" })
            }
        }
    }
}

impl FromStr for ActivityWindow {
    type Err = VigilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(n) = s.trim().parse::<usize>() {
            return Ok(Self::Count(n));
        }
        let caps = DURATION_PATTERN.captures(s).ok_or_else(|| {
            VigilError::configuration(format!(
                "Invalid window '{}': expected a count or '<n> <seconds|minutes|hours|days|weeks>'",
                s
            ))
        })?;
        let n: i64 = caps[1]
            .parse()
            .map_err(|_| VigilError::configuration(format!("Window value out of range: '{}'", s)))?;
        let d = match caps[2].to_lowercase().as_str() {
            "second" => Duration::try_seconds(n),
            "minute" => Duration::try_minutes(n),
            "hour" => Duration::try_hours(n),
            "day" => Duration::try_days(n),
            _ => Duration::try_weeks(n),
        }
        .ok_or_else(|| VigilError::configuration(format!("Window value out of range: '{}'", s)))?;
        Ok(Self::Duration(d))
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WindowRepr {
    Count(usize),
    Text(String),
}

impl TryFrom<WindowRepr> for ActivityWindow {
    type Error = VigilError;

    fn try_from(repr: WindowRepr) -> Result<Self, Self::Error> {
        match repr {
            WindowRepr::Count(n) => Ok(Self::Count(n)),
            WindowRepr::Text(s) => s.parse(),
        }
    }
}

impl From<ActivityWindow> for WindowRepr {
    fn from(window: ActivityWindow) -> Self {
        match window {
            ActivityWindow::Count(n) => WindowRepr::Count(n),
            duration => WindowRepr::Text(duration.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_and_duration() {
        assert_eq!("25".parse::<ActivityWindow>().unwrap(), ActivityWindow::Count(25));
        assert_eq!(
            "7 days".parse::<ActivityWindow>().unwrap(),
            ActivityWindow::Duration(Duration::days(7))
        );
        assert_eq!(
            "1 Hour".parse::<ActivityWindow>().unwrap(),
            ActivityWindow::Duration(Duration::hours(1))
        );
        assert!("soon".parse::<ActivityWindow>().is_err());
    }

    #[test]
    fn test_window_serde() {
        let w: ActivityWindow = serde_json::from_str("50").unwrap();
        assert_eq!(w, ActivityWindow::Count(50));

        let w: ActivityWindow = serde_json::from_str("\"2 weeks\"").unwrap();
        assert_eq!(w, ActivityWindow::Duration(Duration::weeks(2)));
        assert_eq!(serde_json::to_string(&w).unwrap(), "\"2 weeks\"");

        assert!(serde_json::from_str::<ActivityWindow>("\"fortnight\"").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ActivityWindow::Count(3).to_string(), "3 items");
        assert_eq!(ActivityWindow::Duration(Duration::hours(48)).to_string(), "2 days");
        assert_eq!(ActivityWindow::Duration(Duration::seconds(90)).to_string(), "90 seconds");
    }
}
