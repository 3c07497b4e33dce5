//! Human-readable renderings shared by the next-event summary and the CLI.

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::model::Countdown;

/// `HH:MM` in the instant's own offset.
pub fn format_time<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.format("%H:%M").to_string()
}

/// e.g. `Friday 21 June`
pub fn format_date(date: &NaiveDate) -> String {
    date.format("%A %-d %B").to_string()
}

impl Countdown {
    /// Whole hours and minutes from `now` until `target`, truncated.
    pub fn until<A: TimeZone, B: TimeZone>(now: &DateTime<A>, target: &DateTime<B>) -> Self {
        let diff_ms = target.timestamp_millis() - now.timestamp_millis();
        if diff_ms <= 0 {
            return Countdown::Past;
        }

        let total_minutes = diff_ms / 60_000;
        Countdown::Remaining { hours: total_minutes / 60, minutes: total_minutes % 60 }
    }
}

impl std::fmt::Display for Countdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Countdown::Remaining { hours, minutes } if *hours > 0 => {
                write!(f, "{hours}h {minutes}m")
            }
            Countdown::Remaining { minutes, .. } => write!(f, "{minutes}m"),
            Countdown::Past => f.write_str("Past"),
        }
    }
}
