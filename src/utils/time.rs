// src/utils/time.rs

//! Reference time zone for every date the crawler writes.

use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::Tz;

/// Publish/parsing date format, `DD.MM.YYYY HH:MM`.
pub const ROW_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Progress sheet timestamp format.
pub const PROGRESS_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Named IANA zone, or the host's local zone when the name is unknown.
#[derive(Debug, Clone, Copy)]
pub enum ReferenceZone {
    Named(Tz),
    Local,
}

impl ReferenceZone {
    /// Resolve a zone name, falling back to the local zone with a warning.
    pub fn from_name(name: &str) -> Self {
        match name.parse::<Tz>() {
            Ok(tz) => Self::Named(tz),
            Err(_) => {
                log::warn!("Unknown time zone '{}', using local time", name);
                Self::Local
            }
        }
    }

    /// Format a UTC instant in this zone.
    pub fn format(&self, at: DateTime<Utc>, fmt: &str) -> String {
        match self {
            Self::Named(tz) => at.with_timezone(tz).format(fmt).to_string(),
            Self::Local => at.with_timezone(&Local).format(fmt).to_string(),
        }
    }

    /// Format unix seconds; `None` when the timestamp is out of range.
    pub fn format_unix(&self, secs: i64, fmt: &str) -> Option<String> {
        Utc.timestamp_opt(secs, 0)
            .single()
            .map(|at| self.format(at, fmt))
    }

    /// Current time in this zone.
    pub fn now(&self, fmt: &str) -> String {
        self.format(Utc::now(), fmt)
    }
}

impl Default for ReferenceZone {
    fn default() -> Self {
        Self::Named(chrono_tz::Europe::Moscow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moscow_offset() {
        let zone = ReferenceZone::from_name("Europe/Moscow");
        // 2024-01-01 00:00:00 UTC
        assert_eq!(
            zone.format_unix(1_704_067_200, ROW_DATE_FORMAT).unwrap(),
            "01.01.2024 03:00"
        );
    }

    #[test]
    fn test_unknown_zone_falls_back() {
        assert!(matches!(
            ReferenceZone::from_name("Nowhere/Special"),
            ReferenceZone::Local
        ));
    }

    #[test]
    fn test_progress_format() {
        let zone = ReferenceZone::from_name("UTC");
        assert_eq!(
            zone.format_unix(0, PROGRESS_TIME_FORMAT).unwrap(),
            "1970-01-01 00:00:00"
        );
    }
}
