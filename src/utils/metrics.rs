// src/utils/metrics.rs

//! Derived engagement metrics and row normalization.

use crate::models::{Published, RawMetrics, ResultRow};
use crate::utils::time::{ROW_DATE_FORMAT, ReferenceZone};

/// Text used for undefined percentages.
const UNDEFINED: &str = "0";

/// Publish date of a row whose fetch failed.
pub const UNKNOWN_PUBLISH_DATE: &str = "unknown";

/// Engagement rate `(likes + shares + comments) / views * 100`.
///
/// # Examples
/// ```
/// use crawler::utils::metrics::engagement_rate;
///
/// assert_eq!(engagement_rate(3891, 7043, 18, 173_514), "6.31%");
/// assert_eq!(engagement_rate(10, 0, 0, 0), "0");
/// ```
pub fn engagement_rate(likes: i64, shares: i64, comments: i64, views: i64) -> String {
    let interactions = likes.saturating_add(shares).saturating_add(comments);
    if interactions <= 0 || views <= 0 {
        return UNDEFINED.to_string();
    }
    percent(interactions, views)
}

/// Virality `shares / views * 100`.
pub fn virality(shares: i64, views: i64) -> String {
    if shares <= 0 || views <= 0 {
        return UNDEFINED.to_string();
    }
    percent(shares, views)
}

fn percent(part: i64, whole: i64) -> String {
    format!("{:.2}%", part as f64 / whole as f64 * 100.0)
}

/// Turns provider counters into canonical rows, stamping dates in the reference zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    zone: ReferenceZone,
}

impl Normalizer {
    pub fn new(zone: ReferenceZone) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> ReferenceZone {
        self.zone
    }

    /// Build a row for `url`; the provider's own URL wins when it knows one.
    pub fn normalize(&self, url: &str, raw: RawMetrics) -> ResultRow {
        let publish_date = match raw.published {
            Published::Unix(secs) => self.format_unix(secs),
            Published::Text(text) => text,
            Published::Unknown => UNKNOWN_PUBLISH_DATE.to_string(),
        };

        ResultRow {
            url: raw.url.unwrap_or_else(|| url.to_string()),
            er: engagement_rate(raw.likes, raw.shares, raw.comments, raw.views),
            virality: virality(raw.shares, raw.views),
            description: raw.description,
            views: raw.views,
            likes: raw.likes,
            comments: raw.comments,
            shares: raw.shares,
            parsing_date: self.parsing_date(),
            publish_date,
        }
    }

    /// Zero-metric row standing in for a failed fetch.
    pub fn placeholder(&self, url: &str) -> ResultRow {
        ResultRow {
            url: url.to_string(),
            description: String::new(),
            views: 0,
            likes: 0,
            comments: 0,
            shares: 0,
            er: UNDEFINED.to_string(),
            virality: UNDEFINED.to_string(),
            parsing_date: self.parsing_date(),
            publish_date: UNKNOWN_PUBLISH_DATE.to_string(),
        }
    }

    /// `DD.MM.YYYY HH:MM`; non-positive timestamps render empty.
    pub fn format_unix(&self, secs: i64) -> String {
        if secs <= 0 {
            return String::new();
        }
        self.zone
            .format_unix(secs, ROW_DATE_FORMAT)
            .unwrap_or_default()
    }

    pub fn parsing_date(&self) -> String {
        self.zone.now(ROW_DATE_FORMAT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engagement_rate() {
        assert_eq!(engagement_rate(3891, 7043, 18, 173_514), "6.31%");
        assert_eq!(engagement_rate(0, 0, 0, 100), "0");
        assert_eq!(engagement_rate(5, 5, 5, -1), "0");
    }

    #[test]
    fn test_engagement_rate_huge_counters() {
        assert_eq!(engagement_rate(i64::MAX, 1, 1, i64::MAX), "100.00%");
        assert!(engagement_rate(i64::MAX, 1, 0, 100).ends_with('%'));
    }

    #[test]
    fn test_virality() {
        assert_eq!(virality(7043, 173_514), "4.06%");
        assert_eq!(virality(0, 100), "0");
        assert_eq!(virality(10, 0), "0");
    }

    #[test]
    fn test_zero_views_always_undefined() {
        for (likes, shares, comments) in [(1, 0, 0), (0, 1, 0), (100, 100, 100)] {
            assert_eq!(engagement_rate(likes, shares, comments, 0), "0");
            assert_eq!(virality(shares, 0), "0");
        }
    }

    #[test]
    fn test_normalize_uses_provider_url() {
        let normalizer = Normalizer::new(ReferenceZone::from_name("UTC"));
        let raw = RawMetrics {
            url: Some("https://www.instagram.com/reel/abc/".into()),
            description: "hi".into(),
            views: 200,
            likes: 10,
            comments: 5,
            shares: 5,
            published: Published::Unix(1_704_067_200),
        };

        let row = normalizer.normalize("https://www.instagram.com/someone", raw);
        assert_eq!(row.url, "https://www.instagram.com/reel/abc/");
        assert_eq!(row.er, "10.00%");
        assert_eq!(row.virality, "2.50%");
        assert_eq!(row.publish_date, "01.01.2024 00:00");
        assert!(!row.is_placeholder());
    }

    #[test]
    fn test_normalize_text_and_empty_dates() {
        let normalizer = Normalizer::default();
        let raw = RawMetrics {
            published: Published::Text("2024-05-01".into()),
            ..RawMetrics::default()
        };
        assert_eq!(normalizer.normalize("u", raw).publish_date, "2024-05-01");

        let raw = RawMetrics {
            published: Published::Unix(0),
            ..RawMetrics::default()
        };
        assert_eq!(normalizer.normalize("u", raw).publish_date, "");
    }

    #[test]
    fn test_placeholder_shape() {
        let row = Normalizer::default().placeholder("https://vk.com/clip-1_2");
        assert_eq!(row.url, "https://vk.com/clip-1_2");
        assert_eq!(row.views, 0);
        assert_eq!(row.er, "0");
        assert_eq!(row.virality, "0");
        assert_eq!(row.publish_date, "unknown");
        assert!(!row.parsing_date.is_empty());
        assert!(row.is_placeholder());
    }
}
