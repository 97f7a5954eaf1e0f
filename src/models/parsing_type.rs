// src/models/parsing_type.rs

//! Supported source platforms.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of platforms a URL can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsingType {
    Instagram,
    #[serde(rename = "vk")]
    VK,
    #[serde(rename = "youtube")]
    YouTube,
    #[serde(rename = "tiktok")]
    TikTok,
    Telegram,
    Unknown,
}

impl ParsingType {
    /// Platform of a single content URL, by domain substring.
    ///
    /// # Examples
    /// ```
    /// use crawler::models::ParsingType;
    ///
    /// assert_eq!(ParsingType::from_url("https://VK.com/clip-1_2"), ParsingType::VK);
    /// assert_eq!(ParsingType::from_url("https://example.com"), ParsingType::Unknown);
    /// ```
    pub fn from_url(url: &str) -> Self {
        let lower = url.to_lowercase();

        if lower.contains("vk.com") || lower.contains("vk.ru") {
            return Self::VK;
        }
        if lower.contains("instagram.com") {
            return Self::Instagram;
        }
        if lower.contains("youtube.com") || lower.contains("youtu.be") {
            return Self::YouTube;
        }
        if lower.contains("tiktok.com") {
            return Self::TikTok;
        }
        if lower.contains("t.me/") {
            return Self::Telegram;
        }

        Self::Unknown
    }

    /// Short tag used in logs and for URL filtering.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::VK => "vk",
            Self::YouTube => "youtube",
            Self::TikTok => "tiktok",
            Self::Telegram => "t.me",
            Self::Unknown => "unknown",
        }
    }

    /// Whether the raw URL mentions this platform's tag.
    pub fn matches_url(&self, url: &str) -> bool {
        *self != Self::Unknown && url.to_lowercase().contains(self.as_str())
    }

    /// Whether the URL belongs to any of the given platforms.
    pub fn any_matches(types: &[ParsingType], url: &str) -> bool {
        types.iter().any(|t| t.matches_url(url))
    }
}

impl fmt::Display for ParsingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url() {
        assert_eq!(
            ParsingType::from_url("https://www.instagram.com/reel/DAbc123/"),
            ParsingType::Instagram
        );
        assert_eq!(
            ParsingType::from_url("https://vk.ru/clip-73430300_456240003"),
            ParsingType::VK
        );
        assert_eq!(
            ParsingType::from_url("https://youtube.com/shorts/5CHd6h1-Zps"),
            ParsingType::YouTube
        );
        assert_eq!(
            ParsingType::from_url("https://vm.tiktok.com/ZMabc/"),
            ParsingType::TikTok
        );
        assert_eq!(ParsingType::from_url("https://t.me/channel/12"), ParsingType::Telegram);
        assert_eq!(ParsingType::from_url(""), ParsingType::Unknown);
    }

    #[test]
    fn test_any_matches() {
        let types = [ParsingType::Instagram, ParsingType::VK];
        assert!(ParsingType::any_matches(&types, "https://vk.com/club1"));
        assert!(!ParsingType::any_matches(&types, "https://youtube.com/@someone"));
        assert!(!ParsingType::any_matches(&[ParsingType::Unknown], "unknown"));
    }
}
