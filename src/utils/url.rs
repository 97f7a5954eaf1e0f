// src/utils/url.rs

//! URL classification and platform identifier extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, Result};
use crate::models::ParsingType;

/// Account URL patterns, tried in this order.
static ACCOUNT_PATTERNS: LazyLock<Vec<(ParsingType, Regex)>> = LazyLock::new(|| {
    [
        (
            ParsingType::Instagram,
            r"(?:https?://)?(?:www\.)?instagram\.com/([^/?#]+)",
        ),
        (ParsingType::VK, r"(?:https?://)?(?:www\.)?vk\.(?:com|ru)/([^/?#]+)"),
        (ParsingType::Telegram, r"(?:https?://)?t\.me/([^/?#]+)"),
        (
            ParsingType::YouTube,
            r"(?:https?://)?(?:www\.)?youtube\.com/(?:c/|channel/|@)?([^/?#]+)",
        ),
        (
            ParsingType::TikTok,
            r"(?:https?://)?(?:www\.)?tiktok\.com/@([^/?#]+)",
        ),
    ]
    .into_iter()
    .filter_map(|(kind, pattern)| Regex::new(pattern).ok().map(|re| (kind, re)))
    .collect()
});

static VK_CLIP: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"clip(-?\d+)_(\d+)").ok());

static TIKTOK_VIDEO: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?(?:www\.)?(?:vm\.)?tiktok\.com/(?:@[^/]+/video/|)([a-zA-Z0-9]+)/?")
        .ok()
});

/// Account handle with the platform it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub identifier: String,
    pub parsing_type: ParsingType,
}

/// Classify an account URL and extract its handle.
///
/// # Examples
/// ```
/// use crawler::models::ParsingType;
/// use crawler::utils::url::classify;
///
/// let c = classify("https://www.tiktok.com/@someone").unwrap();
/// assert_eq!(c.parsing_type, ParsingType::TikTok);
/// assert_eq!(c.identifier, "someone");
/// ```
pub fn classify(url: &str) -> Result<Classification> {
    ACCOUNT_PATTERNS
        .iter()
        .find_map(|(kind, re)| {
            re.captures(url)
                .and_then(|caps| caps.get(1))
                .map(|m| Classification {
                    identifier: m.as_str().to_string(),
                    parsing_type: *kind,
                })
        })
        .ok_or_else(|| AppError::classification(url))
}

/// Extract `(owner_id, clip_id)` from a VK clip URL. Owner ids of groups are negative.
pub fn parse_vk_clip_url(url: &str) -> Result<(i64, i64)> {
    let caps = VK_CLIP
        .as_ref()
        .and_then(|re| re.captures(url))
        .ok_or_else(|| AppError::classification(url))?;

    let owner = caps[1]
        .parse::<i64>()
        .map_err(|_| AppError::classification(url))?;
    let clip = caps[2]
        .parse::<i64>()
        .map_err(|_| AppError::classification(url))?;
    Ok((owner, clip))
}

/// Extract the video id from a canonical or short TikTok URL.
pub fn extract_tiktok_video_id(url: &str) -> Result<String> {
    TIKTOK_VIDEO
        .as_ref()
        .and_then(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| AppError::classification(url))
}

/// Extract the video id from a YouTube shorts URL.
pub fn extract_youtube_shorts_id(url: &str) -> Result<String> {
    let (_, rest) = url
        .split_once("/shorts/")
        .ok_or_else(|| AppError::classification(url))?;

    let id = rest.split('?').next().unwrap_or_default();
    let id = id.split('#').next().unwrap_or_default().trim_end_matches('/');

    if id.is_empty() {
        return Err(AppError::classification(url));
    }
    Ok(id.to_string())
}

/// Host component of a base URL, used for RapidAPI host headers.
pub fn host_of(base: &str) -> Option<String> {
    url::Url::parse(base)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
