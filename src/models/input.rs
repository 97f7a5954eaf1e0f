// src/models/input.rs

//! Job input items.

use serde::{Deserialize, Serialize};

use crate::models::ParsingType;

/// Upper bound for any requested depth.
pub const MAX_COUNT: usize = 10_000;

/// One input row: a content or account URL with the requested depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlInfo {
    pub url: String,

    /// Requested number of items; `<= 0` means "use the call-site default"
    #[serde(default)]
    pub count: i64,
}

impl UrlInfo {
    pub fn new(url: impl Into<String>, count: i64) -> Self {
        Self {
            url: url.into(),
            count,
        }
    }
}

/// Account input resolved against its platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Platform-specific account id (handle, owner id, channel id)
    pub identification: String,
    pub parsing_type: ParsingType,
    pub account_url: String,
    /// Clamped target count
    pub count: usize,
}

impl AccountInfo {
    /// Build from an input row, clamping the requested depth.
    pub fn new(
        identification: impl Into<String>,
        parsing_type: ParsingType,
        input: &UrlInfo,
        default_count: usize,
    ) -> Self {
        Self {
            identification: identification.into(),
            parsing_type,
            account_url: input.url.clone(),
            count: clamp_count(input.count, default_count),
        }
    }
}

/// VK group handle resolved to its (negative) owner id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfoPair {
    pub owner_id: String,
    pub group_url: String,
    pub count: i64,
}

/// Clamp a requested depth into `[1, MAX_COUNT]`.
///
/// # Examples
/// ```
/// use crawler::models::clamp_count;
///
/// assert_eq!(clamp_count(0, 12), 12);
/// assert_eq!(clamp_count(50_000, 12), 10_000);
/// assert_eq!(clamp_count(5, 12), 5);
/// ```
pub fn clamp_count(requested: i64, default_count: usize) -> usize {
    if requested <= 0 {
        return default_count.clamp(1, MAX_COUNT);
    }
    usize::try_from(requested).map_or(MAX_COUNT, |n| n.min(MAX_COUNT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_count_defaults() {
        assert_eq!(clamp_count(0, 12), 12);
        assert_eq!(clamp_count(-3, 20), 20);
    }

    #[test]
    fn test_clamp_count_bounds() {
        assert_eq!(clamp_count(50_000, 12), MAX_COUNT);
        assert_eq!(clamp_count(i64::MAX, 12), MAX_COUNT);
        assert_eq!(clamp_count(5, 12), 5);
        assert_eq!(clamp_count(1, 12), 1);
    }

    #[test]
    fn test_account_info_from_input() {
        let input = UrlInfo::new("https://vk.com/club1", 0);
        let info = AccountInfo::new("-1", ParsingType::VK, &input, 12);
        assert_eq!(info.count, 12);
        assert_eq!(info.account_url, "https://vk.com/club1");
        assert_eq!(info.identification, "-1");
    }
}
