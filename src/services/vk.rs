// src/services/vk.rs

//! VK clips: single clips through the official VK API, group listings
//! through the vk-scraper RapidAPI endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::{
    Config, Credentials, GroupInfoPair, ParsingType, Published, RawMetrics, UrlInfo,
    VK_ACCESS_TOKEN_ENV,
};
use crate::services::{AccountPage, PageItem, PlatformProvider, QuotaGuard, RapidClient};
use crate::utils::de::{lenient_i64, lenient_string};
use crate::utils::http::{ApiClient, build_url};
use crate::utils::url::parse_vk_clip_url;

/// `{"response": ...}` or `{"error": {...}}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: Option<T>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

#[derive(Debug, Deserialize)]
struct VideoList {
    #[serde(default)]
    count: i64,
    #[serde(default)]
    items: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    views: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    comments: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    date: i64,
    #[serde(default)]
    likes: Counter,
    #[serde(default)]
    reposts: Counter,
}

#[derive(Debug, Default, Deserialize)]
struct Counter {
    #[serde(default, deserialize_with = "lenient_i64")]
    count: i64,
}

/// `groups.getById` answers with a bare array before API 5.139 and an object after.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GroupsResponse {
    Wrapped { groups: Vec<Group> },
    Bare(Vec<Group>),
}

impl GroupsResponse {
    fn into_groups(self) -> Vec<Group> {
        match self {
            Self::Wrapped { groups } | Self::Bare(groups) => groups,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Group {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct ClipsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: ClipsData,
}

#[derive(Debug, Default, Deserialize)]
struct ClipsData {
    #[serde(default)]
    clips: Vec<Clip>,
    #[serde(default, deserialize_with = "lenient_string")]
    cursor: String,
}

#[derive(Debug, Deserialize)]
struct Clip {
    #[serde(deserialize_with = "lenient_i64")]
    id: i64,
    #[serde(deserialize_with = "lenient_i64")]
    owner_id: i64,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    views: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    comments: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    date: i64,
    #[serde(default)]
    likes: Counter,
    #[serde(default)]
    reposts: Counter,
}

impl Clip {
    fn into_metrics(self) -> RawMetrics {
        RawMetrics {
            url: Some(clip_url(self.owner_id, self.id)),
            description: self.description,
            views: self.views,
            likes: self.likes.count,
            comments: self.comments,
            shares: self.reposts.count,
            published: Published::Unix(self.date),
        }
    }
}

/// Canonical clip URL.
pub fn clip_url(owner_id: i64, clip_id: i64) -> String {
    format!("https://vk.com/clip{owner_id}_{clip_id}")
}

/// Owner id derivable from the handle alone (`123`, `club123`, `public123`).
fn numeric_group_id(handle: &str) -> Option<i64> {
    let digits = handle
        .strip_prefix("club")
        .or_else(|| handle.strip_prefix("public"))
        .unwrap_or(handle);
    digits.parse::<i64>().ok().filter(|id| *id > 0)
}

/// VK provider.
pub struct VkProvider {
    api: ApiClient,
    rapid: RapidClient,
    token: Option<String>,
    api_base: String,
    api_version: String,
    item_delay: Duration,
    page_delay: Duration,
    quota: QuotaGuard,
}

impl VkProvider {
    pub fn new(api: ApiClient, config: &Config, credentials: &Credentials) -> Self {
        Self {
            rapid: RapidClient::new(
                api.clone(),
                credentials.rapidapi_key.clone(),
                &config.endpoints.vk_clips,
            ),
            api,
            token: credentials.vk_access_token.clone(),
            api_base: config.endpoints.vk_api.clone(),
            api_version: config.endpoints.vk_api_version.clone(),
            item_delay: config.throttle.item_delay(ParsingType::VK),
            page_delay: config.throttle.page_delay(),
            quota: QuotaGuard::new(),
        }
    }

    /// Call a VK API method and unwrap its envelope.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: &[(&str, &str)]) -> Result<T> {
        let token = self
            .token
            .as_deref()
            .ok_or(AppError::MissingApiKey(VK_ACCESS_TOKEN_ENV))?;

        let mut query = params.to_vec();
        query.push(("v", self.api_version.as_str()));
        let url = build_url(&self.api_base, method, &query)?;

        let bearer = format!("Bearer {token}");
        let envelope: Envelope<T> = self
            .api
            .get_json(url, &[("Authorization", bearer.as_str())])
            .await?;

        if let Some(err) = envelope.error {
            return Err(AppError::provider(
                method,
                format!("{} ({})", err.error_msg, err.error_code),
            ));
        }
        envelope
            .response
            .ok_or_else(|| AppError::provider(method, "empty response"))
    }

    /// Resolve a group handle to its owner id, keeping the input's URL and depth.
    pub async fn group_info(&self, handle: &str, input: &UrlInfo) -> Result<GroupInfoPair> {
        let group_id = match numeric_group_id(handle) {
            Some(id) => id,
            None => {
                let response: GroupsResponse =
                    self.call("groups.getById", &[("group_id", handle)]).await?;
                response
                    .into_groups()
                    .into_iter()
                    .next()
                    .map(|group| group.id)
                    .ok_or_else(|| AppError::not_found(format!("vk group {handle}")))?
            }
        };

        log::debug!("Resolved VK group {} to owner {}", handle, -group_id);
        Ok(GroupInfoPair {
            owner_id: (-group_id).to_string(),
            group_url: input.url.clone(),
            count: input.count,
        })
    }
}

#[async_trait]
impl PlatformProvider for VkProvider {
    fn parsing_type(&self) -> ParsingType {
        ParsingType::VK
    }

    fn item_delay(&self) -> Duration {
        self.item_delay
    }

    fn page_delay(&self) -> Duration {
        self.page_delay
    }

    fn quota(&self) -> &QuotaGuard {
        &self.quota
    }

    fn item_id(&self, url: &str) -> Result<String> {
        let (owner_id, clip_id) = parse_vk_clip_url(url)?;
        Ok(format!("{owner_id}_{clip_id}"))
    }

    async fn fetch_single(&self, id: &str) -> Result<RawMetrics> {
        let list: VideoList = self.call("video.get", &[("videos", id)]).await?;

        let video = match list.items.into_iter().next() {
            Some(video) if list.count > 0 => video,
            _ => return Err(AppError::not_found(format!("vk clip {id}"))),
        };

        let description = if video.description.is_empty() {
            video.title
        } else {
            video.description
        };

        Ok(RawMetrics {
            url: None,
            description,
            views: video.views,
            likes: video.likes.count,
            comments: video.comments,
            shares: video.reposts.count,
            published: Published::Unix(video.date),
        })
    }

    /// Groups resolve to a negative owner id.
    async fn resolve_account(&self, handle: &str, input: &UrlInfo) -> Result<String> {
        Ok(self.group_info(handle, input).await?.owner_id)
    }

    async fn fetch_account_page(&self, account_id: &str, cursor: &str) -> Result<AccountPage> {
        let owner = format!("chplk:{account_id}");
        let mut params = vec![("owner_id", owner.as_str())];
        if !cursor.is_empty() {
            params.push(("cursor", cursor));
        }

        let response: ClipsResponse = self.rapid.get("/users/clips", &params).await?;
        if !response.status.eq_ignore_ascii_case("ok") {
            return Err(AppError::provider(
                account_id,
                format!("API error: {}", response.message),
            ));
        }

        let data = response.data;
        Ok(AccountPage {
            items: data
                .clips
                .into_iter()
                .map(|clip| PageItem::Metrics(clip.into_metrics()))
                .collect(),
            has_more: !data.cursor.is_empty(),
            next_cursor: data.cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_group_id() {
        assert_eq!(numeric_group_id("123"), Some(123));
        assert_eq!(numeric_group_id("club73430300"), Some(73_430_300));
        assert_eq!(numeric_group_id("public5"), Some(5));
        assert_eq!(numeric_group_id("durov"), None);
        assert_eq!(numeric_group_id("club"), None);
    }

    #[test]
    fn test_decode_groups_both_shapes() {
        let wrapped: GroupsResponse =
            serde_json::from_str(r#"{"groups": [{"id": 42}], "profiles": []}"#).unwrap();
        assert_eq!(wrapped.into_groups()[0].id, 42);

        let bare: GroupsResponse = serde_json::from_str(r#"[{"id": 7}]"#).unwrap();
        assert_eq!(bare.into_groups()[0].id, 7);
    }

    #[test]
    fn test_decode_clip_listing() {
        let json = r#"{
            "status": "ok",
            "data": {
                "clips": [{
                    "id": 456240003,
                    "owner_id": -73430300,
                    "description": "clip",
                    "views": 1000,
                    "reposts": {"count": 3},
                    "likes": {"count": 50},
                    "comments": 4,
                    "date": 1704067200
                }],
                "cursor": "next"
            }
        }"#;

        let response: ClipsResponse = serde_json::from_str(json).unwrap();
        let raw = response.data.clips.into_iter().next().unwrap().into_metrics();
        assert_eq!(
            raw.url.as_deref(),
            Some("https://vk.com/clip-73430300_456240003")
        );
        assert_eq!(raw.shares, 3);
        assert_eq!(raw.likes, 50);
    }

    #[test]
    fn test_decode_error_envelope() {
        let envelope: Envelope<VideoList> = serde_json::from_str(
            r#"{"error": {"error_code": 5, "error_msg": "User authorization failed"}}"#,
        )
        .unwrap();
        assert!(envelope.response.is_none());
        assert_eq!(envelope.error.unwrap().error_code, 5);
    }
}
