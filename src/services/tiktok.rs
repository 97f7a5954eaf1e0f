// src/services/tiktok.rs

//! TikTok videos through tiktok-scraper7 on RapidAPI.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Config, Credentials, ParsingType, Published, RawMetrics};
use crate::services::{AccountPage, PageItem, PlatformProvider, QuotaGuard, RapidClient};
use crate::utils::de::{lenient_i64, lenient_string};
use crate::utils::http::ApiClient;
use crate::utils::url::extract_tiktok_video_id;

/// Videos requested per listing page.
const PAGE_SIZE: &str = "30";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

impl<T> Envelope<T> {
    fn into_data(self, context: &str) -> Result<T> {
        if self.code != 0 {
            return Err(AppError::provider(
                context,
                format!("code {}: {}", self.code, self.msg),
            ));
        }
        self.data
            .ok_or_else(|| AppError::not_found(format!("tiktok {context}")))
    }
}

#[derive(Debug, Deserialize)]
struct Video {
    #[serde(default, deserialize_with = "lenient_string")]
    id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    video_id: String,
    #[serde(default)]
    title: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    play_count: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    digg_count: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    comment_count: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    share_count: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    create_time: i64,
}

impl Video {
    /// Single-video payloads carry `id`, listings carry `video_id`.
    fn key(&self) -> &str {
        if self.video_id.is_empty() {
            &self.id
        } else {
            &self.video_id
        }
    }

    fn into_metrics(self, url: Option<String>) -> RawMetrics {
        RawMetrics {
            url,
            description: self.title,
            views: self.play_count,
            likes: self.digg_count,
            comments: self.comment_count,
            shares: self.share_count,
            published: Published::Unix(self.create_time),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserPosts {
    #[serde(default)]
    videos: Vec<Video>,
    #[serde(default, deserialize_with = "lenient_string")]
    cursor: String,
    #[serde(default)]
    has_more: bool,
}

/// Canonical video URL.
pub fn video_url(handle: &str, id: &str) -> String {
    format!("https://www.tiktok.com/@{handle}/video/{id}")
}

/// TikTok provider.
pub struct TikTokProvider {
    rapid: RapidClient,
    item_delay: Duration,
    page_delay: Duration,
    quota: QuotaGuard,
}

impl TikTokProvider {
    pub fn new(api: ApiClient, config: &Config, credentials: &Credentials) -> Self {
        Self {
            rapid: RapidClient::new(
                api,
                credentials.rapidapi_key.clone(),
                &config.endpoints.tiktok,
            ),
            item_delay: config.throttle.item_delay(ParsingType::TikTok),
            page_delay: config.throttle.page_delay(),
            quota: QuotaGuard::new(),
        }
    }
}

#[async_trait]
impl PlatformProvider for TikTokProvider {
    fn parsing_type(&self) -> ParsingType {
        ParsingType::TikTok
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

    /// The endpoint resolves short links itself, so the URL is passed through once it
    /// is known to carry a video id.
    fn item_id(&self, url: &str) -> Result<String> {
        extract_tiktok_video_id(url)?;
        Ok(url.to_string())
    }

    async fn fetch_single(&self, id: &str) -> Result<RawMetrics> {
        let envelope: Envelope<Video> = self.rapid.get("/", &[("url", id)]).await?;
        Ok(envelope.into_data(id)?.into_metrics(None))
    }

    async fn fetch_account_page(&self, account_id: &str, cursor: &str) -> Result<AccountPage> {
        let cursor = if cursor.is_empty() { "0" } else { cursor };
        let envelope: Envelope<UserPosts> = self
            .rapid
            .get(
                "/user/posts",
                &[
                    ("unique_id", account_id),
                    ("count", PAGE_SIZE),
                    ("cursor", cursor),
                ],
            )
            .await?;
        let posts = envelope.into_data(account_id)?;

        let items = posts
            .videos
            .into_iter()
            .map(|video| {
                let url = video_url(account_id, video.key());
                PageItem::Metrics(video.into_metrics(Some(url)))
            })
            .collect();

        Ok(AccountPage {
            items,
            next_cursor: posts.cursor,
            has_more: posts.has_more,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_single_video() {
        let json = r#"{
            "code": 0,
            "msg": "success",
            "data": {
                "id": "7234567890",
                "title": "dance",
                "play_count": 1000,
                "digg_count": 100,
                "comment_count": 10,
                "share_count": 5,
                "create_time": 1704067200
            }
        }"#;

        let envelope: Envelope<Video> = serde_json::from_str(json).unwrap();
        let raw = envelope.into_data("x").unwrap().into_metrics(None);
        assert_eq!(raw.views, 1000);
        assert_eq!(raw.likes, 100);
        assert_eq!(raw.shares, 5);
        assert_eq!(raw.description, "dance");
    }

    #[test]
    fn test_error_code_is_provider_error() {
        let envelope: Envelope<Video> =
            serde_json::from_str(r#"{"code": -1, "msg": "Url parsing is failed!"}"#).unwrap();
        let err = envelope.into_data("x").unwrap_err();
        assert!(matches!(err, AppError::Provider { .. }));
    }

    #[test]
    fn test_decode_user_posts() {
        let json = r#"{
            "code": 0,
            "data": {
                "videos": [{"video_id": "1", "play_count": 5}],
                "cursor": "1704067200000",
                "hasMore": true
            }
        }"#;
        let envelope: Envelope<UserPosts> = serde_json::from_str(json).unwrap();
        let posts = envelope.into_data("u").unwrap();
        assert_eq!(posts.videos[0].key(), "1");
        assert_eq!(posts.cursor, "1704067200000");
        assert!(posts.has_more);
    }

    #[test]
    fn test_video_url() {
        assert_eq!(
            video_url("dancer", "42"),
            "https://www.tiktok.com/@dancer/video/42"
        );
    }
}
