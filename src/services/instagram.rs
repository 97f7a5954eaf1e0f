// src/services/instagram.rs

//! Instagram reels through the real-time Instagram scraper on RapidAPI.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Config, Credentials, ParsingType, Published, RawMetrics};
use crate::services::{AccountPage, PageItem, PlatformProvider, QuotaGuard, RapidClient};
use crate::utils::de::{lenient_i64, lenient_string};
use crate::utils::http::ApiClient;

#[derive(Debug, Deserialize)]
struct MediaInfoResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: MediaInfoData,
}

#[derive(Debug, Default, Deserialize)]
struct MediaInfoData {
    #[serde(default)]
    items: Vec<Media>,
}

#[derive(Debug, Deserialize)]
struct ReelsResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: ReelsData,
}

#[derive(Debug, Default, Deserialize)]
struct ReelsData {
    #[serde(default)]
    items: Vec<ReelItem>,
    #[serde(default)]
    paging_info: PagingInfo,
}

#[derive(Debug, Default, Deserialize)]
struct PagingInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    max_id: String,
    #[serde(default)]
    more_available: bool,
}

#[derive(Debug, Deserialize)]
struct ReelItem {
    media: Media,
}

#[derive(Debug, Default, Deserialize)]
struct Media {
    #[serde(default)]
    code: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    taken_at: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    like_count: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    comment_count: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    reshare_count: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    ig_play_count: i64,
    #[serde(default)]
    caption: Option<Caption>,
}

#[derive(Debug, Default, Deserialize)]
struct Caption {
    #[serde(default)]
    text: String,
}

impl Media {
    fn into_metrics(self, url: Option<String>) -> RawMetrics {
        RawMetrics {
            url,
            description: self.caption.map(|c| c.text).unwrap_or_default(),
            views: self.ig_play_count,
            likes: self.like_count,
            comments: self.comment_count,
            shares: self.reshare_count,
            published: Published::Unix(self.taken_at),
        }
    }
}

/// Canonical reel URL for a media code.
pub fn reel_url(code: &str) -> String {
    format!("https://www.instagram.com/reel/{code}/")
}

fn check_status(context: &str, status: &str, message: &str) -> Result<()> {
    if status.is_empty() || status.eq_ignore_ascii_case("ok") {
        return Ok(());
    }
    Err(AppError::provider(context, format!("{status}: {message}")))
}

/// Instagram provider.
pub struct InstagramProvider {
    rapid: RapidClient,
    item_delay: Duration,
    page_delay: Duration,
    quota: QuotaGuard,
}

impl InstagramProvider {
    pub fn new(api: ApiClient, config: &Config, credentials: &Credentials) -> Self {
        Self {
            rapid: RapidClient::new(
                api,
                credentials.rapidapi_key.clone(),
                &config.endpoints.instagram,
            ),
            item_delay: config.throttle.item_delay(ParsingType::Instagram),
            page_delay: config.throttle.page_delay(),
            quota: QuotaGuard::new(),
        }
    }
}

#[async_trait]
impl PlatformProvider for InstagramProvider {
    fn parsing_type(&self) -> ParsingType {
        ParsingType::Instagram
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

    /// The media endpoint accepts the full post URL.
    fn item_id(&self, url: &str) -> Result<String> {
        if url.trim().is_empty() {
            return Err(AppError::classification(url));
        }
        Ok(url.to_string())
    }

    async fn fetch_single(&self, id: &str) -> Result<RawMetrics> {
        let response: MediaInfoResponse = self
            .rapid
            .get("/v1/media_info", &[("code_or_id_or_url", id)])
            .await?;
        check_status(id, &response.status, &response.message)?;

        response
            .data
            .items
            .into_iter()
            .next()
            .map(|media| media.into_metrics(None))
            .ok_or_else(|| AppError::not_found(format!("instagram media {id}")))
    }

    async fn fetch_account_page(&self, account_id: &str, cursor: &str) -> Result<AccountPage> {
        let mut params = vec![("username_or_id", account_id)];
        if !cursor.is_empty() {
            params.push(("max_id", cursor));
        }

        let response: ReelsResponse = self.rapid.get("/v1/user_reels", &params).await?;
        check_status(account_id, &response.status, &response.message)?;

        let data = response.data;
        let items = data
            .items
            .into_iter()
            .map(|item| {
                let url = reel_url(&item.media.code);
                PageItem::Metrics(item.media.into_metrics(Some(url)))
            })
            .collect();

        Ok(AccountPage {
            items,
            next_cursor: data.paging_info.max_id,
            has_more: data.paging_info.more_available,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_media_info_without_reshare() {
        let json = r#"{
            "status": "ok",
            "message": "",
            "data": {"items": [{
                "code": "DAbc",
                "taken_at": 1704067200,
                "like_count": 3891,
                "comment_count": 18,
                "ig_play_count": 173514,
                "caption": {"text": "hello"}
            }]}
        }"#;

        let response: MediaInfoResponse = serde_json::from_str(json).unwrap();
        let media = response.data.items.into_iter().next().unwrap();
        let raw = media.into_metrics(None);
        assert_eq!(raw.views, 173_514);
        assert_eq!(raw.shares, 0);
        assert_eq!(raw.description, "hello");
        assert_eq!(raw.published, Published::Unix(1_704_067_200));
    }

    #[test]
    fn test_decode_reels_page() {
        let json = r#"{
            "status": "ok",
            "data": {
                "items": [{"media": {"code": "C1", "like_count": 1, "caption": null}}],
                "paging_info": {"max_id": "QVFD", "more_available": true}
            }
        }"#;

        let response: ReelsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.paging_info.max_id, "QVFD");
        assert!(response.data.paging_info.more_available);
        assert_eq!(response.data.items[0].media.code, "C1");
    }

    #[test]
    fn test_check_status() {
        assert!(check_status("x", "ok", "").is_ok());
        assert!(check_status("x", "", "").is_ok());
        assert!(check_status("x", "error", "not found").is_err());
    }

    #[test]
    fn test_reel_url() {
        assert_eq!(reel_url("abc"), "https://www.instagram.com/reel/abc/");
    }
}
