// src/services/youtube.rs

//! YouTube shorts through yt-api on RapidAPI.
//!
//! Channel listings only carry video ids, so every listed short is
//! hydrated with a separate `/video/info` call.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Config, Credentials, ParsingType, Published, RawMetrics};
use crate::services::{AccountPage, PageItem, PlatformProvider, QuotaGuard, RapidClient};
use crate::utils::de::lenient_i64;
use crate::utils::http::ApiClient;
use crate::utils::url::extract_youtube_shorts_id;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoInfo {
    #[serde(default)]
    video_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    like_count: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    view_count: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    comment_count: i64,
    #[serde(default)]
    published_date: String,
    #[serde(default)]
    publish_date: String,
    #[serde(default)]
    error: Option<String>,
}

impl VideoInfo {
    fn into_metrics(self) -> RawMetrics {
        let published = if self.published_date.is_empty() {
            self.publish_date
        } else {
            self.published_date
        };

        RawMetrics {
            url: None,
            description: format!("{}.{}", self.title, self.description),
            views: self.view_count,
            likes: self.like_count,
            comments: self.comment_count,
            // not exposed by the endpoint
            shares: 0,
            published: Published::Text(published),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChannelShorts {
    #[serde(default)]
    continuation: String,
    #[serde(default)]
    data: Vec<ChannelEntry>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelEntry {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    video_id: String,
}

/// Canonical shorts URL.
pub fn shorts_url(id: &str) -> String {
    format!("https://www.youtube.com/shorts/{id}")
}

/// Channel ids (`UC…`) are queried by id, everything else by username.
fn channel_param(account_id: &str) -> &'static str {
    if account_id.starts_with("UC") && account_id.len() == 24 {
        "id"
    } else {
        "forUsername"
    }
}

/// YouTube provider.
pub struct YouTubeProvider {
    rapid: RapidClient,
    item_delay: Duration,
    page_delay: Duration,
    quota: QuotaGuard,
}

impl YouTubeProvider {
    pub fn new(api: ApiClient, config: &Config, credentials: &Credentials) -> Self {
        Self {
            rapid: RapidClient::new(
                api,
                credentials.rapidapi_key.clone(),
                &config.endpoints.youtube,
            ),
            item_delay: config.throttle.item_delay(ParsingType::YouTube),
            page_delay: config.throttle.page_delay(),
            quota: QuotaGuard::new(),
        }
    }
}

#[async_trait]
impl PlatformProvider for YouTubeProvider {
    fn parsing_type(&self) -> ParsingType {
        ParsingType::YouTube
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
        extract_youtube_shorts_id(url)
    }

    async fn fetch_single(&self, id: &str) -> Result<RawMetrics> {
        let info: VideoInfo = self.rapid.get("/video/info", &[("id", id)]).await?;

        if let Some(message) = info.error.as_deref() {
            return Err(AppError::provider(id, message));
        }
        if info.video_id.is_empty() && info.title.is_empty() {
            return Err(AppError::not_found(format!("youtube video {id}")));
        }
        Ok(info.into_metrics())
    }

    async fn fetch_account_page(&self, account_id: &str, cursor: &str) -> Result<AccountPage> {
        let mut params = vec![(channel_param(account_id), account_id)];
        if !cursor.is_empty() {
            params.push(("token", cursor));
        }

        let listing: ChannelShorts = self.rapid.get("/channel/shorts", &params).await?;
        if let Some(message) = listing.error.as_deref() {
            return Err(AppError::provider(account_id, message));
        }

        let items = listing
            .data
            .into_iter()
            .filter(|entry| entry.kind == "shorts" && !entry.video_id.is_empty())
            .map(|entry| PageItem::Pending {
                url: shorts_url(&entry.video_id),
                id: entry.video_id,
            })
            .collect();

        Ok(AccountPage {
            items,
            has_more: !listing.continuation.is_empty(),
            next_cursor: listing.continuation,
        })
    }
}
