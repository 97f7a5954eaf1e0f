// src/services/mod.rs

//! Platform providers and the algorithms shared between them.
//!
//! This module contains:
//! - The `PlatformProvider` seam, one implementation per platform
//! - `ProviderRegistry` mapping platforms to providers
//! - The pagination walker driving account listings

mod instagram;
pub mod paginate;
mod rapid;
mod registry;
mod tiktok;
mod vk;
mod youtube;

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::error::{AppError, Result};
use crate::models::{ParsingType, RawMetrics, UrlInfo};

pub use instagram::InstagramProvider;
pub use paginate::{Walk, walk_account};
pub use rapid::RapidClient;
pub use registry::ProviderRegistry;
pub use tiktok::TikTokProvider;
pub use vk::VkProvider;
pub use youtube::YouTubeProvider;

/// One entry of an account listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageItem {
    /// Listing already carried the counters
    Metrics(RawMetrics),
    /// Listing only carried an id; counters come from `fetch_single`
    Pending { id: String, url: String },
}

/// One page of an account's content collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPage {
    pub items: Vec<PageItem>,
    /// Opaque continuation; empty when the provider gave none
    pub next_cursor: String,
    pub has_more: bool,
}

/// Serializes calls against one provider's upstream quota.
#[derive(Debug)]
pub struct QuotaGuard {
    permits: Semaphore,
}

impl QuotaGuard {
    pub fn new() -> Self {
        Self {
            permits: Semaphore::new(1),
        }
    }

    /// Wait until this provider is free.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.permits
            .acquire()
            .await
            .map_err(|e| AppError::Job(format!("quota guard closed: {e}")))
    }
}

impl Default for QuotaGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// A single platform's fetch capabilities.
#[async_trait]
pub trait PlatformProvider: Send + Sync {
    fn parsing_type(&self) -> ParsingType;

    /// Delay before each single-item fetch.
    fn item_delay(&self) -> Duration;

    /// Delay between account pages.
    fn page_delay(&self) -> Duration;

    fn quota(&self) -> &QuotaGuard;

    /// Identifier to pass to [`fetch_single`](Self::fetch_single) for a content URL.
    fn item_id(&self, url: &str) -> Result<String>;

    /// Fetch counters for one content item.
    async fn fetch_single(&self, id: &str) -> Result<RawMetrics>;

    /// Turn a classified account handle into the id the listing endpoint expects.
    /// `input` is the account row the handle was classified from.
    async fn resolve_account(&self, handle: &str, _input: &UrlInfo) -> Result<String> {
        Ok(handle.to_string())
    }

    /// Fetch one page of an account's content. An empty cursor asks for the first page.
    async fn fetch_account_page(&self, account_id: &str, cursor: &str) -> Result<AccountPage>;
}
