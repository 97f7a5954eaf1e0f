// src/services/paginate.rs

//! Cursor walking over an account's content collection.
//!
//! The walk stops when the target count is reached, a page comes back
//! empty, the provider reports no continuation, or a page fetch fails.
//! A failed page keeps what was collected and appends one placeholder
//! row for the account, so the account is never silently missing.

use crate::error::AppError;
use crate::models::{AccountInfo, ResultRow};
use crate::services::{PageItem, PlatformProvider};
use crate::utils::metrics::Normalizer;

/// Result of walking one account.
#[derive(Debug, Default)]
pub struct Walk {
    pub rows: Vec<ResultRow>,
    /// Pages fetched successfully
    pub pages: usize,
    /// Page error that ended the walk early
    pub error: Option<AppError>,
}

impl Walk {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Collect up to `account.count` rows from the provider.
pub async fn walk_account(
    provider: &dyn PlatformProvider,
    account: &AccountInfo,
    normalizer: &Normalizer,
) -> Walk {
    let target = account.count;
    let mut walk = Walk {
        rows: Vec::with_capacity(target.min(256)),
        ..Walk::default()
    };
    let mut cursor = String::new();

    while walk.rows.len() < target {
        let page = match provider
            .fetch_account_page(&account.identification, &cursor)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                log::warn!(
                    "Account page failed: account={}, page={}, error={}",
                    account.account_url,
                    walk.pages + 1,
                    e
                );
                walk.rows.push(normalizer.placeholder(&account.account_url));
                walk.error = Some(e);
                return walk;
            }
        };
        walk.pages += 1;

        if page.items.is_empty() {
            break;
        }

        for item in page.items {
            if walk.rows.len() >= target {
                break;
            }
            let row = match item {
                PageItem::Metrics(raw) => normalizer.normalize(&account.account_url, raw),
                PageItem::Pending { id, url } => hydrate(provider, normalizer, &id, &url).await,
            };
            walk.rows.push(row);
        }

        if page.next_cursor.is_empty() || !page.has_more {
            break;
        }
        if page.next_cursor == cursor {
            log::warn!(
                "Cursor did not advance for {}, stopping at {} rows",
                account.account_url,
                walk.rows.len()
            );
            break;
        }
        cursor = page.next_cursor;

        if walk.rows.len() < target {
            tokio::time::sleep(provider.page_delay()).await;
        }
    }

    log::debug!(
        "Walked {}: rows={}, pages={}",
        account.account_url,
        walk.rows.len(),
        walk.pages
    );
    walk
}

/// Fetch counters for a listed id; a failure becomes a placeholder for that item.
async fn hydrate(
    provider: &dyn PlatformProvider,
    normalizer: &Normalizer,
    id: &str,
    url: &str,
) -> ResultRow {
    match provider.fetch_single(id).await {
        Ok(raw) => normalizer.normalize(url, raw),
        Err(e) => {
            log::warn!("Item fetch failed: url={}, error={}", url, e);
            normalizer.placeholder(url)
        }
    }
}
