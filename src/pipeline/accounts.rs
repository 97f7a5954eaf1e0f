// src/pipeline/accounts.rs

//! Account job.
//!
//! Each account URL is classified, its handle resolved to the id the
//! platform's listing expects, and its latest content walked up to the
//! requested depth. Rows are written to the account table per account,
//! so a late failure never loses earlier accounts.

use std::collections::HashMap;
use std::time::Instant;

use crate::error::{AppError, Result};
use crate::models::{AccountInfo, AccountRow, ParsingType, UrlInfo};
use crate::pipeline::{JobContext, ProgressReporter};
use crate::services::{PlatformProvider, walk_account};
use crate::utils::url::classify;

/// Summary of an account job run.
#[derive(Debug, Default)]
pub struct AccountsOutcome {
    /// Accounts visited
    pub processed: usize,
    /// Accounts that could not be classified or have no provider
    pub skipped: usize,
    /// Accounts whose walk ended on a page error
    pub truncated: usize,
    pub rows_written: usize,
}

/// Per-run cache of resolved account ids.
#[derive(Debug, Default)]
pub struct AccountResolver {
    resolved: HashMap<(ParsingType, String), String>,
}

impl AccountResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `handle` through the provider once per run.
    pub async fn resolve(
        &mut self,
        provider: &dyn PlatformProvider,
        handle: &str,
        input: &UrlInfo,
    ) -> Result<String> {
        let key = (provider.parsing_type(), handle.to_string());
        if let Some(id) = self.resolved.get(&key) {
            return Ok(id.clone());
        }

        let id = provider.resolve_account(handle, input).await?;
        self.resolved.insert(key, id.clone());
        Ok(id)
    }
}

/// Fetches metrics for the latest content of whole accounts.
pub struct AccountsJob<'a> {
    ctx: &'a JobContext,
}

impl<'a> AccountsJob<'a> {
    pub fn new(ctx: &'a JobContext) -> Self {
        Self { ctx }
    }

    /// Discover account URLs in `sheet` and collect each account into the account table.
    pub async fn execute(
        &self,
        is_selected: bool,
        sheet: &str,
        spreadsheet: &str,
    ) -> Result<AccountsOutcome> {
        let start = Instant::now();
        log::info!("Accounts job started: spreadsheet={}, sheet={}", spreadsheet, sheet);

        let items = self
            .ctx
            .urls
            .account_urls(is_selected, sheet, spreadsheet)
            .await
            .inspect_err(|e| {
                log::error!(
                    "Failed to find account urls: spreadsheet={}, sheet={}, error={}",
                    spreadsheet,
                    sheet,
                    e
                )
            })?;

        if items.is_empty() {
            log::warn!("No accounts for parsing: spreadsheet={}, sheet={}", spreadsheet, sheet);
            return Ok(AccountsOutcome::default());
        }

        let mut reporter = ProgressReporter::new(self.ctx.progress.clone(), spreadsheet);
        reporter.begin(items.len()).await;
        let outcome = self.run(spreadsheet, &items, &mut reporter).await;
        reporter.finish().await;

        log::info!(
            "Accounts job finished in {:.1}s: accounts={}, rows={}, skipped={}, truncated={}",
            start.elapsed().as_secs_f64(),
            outcome.processed,
            outcome.rows_written,
            outcome.skipped,
            outcome.truncated
        );
        Ok(outcome)
    }

    /// Walk every account and append its rows to the account table.
    pub async fn run(
        &self,
        spreadsheet: &str,
        items: &[UrlInfo],
        reporter: &mut ProgressReporter,
    ) -> AccountsOutcome {
        let table = &self.ctx.config.tables.account_table;
        let default_count = self.ctx.config.counts.account_default;
        let mut resolver = AccountResolver::new();
        let mut outcome = AccountsOutcome::default();

        for item in items {
            match self.collect(item, default_count, &mut resolver).await {
                Ok((rows, complete)) => {
                    if !complete {
                        outcome.truncated += 1;
                    }
                    let count = rows.len();
                    let cells = rows.iter().map(AccountRow::to_cells).collect();
                    match self.ctx.store.insert_data(spreadsheet, table, cells).await {
                        Ok(()) => outcome.rows_written += count,
                        Err(e) => log::error!(
                            "Failed to write account rows: account={}, error={}",
                            item.url,
                            e
                        ),
                    }
                }
                Err(e) => {
                    log::warn!("Skipping account: url={}, error={}", item.url, e);
                    outcome.skipped += 1;
                }
            }

            outcome.processed += 1;
            reporter.update(outcome.processed).await;
        }

        outcome
    }

    /// Rows for a single account, returned instead of written.
    pub async fn parse_account(&self, url: &str) -> Result<Vec<AccountRow>> {
        let input = UrlInfo::new(url, 0);
        let default_count = self.ctx.config.counts.single_account_default;
        let (rows, _) = self
            .collect(&input, default_count, &mut AccountResolver::new())
            .await?;
        Ok(rows)
    }

    /// Classify, resolve and walk one account. The flag is false when the walk was cut short.
    async fn collect(
        &self,
        input: &UrlInfo,
        default_count: usize,
        resolver: &mut AccountResolver,
    ) -> Result<(Vec<AccountRow>, bool)> {
        let classification = classify(&input.url)?;
        let provider = self
            .ctx
            .registry
            .get(classification.parsing_type)
            .ok_or_else(|| {
                AppError::Unsupported(format!(
                    "account listing for {}",
                    classification.parsing_type
                ))
            })?;

        let account_id = resolver
            .resolve(provider.as_ref(), &classification.identifier, input)
            .await?;
        let account = AccountInfo::new(account_id, classification.parsing_type, input, default_count);
        log::info!(
            "Collecting {} account {} (id={}, count={})",
            account.parsing_type,
            account.account_url,
            account.identification,
            account.count
        );

        let walk = {
            let _permit = provider.quota().acquire().await?;
            walk_account(provider.as_ref(), &account, &self.ctx.normalizer).await
        };

        let complete = walk.is_complete();
        let rows = walk
            .rows
            .into_iter()
            .map(|row| AccountRow::new(&account.account_url, row))
            .collect();
        Ok((rows, complete))
    }
}
