// src/pipeline/urls.rs

//! Content URL job.
//!
//! Inputs are processed in fixed-size batches; progress is reported after
//! every batch and all rows are written to the data table in one call at
//! the end. A failed fetch yields a placeholder row, an unsupported URL is
//! skipped.

use std::time::Instant;

use crate::error::Result;
use crate::models::{ParsingType, ResultRow, UrlInfo};
use crate::pipeline::{JobContext, ProgressReporter};
use crate::utils::chunk_ranges;

/// Summary of a URL job run.
#[derive(Debug, Default)]
pub struct UrlsOutcome {
    pub rows: Vec<ResultRow>,
    /// Inputs visited
    pub processed: usize,
    /// Inputs with no provider
    pub skipped: usize,
    /// Rows standing in for failed fetches
    pub placeholders: usize,
    /// Whether the rows reached the data table
    pub written: bool,
}

/// Fetches metrics for individual content URLs.
pub struct UrlsJob<'a> {
    ctx: &'a JobContext,
}

impl<'a> UrlsJob<'a> {
    pub fn new(ctx: &'a JobContext) -> Self {
        Self { ctx }
    }

    /// Discover URLs in `sheet`, fetch them, write the rows to the data table.
    pub async fn execute(&self, is_selected: bool, sheet: &str, spreadsheet: &str) -> Result<UrlsOutcome> {
        let start = Instant::now();
        log::info!("Urls job started: spreadsheet={}, sheet={}", spreadsheet, sheet);

        let platforms = self.ctx.registry.platforms();
        let items = self
            .ctx
            .urls
            .find_urls(is_selected, &platforms, sheet, spreadsheet)
            .await
            .inspect_err(|e| {
                log::error!(
                    "Failed to find urls: spreadsheet={}, sheet={}, error={}",
                    spreadsheet,
                    sheet,
                    e
                )
            })?;

        if items.is_empty() {
            log::warn!("No urls for parsing: spreadsheet={}, sheet={}", spreadsheet, sheet);
            return Ok(UrlsOutcome::default());
        }

        let mut reporter = ProgressReporter::new(self.ctx.progress.clone(), spreadsheet);
        reporter.begin(items.len()).await;

        let mut outcome = self
            .run(&items, self.ctx.config.counts.batch_size, &mut reporter)
            .await;

        let table = &self.ctx.config.tables.data_table;
        let cells = outcome.rows.iter().map(ResultRow::to_cells).collect();
        match self.ctx.store.insert_data(spreadsheet, table, cells).await {
            Ok(()) => outcome.written = true,
            Err(e) => log::error!(
                "Failed to write rows: spreadsheet={}, table={}, error={}",
                spreadsheet,
                table,
                e
            ),
        }

        reporter.finish().await;

        log::info!(
            "Urls job finished in {:.1}s: rows={}, placeholders={}, skipped={}",
            start.elapsed().as_secs_f64(),
            outcome.rows.len(),
            outcome.placeholders,
            outcome.skipped
        );
        Ok(outcome)
    }

    /// Process `items` in batches of `batch_size`, reporting progress after each batch.
    pub async fn run(
        &self,
        items: &[UrlInfo],
        batch_size: usize,
        reporter: &mut ProgressReporter,
    ) -> UrlsOutcome {
        let mut outcome = UrlsOutcome {
            rows: Vec::with_capacity(items.len()),
            ..UrlsOutcome::default()
        };

        for (start, end) in chunk_ranges(items.len(), batch_size) {
            for item in &items[start..end] {
                match self.process_item(item).await {
                    Some(row) => {
                        if row.is_placeholder() {
                            outcome.placeholders += 1;
                        }
                        outcome.rows.push(row);
                    }
                    None => outcome.skipped += 1,
                }
            }

            outcome.processed = end;
            reporter.update(outcome.processed).await;
            log::debug!("Batch done: {}/{}", end, items.len());
        }

        outcome
    }

    /// One input to one row; `None` when no provider handles the URL.
    async fn process_item(&self, item: &UrlInfo) -> Option<ResultRow> {
        let parsing_type = ParsingType::from_url(&item.url);
        let Some(provider) = self.ctx.registry.get(parsing_type) else {
            log::warn!("Unsupported URL type: url={}", item.url);
            return None;
        };
        let normalizer = &self.ctx.normalizer;

        tokio::time::sleep(provider.item_delay()).await;

        let id = match provider.item_id(&item.url) {
            Ok(id) => id,
            Err(e) => {
                log::error!("Invalid {} URL: url={}, error={}", parsing_type, item.url, e);
                return Some(normalizer.placeholder(&item.url));
            }
        };

        let fetched = match provider.quota().acquire().await {
            Ok(_permit) => provider.fetch_single(&id).await,
            Err(e) => Err(e),
        };

        Some(match fetched {
            Ok(raw) => normalizer.normalize(&item.url, raw),
            Err(e) => {
                let level = if e.is_configuration() {
                    log::Level::Error
                } else {
                    log::Level::Warn
                };
                log::log!(
                    level,
                    "Error fetching {} data: url={}, error={}",
                    parsing_type,
                    item.url,
                    e
                );
                normalizer.placeholder(&item.url)
            }
        })
    }
}
