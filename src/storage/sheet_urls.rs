// src/storage/sheet_urls.rs

//! Input discovery from a sheet with a keyword header row.
//!
//! The header row names the columns; the URL column is the one whose
//! header mentions both the link keyword and the job's noun ("видео" for
//! content, "аккаунт" for accounts). An optional select column holds
//! checkboxes and an optional depth column holds per-row counts.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Cell, ParsingType, SheetConfig, UrlInfo};
use crate::storage::{TableStore, UrlProvider};

/// Platforms whose accounts can be listed.
pub const ACCOUNT_PLATFORMS: [ParsingType; 4] = [
    ParsingType::Instagram,
    ParsingType::VK,
    ParsingType::YouTube,
    ParsingType::TikTok,
];

/// 0-based column positions found in the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnPositions {
    pub url: usize,
    pub select: Option<usize>,
    pub depth: Option<usize>,
}

/// Reads job inputs from sheets of a [`TableStore`].
pub struct SheetUrlSource {
    store: Arc<dyn TableStore>,
    config: SheetConfig,
    default_count: i64,
}

impl SheetUrlSource {
    pub fn new(store: Arc<dyn TableStore>, config: SheetConfig, default_count: i64) -> Self {
        Self {
            store,
            config,
            default_count,
        }
    }

    /// Locate the URL, select and depth columns.
    pub fn find_columns(&self, header: &[Cell], noun: &str) -> Result<ColumnPositions> {
        let mut url = None;
        let mut select = None;
        let mut depth = None;

        for (index, cell) in header.iter().enumerate() {
            let Some(text) = cell.as_str() else {
                continue;
            };
            let lower = text.trim().to_lowercase();

            if url.is_none() && lower.contains(&self.config.link_keyword) && lower.contains(noun) {
                url = Some(index);
            }
            if select.is_none() && lower.contains(&self.config.select_keyword) {
                select = Some(index);
            }
            if depth.is_none() && lower.contains(&self.config.depth_keyword) {
                depth = Some(index);
            }
        }

        let url = url.ok_or_else(|| {
            AppError::validation(format!(
                "failed to find url column ('{}' + '{}')",
                self.config.link_keyword, noun
            ))
        })?;
        log::info!(
            "Found columns: url={}, select={:?}, depth={:?}",
            url,
            select,
            depth
        );

        Ok(ColumnPositions { url, select, depth })
    }

    /// Read rows below the header and keep the ones matching `parsing_types`.
    async fn collect(
        &self,
        is_selected: bool,
        parsing_types: &[ParsingType],
        noun: &str,
        sheet: &str,
        spreadsheet: &str,
    ) -> Result<Vec<UrlInfo>> {
        let header_row = self.config.header_row.max(1);
        let mut rows = self
            .store
            .read_rows(spreadsheet, sheet, header_row)
            .await?
            .into_iter();

        let header = rows
            .next()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| AppError::validation(format!("header row {header_row} is empty")))?;

        let mut positions = self.find_columns(&header, noun)?;
        if !is_selected {
            positions.select = None;
        }

        let mut urls = Vec::new();
        for (offset, row) in rows.enumerate() {
            let row_number = header_row + 1 + offset;
            if let Some(info) = self.parse_row(&row, positions, row_number) {
                if ParsingType::any_matches(parsing_types, &info.url) {
                    urls.push(info);
                }
            }
        }

        log::info!("Found {} urls in '{}'", urls.len(), sheet);
        Ok(urls)
    }

    fn parse_row(&self, row: &[Cell], positions: ColumnPositions, row_number: usize) -> Option<UrlInfo> {
        let url = row.get(positions.url)?.as_str()?.trim();
        if url.is_empty() {
            return None;
        }

        if let Some(select) = positions.select {
            match parse_checkbox(row.get(select)) {
                Some(true) => {}
                Some(false) => return None,
                None => {
                    log::warn!("Invalid checkbox value in row {}", row_number);
                    return None;
                }
            }
        }

        let count = positions
            .depth
            .and_then(|depth| row.get(depth))
            .and_then(parse_depth)
            .unwrap_or(self.default_count);

        Some(UrlInfo::new(url, count))
    }
}

#[async_trait]
impl UrlProvider for SheetUrlSource {
    async fn find_urls(
        &self,
        is_selected: bool,
        parsing_types: &[ParsingType],
        sheet: &str,
        spreadsheet: &str,
    ) -> Result<Vec<UrlInfo>> {
        let noun = self.config.video_keyword.clone();
        self.collect(is_selected, parsing_types, &noun, sheet, spreadsheet)
            .await
    }

    async fn account_urls(
        &self,
        is_selected: bool,
        sheet: &str,
        spreadsheet: &str,
    ) -> Result<Vec<UrlInfo>> {
        let noun = self.config.account_keyword.clone();
        self.collect(is_selected, &ACCOUNT_PLATFORMS, &noun, sheet, spreadsheet)
            .await
    }
}

/// Interpret a checkbox cell; `None` for values that are neither checked nor unchecked.
pub fn parse_checkbox(cell: Option<&Cell>) -> Option<bool> {
    match cell {
        None | Some(Value::Null) => Some(false),
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "истина" | "да" | "yes" | "1" | "✓" | "✔" | "☑" => Some(true),
            "false" | "ложь" | "нет" | "no" | "0" | "" | "✗" | "✘" | "☐" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => match n.as_f64() {
            Some(v) if v == 1.0 => Some(true),
            Some(v) if v == 0.0 => Some(false),
            _ => None,
        },
        Some(_) => None,
    }
}

/// Depth from a numeric or textual cell.
fn parse_depth(cell: &Cell) -> Option<i64> {
    match cell {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
