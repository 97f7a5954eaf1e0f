// src/storage/progress.rs

//! Progress sheet layout.
//!
//! ```text
//! row 1: Начало парсинга | Всего ссылок | Обработано | Конец парсинга
//! row 2: start time      | total        | processed  | end time
//! ```
//!
//! Every run overwrites row 2.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::error::Result;
use crate::storage::{ProgressTracker, TableStore};
use crate::utils::time::{PROGRESS_TIME_FORMAT, ReferenceZone};

/// Column titles of the progress sheet.
pub const PROGRESS_HEADERS: [&str; 4] = [
    "Начало парсинга",
    "Всего ссылок",
    "Обработано",
    "Конец парсинга",
];

const HEADER_ROW: usize = 1;
const DATA_ROW: usize = 2;
const PROCESSED_COL: usize = 2;
const END_COL: usize = 3;

/// [`ProgressTracker`] writing into a dedicated sheet of a [`TableStore`].
pub struct SheetProgressTracker {
    store: Arc<dyn TableStore>,
    sheet: String,
    zone: ReferenceZone,
}

impl SheetProgressTracker {
    pub fn new(store: Arc<dyn TableStore>, sheet: impl Into<String>, zone: ReferenceZone) -> Self {
        Self {
            store,
            sheet: sheet.into(),
            zone,
        }
    }

    fn now(&self) -> String {
        self.zone.now(PROGRESS_TIME_FORMAT)
    }
}

#[async_trait]
impl ProgressTracker for SheetProgressTracker {
    async fn ensure_progress_sheet(&self, spreadsheet: &str) -> Result<()> {
        if self.store.has_sheet(spreadsheet, &self.sheet).await? {
            return Ok(());
        }

        self.store.add_sheet(spreadsheet, &self.sheet).await?;
        let headers = PROGRESS_HEADERS.iter().map(|h| json!(h)).collect();
        self.store
            .write_row(spreadsheet, &self.sheet, HEADER_ROW, 0, headers)
            .await
    }

    async fn start_parsing(&self, spreadsheet: &str, total: usize) -> Result<usize> {
        let values = vec![json!(self.now()), json!(total), json!(0), json!("")];
        self.store
            .write_row(spreadsheet, &self.sheet, DATA_ROW, 0, values)
            .await?;
        Ok(DATA_ROW)
    }

    async fn update_progress(&self, spreadsheet: &str, row: usize, processed: usize) -> Result<()> {
        self.store
            .write_row(spreadsheet, &self.sheet, row, PROCESSED_COL, vec![json!(processed)])
            .await
    }

    async fn finish_parsing(&self, spreadsheet: &str, row: usize) -> Result<()> {
        self.store
            .write_row(spreadsheet, &self.sheet, row, END_COL, vec![json!(self.now())])
            .await
    }
}
