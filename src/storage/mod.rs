// src/storage/mod.rs

//! Table storage abstractions.
//!
//! The crawler reads its inputs from and writes its results to a
//! spreadsheet-like store: spreadsheets contain named sheets, sheets
//! contain rows of JSON cells. Rows and columns are addressed the way
//! spreadsheet users address them, rows 1-based, columns 0-based in code.
//!
//! ## Local Layout
//!
//! ```text
//! {root}/
//! ├── config.toml              # Crawler configuration
//! └── sheets/
//!     └── {spreadsheet}/
//!         ├── Лист1.json        # Input sheet
//!         ├── Сырые данные.json # URL job output
//!         └── Прогресс.json     # Progress tracking
//! ```

pub mod local;
pub mod progress;
pub mod sheet_urls;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Cell, ParsingType, UrlInfo};

// Re-export for convenience
pub use local::LocalTableStore;
pub use progress::SheetProgressTracker;
pub use sheet_urls::SheetUrlSource;

/// Spreadsheet-like row storage.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn has_sheet(&self, spreadsheet: &str, sheet: &str) -> Result<bool>;

    /// Create an empty sheet; a no-op when it already exists.
    async fn add_sheet(&self, spreadsheet: &str, sheet: &str) -> Result<()>;

    /// Append rows after the last row of the sheet.
    async fn insert_data(&self, spreadsheet: &str, sheet: &str, rows: Vec<Vec<Cell>>)
    -> Result<()>;

    /// Overwrite cells of one row (1-based) starting at `start_col` (0-based).
    async fn write_row(
        &self,
        spreadsheet: &str,
        sheet: &str,
        row: usize,
        start_col: usize,
        values: Vec<Cell>,
    ) -> Result<()>;

    /// Every row from `first_row` (1-based) to the end of the sheet.
    async fn read_rows(&self, spreadsheet: &str, sheet: &str, first_row: usize)
    -> Result<Vec<Vec<Cell>>>;
}

/// Source of job inputs.
#[async_trait]
pub trait UrlProvider: Send + Sync {
    /// Content URLs of the given platforms, optionally only selected rows.
    async fn find_urls(
        &self,
        is_selected: bool,
        parsing_types: &[ParsingType],
        sheet: &str,
        spreadsheet: &str,
    ) -> Result<Vec<UrlInfo>>;

    /// Account URLs, optionally only selected rows.
    async fn account_urls(
        &self,
        is_selected: bool,
        sheet: &str,
        spreadsheet: &str,
    ) -> Result<Vec<UrlInfo>>;
}

/// Start/processed/finish counters for a job run.
#[async_trait]
pub trait ProgressTracker: Send + Sync {
    async fn ensure_progress_sheet(&self, spreadsheet: &str) -> Result<()>;

    /// Record the start of a run and return the row that tracks it.
    async fn start_parsing(&self, spreadsheet: &str, total: usize) -> Result<usize>;

    async fn update_progress(&self, spreadsheet: &str, row: usize, processed: usize)
    -> Result<()>;

    async fn finish_parsing(&self, spreadsheet: &str, row: usize) -> Result<()>;
}
