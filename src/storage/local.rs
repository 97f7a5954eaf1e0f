// src/storage/local.rs

//! Local filesystem table store.
//!
//! Each sheet is one JSON file holding its rows. Writes go through a
//! temporary file and a rename, so a crash never leaves half a sheet.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::models::Cell;
use crate::storage::TableStore;

/// On-disk sheet document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetData {
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalTableStore {
    root_dir: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Arc<Mutex<()>>,
}

impl LocalTableStore {
    /// Create a store rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path of a sheet file.
    fn path(&self, spreadsheet: &str, sheet: &str) -> PathBuf {
        self.root_dir
            .join("sheets")
            .join(sanitize(spreadsheet))
            .join(format!("{}.json", sanitize(sheet)))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }

    /// Read a sheet, returning None if it doesn't exist.
    async fn read_sheet(&self, spreadsheet: &str, sheet: &str) -> Result<Option<SheetData>> {
        let path = self.path(spreadsheet, sheet);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn write_sheet(&self, spreadsheet: &str, sheet: &str, mut data: SheetData) -> Result<()> {
        data.updated_at = Some(Utc::now());
        let bytes = serde_json::to_vec_pretty(&data)?;
        self.write_bytes(&self.path(spreadsheet, sheet), &bytes).await
    }

    /// Replace a whole sheet (seeding inputs, tests).
    pub async fn put_rows(&self, spreadsheet: &str, sheet: &str, rows: Vec<Vec<Cell>>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_sheet(
            spreadsheet,
            sheet,
            SheetData {
                updated_at: None,
                rows,
            },
        )
        .await
    }
}

/// Keep names usable as file names inside the sheets directory.
fn sanitize(name: &str) -> String {
    if name.trim_matches('.').is_empty() {
        return "_".to_string();
    }
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect()
}

#[async_trait]
impl TableStore for LocalTableStore {
    async fn has_sheet(&self, spreadsheet: &str, sheet: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.path(spreadsheet, sheet)).await?)
    }

    async fn add_sheet(&self, spreadsheet: &str, sheet: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if self.read_sheet(spreadsheet, sheet).await?.is_some() {
            return Ok(());
        }
        log::info!("Creating sheet '{}' in {}", sheet, spreadsheet);
        self.write_sheet(spreadsheet, sheet, SheetData::default())
            .await
    }

    async fn insert_data(
        &self,
        spreadsheet: &str,
        sheet: &str,
        rows: Vec<Vec<Cell>>,
    ) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut data = self
            .read_sheet(spreadsheet, sheet)
            .await?
            .unwrap_or_default();

        let appended = rows.len();
        data.rows.extend(rows);
        self.write_sheet(spreadsheet, sheet, data).await?;

        log::debug!("Appended {} rows to '{}' in {}", appended, sheet, spreadsheet);
        Ok(())
    }

    async fn write_row(
        &self,
        spreadsheet: &str,
        sheet: &str,
        row: usize,
        start_col: usize,
        values: Vec<Cell>,
    ) -> Result<()> {
        if row == 0 {
            return Err(AppError::sink("row numbers start at 1"));
        }

        let _guard = self.write_lock.lock().await;
        let mut data = self
            .read_sheet(spreadsheet, sheet)
            .await?
            .ok_or_else(|| AppError::sink(format!("sheet '{sheet}' not found in {spreadsheet}")))?;

        if data.rows.len() < row {
            data.rows.resize_with(row, Vec::new);
        }
        let target = &mut data.rows[row - 1];
        let needed = start_col + values.len();
        if target.len() < needed {
            target.resize(needed, Cell::String(String::new()));
        }
        for (offset, value) in values.into_iter().enumerate() {
            target[start_col + offset] = value;
        }

        self.write_sheet(spreadsheet, sheet, data).await
    }

    async fn read_rows(
        &self,
        spreadsheet: &str,
        sheet: &str,
        first_row: usize,
    ) -> Result<Vec<Vec<Cell>>> {
        let data = self
            .read_sheet(spreadsheet, sheet)
            .await?
            .ok_or_else(|| AppError::sink(format!("sheet '{sheet}' not found in {spreadsheet}")))?;

        Ok(data
            .rows
            .into_iter()
            .skip(first_row.saturating_sub(1))
            .collect())
    }
}
