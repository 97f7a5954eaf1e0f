// src/pipeline/progress.rs

//! Best-effort progress reporting for one job run.

use std::sync::Arc;

use crate::storage::ProgressTracker;

/// Where a run's progress record currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    NotStarted,
    Started {
        row: usize,
        total: usize,
        processed: usize,
    },
    Finished {
        row: usize,
    },
}

/// Drives a [`ProgressTracker`] through start, updates and finish.
///
/// Tracker failures are logged and swallowed. If the start could not be
/// recorded there is no row to update, so later updates are skipped.
pub struct ProgressReporter {
    tracker: Arc<dyn ProgressTracker>,
    spreadsheet: String,
    state: ProgressState,
}

impl ProgressReporter {
    pub fn new(tracker: Arc<dyn ProgressTracker>, spreadsheet: impl Into<String>) -> Self {
        Self {
            tracker,
            spreadsheet: spreadsheet.into(),
            state: ProgressState::NotStarted,
        }
    }

    pub fn state(&self) -> ProgressState {
        self.state
    }

    /// Ensure the progress sheet and record the start of a run.
    pub async fn begin(&mut self, total: usize) {
        if let Err(e) = self.tracker.ensure_progress_sheet(&self.spreadsheet).await {
            log::error!(
                "Failed to ensure progress sheet: spreadsheet={}, error={}",
                self.spreadsheet,
                e
            );
        }

        match self.tracker.start_parsing(&self.spreadsheet, total).await {
            Ok(row) => {
                self.state = ProgressState::Started {
                    row,
                    total,
                    processed: 0,
                };
            }
            Err(e) => log::error!(
                "Error starting progress tracking: spreadsheet={}, error={}",
                self.spreadsheet,
                e
            ),
        }
    }

    /// Record how many items are done so far.
    pub async fn update(&mut self, processed: usize) {
        let ProgressState::Started { row, total, .. } = self.state else {
            log::debug!("Progress update skipped, run not started");
            return;
        };

        if let Err(e) = self
            .tracker
            .update_progress(&self.spreadsheet, row, processed)
            .await
        {
            log::error!(
                "Error updating progress: spreadsheet={}, error={}",
                self.spreadsheet,
                e
            );
        }
        self.state = ProgressState::Started {
            row,
            total,
            processed,
        };
    }

    /// Stamp the end time.
    pub async fn finish(&mut self) {
        let ProgressState::Started { row, .. } = self.state else {
            return;
        };

        if let Err(e) = self.tracker.finish_parsing(&self.spreadsheet, row).await {
            log::error!(
                "Error finishing progress tracking: spreadsheet={}, error={}",
                self.spreadsheet,
                e
            );
        }
        self.state = ProgressState::Finished { row };
    }
}
