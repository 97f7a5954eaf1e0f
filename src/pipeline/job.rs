// src/pipeline/job.rs

//! Background job submission.
//!
//! Jobs run on their own tokio task, one at a time. Submitting returns a
//! [`JobHandle`] right away; awaiting it is optional and a dropped handle
//! leaves the job running with its failure only logged.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::models::AccountRow;
use crate::pipeline::{AccountsJob, AccountsOutcome, JobContext, UrlsJob, UrlsOutcome};

/// Kind of a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Urls,
    Accounts,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Urls => write!(f, "urls"),
            JobKind::Accounts => write!(f, "accounts"),
        }
    }
}

/// Result of a finished job.
#[derive(Debug)]
pub enum JobReport {
    Urls(UrlsOutcome),
    Accounts(AccountsOutcome),
}

/// Awaitable handle to a submitted job.
pub struct JobHandle {
    kind: JobKind,
    task: JoinHandle<Result<JobReport>>,
}

impl JobHandle {
    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the job to finish.
    pub async fn wait(self) -> Result<JobReport> {
        self.task
            .await
            .map_err(|e| AppError::Job(format!("{} job aborted: {}", self.kind, e)))?
    }
}

/// Runs jobs against a shared [`JobContext`].
#[derive(Clone)]
pub struct JobRunner {
    ctx: Arc<JobContext>,
    permits: Arc<Semaphore>,
}

impl JobRunner {
    pub fn new(ctx: JobContext) -> Self {
        Self {
            ctx: Arc::new(ctx),
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    pub fn context(&self) -> &JobContext {
        &self.ctx
    }

    /// Queue a URL job for `sheet` of `spreadsheet`.
    pub fn submit_urls(&self, is_selected: bool, sheet: &str, spreadsheet: &str) -> JobHandle {
        let (sheet, spreadsheet) = (sheet.to_string(), spreadsheet.to_string());
        self.spawn(JobKind::Urls, move |ctx| async move {
            UrlsJob::new(&ctx)
                .execute(is_selected, &sheet, &spreadsheet)
                .await
                .map(JobReport::Urls)
        })
    }

    /// Queue an account job for `sheet` of `spreadsheet`.
    pub fn submit_accounts(&self, is_selected: bool, sheet: &str, spreadsheet: &str) -> JobHandle {
        let (sheet, spreadsheet) = (sheet.to_string(), spreadsheet.to_string());
        self.spawn(JobKind::Accounts, move |ctx| async move {
            AccountsJob::new(&ctx)
                .execute(is_selected, &sheet, &spreadsheet)
                .await
                .map(JobReport::Accounts)
        })
    }

    /// Collect one account and return its rows directly.
    pub async fn parse_account(&self, url: &str) -> Result<Vec<AccountRow>> {
        AccountsJob::new(&self.ctx).parse_account(url).await
    }

    fn spawn<F, Fut>(&self, kind: JobKind, job: F) -> JobHandle
    where
        F: FnOnce(Arc<JobContext>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<JobReport>> + Send + 'static,
    {
        let ctx = Arc::clone(&self.ctx);
        let permits = Arc::clone(&self.permits);

        let task = tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| AppError::Job(format!("job queue closed: {e}")))?;

            log::debug!("Job started: kind={}", kind);
            let result = job(ctx).await;
            if let Err(e) = &result {
                log::error!("Job failed: kind={}, error={}", kind, e);
            }
            result
        });

        JobHandle { kind, task }
    }
}
