// src/pipeline/mod.rs

//! Job pipelines.
//!
//! - `UrlsJob`: metrics for individual content URLs
//! - `AccountsJob`: metrics for the latest content of whole accounts
//! - `JobRunner`: background submission with awaitable handles

pub mod accounts;
pub mod job;
pub mod progress;
pub mod urls;

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, Credentials};
use crate::services::ProviderRegistry;
use crate::storage::{
    ProgressTracker, SheetProgressTracker, SheetUrlSource, TableStore, UrlProvider,
};
use crate::utils::metrics::Normalizer;
use crate::utils::time::ReferenceZone;

pub use accounts::{AccountResolver, AccountsJob, AccountsOutcome};
pub use job::{JobHandle, JobKind, JobReport, JobRunner};
pub use progress::{ProgressReporter, ProgressState};
pub use urls::{UrlsJob, UrlsOutcome};

/// Everything a job needs, shared between runs.
#[derive(Clone)]
pub struct JobContext {
    pub config: Arc<Config>,
    pub registry: ProviderRegistry,
    pub store: Arc<dyn TableStore>,
    pub urls: Arc<dyn UrlProvider>,
    pub progress: Arc<dyn ProgressTracker>,
    pub normalizer: Normalizer,
}

impl JobContext {
    /// Wire the built-in providers, sheet URL discovery and sheet progress over `store`.
    pub fn new(config: Config, credentials: &Credentials, store: Arc<dyn TableStore>) -> Result<Self> {
        let registry = ProviderRegistry::from_config(&config, credentials)?;
        Ok(Self::with_registry(config, registry, store))
    }

    /// Same as [`JobContext::new`] with a caller-supplied registry.
    pub fn with_registry(config: Config, registry: ProviderRegistry, store: Arc<dyn TableStore>) -> Self {
        let zone = ReferenceZone::from_name(&config.timezone);
        let urls = SheetUrlSource::new(
            store.clone(),
            config.sheet.clone(),
            config.counts.sheet_default,
        );
        let progress = SheetProgressTracker::new(store.clone(), &config.tables.progress_table, zone);

        Self {
            config: Arc::new(config),
            registry,
            urls: Arc::new(urls),
            progress: Arc::new(progress),
            store,
            normalizer: Normalizer::new(zone),
        }
    }
}
