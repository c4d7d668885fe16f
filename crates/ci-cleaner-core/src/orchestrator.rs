use crate::error::{CleanerError, ErrorCollection};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// One resource kind's list-classify-delete pass.
#[async_trait]
pub trait Cleaner: Send + Sync {
    /// Tag used in logs and in the run's error report.
    fn name(&self) -> &'static str;

    /// Processes every resource of this kind. Per-resource failures do not
    /// stop the pass; they are returned together once it finishes.
    async fn clean(&self, now: DateTime<Utc>) -> Result<(), ErrorCollection>;
}

pub struct Orchestrator {
    provider: &'static str,
    cleaners: Vec<Box<dyn Cleaner>>,
}

impl Orchestrator {
    pub fn new(provider: &'static str) -> Self {
        Self {
            provider,
            cleaners: Vec::new(),
        }
    }

    pub fn with_cleaner(mut self, cleaner: impl Cleaner + 'static) -> Self {
        self.cleaners.push(Box::new(cleaner));
        self
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn cleaner_names(&self) -> Vec<&'static str> {
        self.cleaners.iter().map(|c| c.name()).collect()
    }

    pub async fn clean(&self) -> Result<(), ErrorCollection> {
        self.clean_at(Utc::now()).await
    }

    /// Runs every cleaner in registration order, even after failures.
    pub async fn clean_at(&self, now: DateTime<Utc>) -> Result<(), ErrorCollection> {
        info!("Starting {} CI cleanup", self.provider);

        let mut errors = ErrorCollection::new();

        for cleaner in &self.cleaners {
            info!(cleaner = cleaner.name(), "Running cleaner {}", cleaner.name());

            if let Err(e) = cleaner.clean(now).await {
                error!(
                    cleaner = cleaner.name(),
                    "Cleaner {} failed: {}",
                    cleaner.name(),
                    e
                );
                errors.push(CleanerError::Cleaner {
                    cleaner: cleaner.name(),
                    errors: e,
                });
            }
        }

        info!(
            "Finished {} CI cleanup with {} failed cleaner(s)",
            self.provider,
            errors.len()
        );

        errors.into_result()
    }
}
