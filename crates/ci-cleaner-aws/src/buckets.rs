use crate::provider::ObjectStoreClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ci_cleaner_config::constants;
use ci_cleaner_core::{Cleaner, CleanerError, ErrorCollection, Result, classify};
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct BucketCleaner {
    store: Arc<dyn ObjectStoreClient>,
    batch_size: usize,
}

impl BucketCleaner {
    pub fn new(store: Arc<dyn ObjectStoreClient>) -> Self {
        Self {
            store,
            batch_size: constants::MAX_OBJECTS_PER_DELETE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Result<Self> {
        if batch_size == 0 || batch_size > constants::MAX_OBJECTS_PER_DELETE {
            return Err(CleanerError::InvalidConfig(format!(
                "bucket batch size must be between 1 and {}, got {}",
                constants::MAX_OBJECTS_PER_DELETE,
                batch_size
            )));
        }
        self.batch_size = batch_size;
        Ok(self)
    }

    /// Deletes every object in the bucket, one listing page at a time.
    async fn drain_bucket(&self, bucket: &str) -> Result<usize> {
        let mut continuation_token: Option<String> = None;
        let mut deleted = 0;

        loop {
            let page = self
                .store
                .list_objects(bucket, continuation_token.as_deref())
                .await
                .map_err(|e| CleanerError::operation("list objects of bucket", bucket, e))?;

            for batch in page.keys.chunks(self.batch_size) {
                self.store
                    .delete_objects(bucket, batch)
                    .await
                    .map_err(|e| CleanerError::operation("delete objects of bucket", bucket, e))?;
                deleted += batch.len();
            }

            if !page.is_truncated {
                break;
            }

            // A truncated page without a token lists from the start again,
            // which only makes progress if this page deleted something.
            if page.next_continuation_token.is_none() && page.keys.is_empty() {
                break;
            }
            continuation_token = page.next_continuation_token;
        }

        Ok(deleted)
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        let deleted = self.drain_bucket(bucket).await?;
        debug!("Deleted {} objects from bucket {}", deleted, bucket);

        match self.store.delete_bucket(bucket).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!("Bucket {} was already gone", bucket);
                Ok(())
            }
            Err(e) => Err(CleanerError::operation("delete bucket", bucket, e)),
        }
    }
}

#[async_trait]
impl Cleaner for BucketCleaner {
    fn name(&self) -> &'static str {
        "buckets"
    }

    async fn clean(&self, now: DateTime<Utc>) -> std::result::Result<(), ErrorCollection> {
        let buckets = self
            .store
            .list_buckets()
            .await
            .map_err(|e| CleanerError::list("buckets", e))?;

        let mut errors = ErrorCollection::new();

        for bucket in &buckets {
            if !classify::bucket_should_be_deleted(bucket, now) {
                debug!("Keeping bucket {}", bucket.name);
                continue;
            }

            debug!("Found that bucket {} should be deleted", bucket.name);

            match self.delete_bucket(&bucket.name).await {
                Ok(()) => info!("Deleted bucket {}", bucket.name),
                Err(e) => {
                    error!("Failed deleting bucket {}: {}", bucket.name, e);
                    errors.push(e);
                }
            }
        }

        errors.into_result()
    }
}
