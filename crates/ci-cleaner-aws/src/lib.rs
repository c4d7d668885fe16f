mod buckets;
mod provider;
mod sdk;
mod stacks;

pub use buckets::BucketCleaner;
pub use provider::{InstanceClient, ObjectPage, ObjectStoreClient, StackClient};
pub use sdk::{
    AwsCredentials, CloudFormationStacks, Ec2Instances, S3ObjectStore, load_sdk_config,
};
pub use stacks::StackCleaner;

use aws_config::SdkConfig;
use ci_cleaner_core::Orchestrator;
use std::sync::Arc;

#[derive(Clone)]
pub struct AwsCleanerConfig {
    pub stacks: Arc<dyn StackClient>,
    pub instances: Arc<dyn InstanceClient>,
    pub object_store: Arc<dyn ObjectStoreClient>,
}

impl AwsCleanerConfig {
    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self {
            stacks: Arc::new(CloudFormationStacks::new(config)),
            instances: Arc::new(Ec2Instances::new(config)),
            object_store: Arc::new(S3ObjectStore::new(config)),
        }
    }
}

/// Cleaners run in order: stacks, then buckets.
pub fn new_orchestrator(config: AwsCleanerConfig) -> Orchestrator {
    Orchestrator::new("AWS")
        .with_cleaner(StackCleaner::new(config.stacks, config.instances))
        .with_cleaner(BucketCleaner::new(config.object_store))
}
