use async_trait::async_trait;
use ci_cleaner_core::{Bucket, Instance, Result, Stack};

#[async_trait]
pub trait StackClient: Send + Sync {
    async fn list_stacks(&self) -> Result<Vec<Stack>>;

    async fn disable_termination_protection(&self, stack_name: &str) -> Result<()>;

    async fn delete_stack(&self, stack_name: &str) -> Result<()>;
}

#[async_trait]
pub trait InstanceClient: Send + Sync {
    /// Master instances tagged as belonging to the given stack.
    async fn find_master_instances(&self, stack_name: &str) -> Result<Vec<Instance>>;

    async fn disable_termination_protection(&self, instance_id: &str) -> Result<()>;
}

#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<Bucket>>;

    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage>;

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()>;

    async fn delete_bucket(&self, bucket: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    pub is_truncated: bool,
    pub next_continuation_token: Option<String>,
}
