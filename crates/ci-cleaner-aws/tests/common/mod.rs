#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use ci_cleaner_aws::{InstanceClient, ObjectPage, ObjectStoreClient, StackClient};
use ci_cleaner_core::{Bucket, CleanerError, Instance, Result, Stack, StackStatus};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Mutex;

/// In-memory AWS account that records every call made against it.
pub struct FakeAws {
    stacks: Mutex<Vec<Stack>>,
    masters: Mutex<HashMap<String, Vec<Instance>>>,
    buckets: Mutex<Vec<Bucket>>,
    objects: Mutex<HashMap<String, BTreeSet<String>>>,
    page_size: usize,
    failures: Mutex<HashSet<String>>,
    vanished: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl Default for FakeAws {
    fn default() -> Self {
        Self {
            stacks: Mutex::default(),
            masters: Mutex::default(),
            buckets: Mutex::default(),
            objects: Mutex::default(),
            page_size: 1000,
            failures: Mutex::default(),
            vanished: Mutex::default(),
            calls: Mutex::default(),
        }
    }
}

pub fn hours_ago(now: DateTime<Utc>, hours: i64) -> Option<DateTime<Utc>> {
    Some(now - Duration::hours(hours))
}

pub fn stack(name: &str, created_at: Option<DateTime<Utc>>, outputs: &[&str]) -> Stack {
    Stack {
        name: name.to_string(),
        created_at,
        status: StackStatus::from("CREATE_COMPLETE"),
        output_keys: outputs.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn bucket(name: &str, created_at: Option<DateTime<Utc>>) -> Bucket {
    Bucket {
        name: name.to_string(),
        created_at,
    }
}

impl FakeAws {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }

    pub fn add_stack(&self, stack: Stack) {
        self.stacks.lock().unwrap().push(stack);
    }

    pub fn add_master(&self, stack_name: &str, instance_id: &str) {
        self.masters
            .lock()
            .unwrap()
            .entry(stack_name.to_string())
            .or_default()
            .push(Instance {
                id: instance_id.to_string(),
            });
    }

    pub fn add_bucket(&self, bucket: Bucket, object_count: usize) {
        let keys = (0..object_count).map(|i| format!("obj-{:05}", i)).collect();
        self.objects
            .lock()
            .unwrap()
            .insert(bucket.name.clone(), keys);
        self.buckets.lock().unwrap().push(bucket);
    }

    pub fn fail_on(&self, call: &str) {
        self.failures.lock().unwrap().insert(call.to_string());
    }

    /// Makes `call` answer "not found", as if the resource disappeared
    /// between listing and deletion.
    pub fn vanish_before_delete(&self, call: &str) {
        self.vanished.lock().unwrap().insert(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    pub fn stack_names(&self) -> Vec<String> {
        self.stacks
            .lock()
            .unwrap()
            .iter()
            .map(|s| s.name.clone())
            .collect()
    }

    pub fn bucket_names(&self) -> Vec<String> {
        self.buckets
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.name.clone())
            .collect()
    }

    fn record(&self, call: String) -> Result<()> {
        let failing = self.failures.lock().unwrap().contains(&call);
        self.calls.lock().unwrap().push(call.clone());

        if failing {
            return Err(anyhow::anyhow!("injected failure on {}", call).into());
        }
        if self.vanished.lock().unwrap().contains(&call) {
            return Err(CleanerError::not_found("resource", call));
        }
        Ok(())
    }
}

#[async_trait]
impl StackClient for FakeAws {
    async fn list_stacks(&self) -> Result<Vec<Stack>> {
        self.record("list_stacks".into())?;
        Ok(self.stacks.lock().unwrap().clone())
    }

    async fn disable_termination_protection(&self, stack_name: &str) -> Result<()> {
        self.record(format!("disable_stack_protection:{}", stack_name))
    }

    async fn delete_stack(&self, stack_name: &str) -> Result<()> {
        self.record(format!("delete_stack:{}", stack_name))?;
        self.stacks.lock().unwrap().retain(|s| s.name != stack_name);
        Ok(())
    }
}

#[async_trait]
impl InstanceClient for FakeAws {
    async fn find_master_instances(&self, stack_name: &str) -> Result<Vec<Instance>> {
        self.record(format!("find_master_instances:{}", stack_name))?;
        Ok(self
            .masters
            .lock()
            .unwrap()
            .get(stack_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn disable_termination_protection(&self, instance_id: &str) -> Result<()> {
        self.record(format!("disable_instance_protection:{}", instance_id))
    }
}

#[async_trait]
impl ObjectStoreClient for FakeAws {
    async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        self.record("list_buckets".into())?;
        Ok(self.buckets.lock().unwrap().clone())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        continuation_token: Option<&str>,
    ) -> Result<ObjectPage> {
        self.record(format!(
            "list_objects:{}:{}",
            bucket,
            continuation_token.unwrap_or("-")
        ))?;

        let objects = self.objects.lock().unwrap();
        let Some(keys) = objects.get(bucket) else {
            return Err(CleanerError::not_found("bucket", bucket));
        };

        let remaining: Vec<&String> = keys
            .iter()
            .filter(|k| continuation_token.is_none_or(|t| k.as_str() > t))
            .collect();
        let page: Vec<String> = remaining
            .iter()
            .take(self.page_size)
            .map(|k| k.to_string())
            .collect();
        let is_truncated = remaining.len() > page.len();

        Ok(ObjectPage {
            next_continuation_token: if is_truncated { page.last().cloned() } else { None },
            keys: page,
            is_truncated,
        })
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<()> {
        self.record(format!("delete_objects:{}:{}", bucket, keys.len()))?;
        if let Some(existing) = self.objects.lock().unwrap().get_mut(bucket) {
            for key in keys {
                existing.remove(key);
            }
        }
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.record(format!("delete_bucket:{}", bucket))?;

        let mut buckets = self.buckets.lock().unwrap();
        if !buckets.iter().any(|b| b.name == bucket) {
            return Err(CleanerError::not_found("bucket", bucket));
        }
        buckets.retain(|b| b.name != bucket);
        self.objects.lock().unwrap().remove(bucket);
        Ok(())
    }
}
