use crate::provider::{InstanceClient, StackClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ci_cleaner_core::{Cleaner, CleanerError, ErrorCollection, Result, Stack, classify};
use std::sync::Arc;
use tracing::{debug, error, info};

pub struct StackCleaner {
    stacks: Arc<dyn StackClient>,
    instances: Arc<dyn InstanceClient>,
}

impl StackCleaner {
    pub fn new(stacks: Arc<dyn StackClient>, instances: Arc<dyn InstanceClient>) -> Self {
        Self { stacks, instances }
    }

    async fn delete_stack(&self, stack: &Stack) -> Result<()> {
        if stack.is_tenant_stack() {
            debug!(
                "Disabling termination protection for master instances of stack {}",
                stack.name
            );
            self.disable_master_termination_protection(&stack.name)
                .await
                .map_err(|e| {
                    CleanerError::operation(
                        "disable master termination protection for stack",
                        &stack.name,
                        e,
                    )
                })?;
        }

        debug!("Disabling termination protection for stack {}", stack.name);
        self.stacks
            .disable_termination_protection(&stack.name)
            .await
            .map_err(|e| {
                CleanerError::operation("disable termination protection for stack", &stack.name, e)
            })?;

        match self.stacks.delete_stack(&stack.name).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!("Stack {} was already gone", stack.name);
                Ok(())
            }
            Err(e) => Err(CleanerError::operation("delete stack", &stack.name, e)),
        }
    }

    async fn disable_master_termination_protection(&self, stack_name: &str) -> Result<()> {
        let masters = self.instances.find_master_instances(stack_name).await?;

        if masters.is_empty() {
            debug!("Stack {} has no master instances", stack_name);
            return Ok(());
        }

        for instance in &masters {
            self.instances
                .disable_termination_protection(&instance.id)
                .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl Cleaner for StackCleaner {
    fn name(&self) -> &'static str {
        "stacks"
    }

    async fn clean(&self, now: DateTime<Utc>) -> std::result::Result<(), ErrorCollection> {
        let stacks = self
            .stacks
            .list_stacks()
            .await
            .map_err(|e| CleanerError::list("stacks", e))?;

        let mut errors = ErrorCollection::new();

        for stack in &stacks {
            if !classify::stack_should_be_deleted(stack, now) {
                debug!("Keeping stack {} ({})", stack.name, stack.status);
                continue;
            }

            info!("Found that stack {} should be deleted", stack.name);

            match self.delete_stack(stack).await {
                Ok(()) => info!("Deleted stack {}", stack.name),
                Err(e) => {
                    error!("Failed deleting stack {}: {}. Skipping.", stack.name, e);
                    errors.push(e);
                }
            }
        }

        errors.into_result()
    }
}
