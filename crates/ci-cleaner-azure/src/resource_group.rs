use crate::provider::{ActivityFilter, ActivityLogClient, ResourceGroupClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ci_cleaner_core::{
    Cleaner, CleanerError, ErrorCollection, ResourceGroup, Result, classify, patterns,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Names of the CI resource groups that currently exist.
pub(crate) async fn ci_group_names(groups: &dyn ResourceGroupClient) -> Result<HashSet<String>> {
    Ok(groups
        .list_groups()
        .await?
        .into_iter()
        .map(|g| g.name)
        .filter(|name| patterns::is_ci_network_name(name))
        .collect())
}

pub struct ResourceGroupCleaner {
    groups: Arc<dyn ResourceGroupClient>,
    activity: Arc<dyn ActivityLogClient>,
}

impl ResourceGroupCleaner {
    pub fn new(groups: Arc<dyn ResourceGroupClient>, activity: Arc<dyn ActivityLogClient>) -> Self {
        Self { groups, activity }
    }

    /// Any activity-log entry since `since` counts, whatever the operation.
    async fn has_activity(&self, group: &ResourceGroup, since: DateTime<Utc>) -> Result<bool> {
        let filter = ActivityFilter {
            resource_group: group.name.clone(),
            since,
        };

        let events = self.activity.list_events(&filter).await?;
        if let Some(event) = events.first() {
            debug!(
                "Resource group {} had activity {:?} at {:?}",
                group.name, event.operation_name, event.timestamp
            );
        }

        Ok(!events.is_empty())
    }

    async fn delete_group(&self, name: &str) -> Result<()> {
        let pending = match self.groups.delete_group(name).await {
            Ok(pending) => pending,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(CleanerError::operation("delete resource group", name, e)),
        };

        match self.groups.await_deletion(pending).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(CleanerError::operation(
                "await deletion of resource group",
                name,
                e,
            )),
        }
    }
}

#[async_trait]
impl Cleaner for ResourceGroupCleaner {
    fn name(&self) -> &'static str {
        "resource_groups"
    }

    async fn clean(&self, now: DateTime<Utc>) -> std::result::Result<(), ErrorCollection> {
        let groups = self
            .groups
            .list_groups()
            .await
            .map_err(|e| CleanerError::list("resource groups", e))?;

        let since = now - classify::grace_period();
        let mut errors = ErrorCollection::new();

        for group in &groups {
            // The subscription also holds tenant groups; only CI names are candidates.
            if !patterns::is_ci_network_name(&group.name) {
                continue;
            }

            debug!("Checking resource group {}", group.name);

            if !classify::group_should_be_deleted(group, now) {
                debug!("Keeping resource group {}", group.name);
                continue;
            }

            match self.has_activity(group, since).await {
                Ok(false) => {}
                Ok(true) => {
                    debug!("Keeping resource group {} with recent activity", group.name);
                    continue;
                }
                Err(e) => {
                    error!(
                        "Failed to check activity of resource group {}: {}. Skipping.",
                        group.name, e
                    );
                    errors.push(CleanerError::operation(
                        "check activity of resource group",
                        &group.name,
                        e,
                    ));
                    continue;
                }
            }

            info!("Ensuring deletion of resource group {}", group.name);

            match self.delete_group(&group.name).await {
                Ok(()) => info!("Ensured deletion of resource group {}", group.name),
                Err(e) => {
                    error!("Did not ensure deletion of resource group {}: {}", group.name, e);
                    errors.push(e);
                }
            }
        }

        errors.into_result()
    }
}
