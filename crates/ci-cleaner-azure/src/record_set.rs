use crate::provider::{DnsClient, DnsZone, ResourceGroupClient};
use crate::resource_group::ci_group_names;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ci_cleaner_config::constants::RECORD_SET_NAME_SUFFIX;
use ci_cleaner_core::{Cleaner, CleanerError, ErrorCollection, classify};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Removes delegation record sets whose CI resource group no longer exists.
pub struct RecordSetCleaner {
    groups: Arc<dyn ResourceGroupClient>,
    dns: Arc<dyn DnsClient>,
    zones: Vec<DnsZone>,
}

impl RecordSetCleaner {
    pub fn new(
        groups: Arc<dyn ResourceGroupClient>,
        dns: Arc<dyn DnsClient>,
        zones: Vec<DnsZone>,
    ) -> Self {
        Self { groups, dns, zones }
    }
}

#[async_trait]
impl Cleaner for RecordSetCleaner {
    fn name(&self) -> &'static str {
        "dns_record_sets"
    }

    async fn clean(&self, _now: DateTime<Utc>) -> Result<(), ErrorCollection> {
        let ci_groups = ci_group_names(self.groups.as_ref())
            .await
            .map_err(|e| CleanerError::list("resource groups", e))?;

        let mut errors = ErrorCollection::new();

        for zone in &self.zones {
            let record_sets = match self
                .dns
                .list_record_sets(zone, Some(RECORD_SET_NAME_SUFFIX))
                .await
            {
                Ok(record_sets) => record_sets,
                Err(e) => {
                    error!("Failed to list record sets of zone {}: {}", zone.name, e);
                    errors.push(CleanerError::list("record sets", e));
                    continue;
                }
            };

            for record_set in &record_sets {
                if !classify::record_set_should_be_deleted(&record_set.name, &ci_groups) {
                    continue;
                }

                debug!("Deleting record set {} in zone {}", record_set.name, zone.name);

                match self.dns.delete_record_set(zone, &record_set.name).await {
                    Ok(()) => info!(
                        "Deleted record set {} in zone {}",
                        record_set.name, zone.name
                    ),
                    Err(e) if e.is_not_found() => {}
                    Err(e) => {
                        error!("Failed to delete record set {}: {}", record_set.name, e);
                        errors.push(CleanerError::operation(
                            "delete record set",
                            &record_set.name,
                            e,
                        ));
                    }
                }
            }
        }

        errors.into_result()
    }
}
