use crate::provider::{DnsClient, DnsZone, HostResolver};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ci_cleaner_config::constants::DELEGATION_API_HOST_PREFIX;
use ci_cleaner_core::{Cleaner, CleanerError, ErrorCollection, classify, patterns};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Removes delegations from the root DNS zone to terraform test clusters
/// whose API name no longer resolves.
pub struct DelegateDnsCleaner {
    dns: Arc<dyn DnsClient>,
    resolver: Arc<dyn HostResolver>,
    zone: DnsZone,
}

impl DelegateDnsCleaner {
    pub fn new(dns: Arc<dyn DnsClient>, resolver: Arc<dyn HostResolver>, zone: DnsZone) -> Self {
        Self {
            dns,
            resolver,
            zone,
        }
    }

    fn api_host(&self, record_set_name: &str) -> String {
        format!(
            "{}.{}.{}",
            DELEGATION_API_HOST_PREFIX, record_set_name, self.zone.name
        )
    }
}

#[async_trait]
impl Cleaner for DelegateDnsCleaner {
    fn name(&self) -> &'static str {
        "delegate_dns_records"
    }

    async fn clean(&self, _now: DateTime<Utc>) -> Result<(), ErrorCollection> {
        let record_sets = self
            .dns
            .list_record_sets(&self.zone, None)
            .await
            .map_err(|e| CleanerError::list("record sets", e))?;

        let mut errors = ErrorCollection::new();

        for record_set in &record_sets {
            if !patterns::is_terraform_ci_record_name(&record_set.name) {
                continue;
            }

            let host = self.api_host(&record_set.name);
            let resolves = match self.resolver.resolves(&host).await {
                Ok(resolves) => resolves,
                Err(e) => {
                    warn!(
                        "Keeping record set {}, unable to resolve {}: {}",
                        record_set.name, host, e
                    );
                    continue;
                }
            };

            if !classify::delegation_should_be_deleted(&record_set.name, resolves) {
                debug!("Keeping record set {}, {} still resolves", record_set.name, host);
                continue;
            }

            match self.dns.delete_record_set(&self.zone, &record_set.name).await {
                Ok(()) => info!(
                    "Deleted record set {} in zone {}",
                    record_set.name, self.zone.name
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

        errors.into_result()
    }
}
