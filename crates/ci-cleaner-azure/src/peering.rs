use crate::provider::{PeeringClient, ResourceGroupClient, VirtualNetworkClient};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ci_cleaner_core::{
    Cleaner, CleanerError, ErrorCollection, NetworkPeering, Result, classify, patterns,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

/// Removes peerings left on installation networks by clusters that are gone.
pub struct PeeringCleaner {
    networks: Arc<dyn VirtualNetworkClient>,
    peerings: Arc<dyn PeeringClient>,
    groups: Arc<dyn ResourceGroupClient>,
    installations: Vec<String>,
    delete_delay: Duration,
}

impl PeeringCleaner {
    pub fn new(
        networks: Arc<dyn VirtualNetworkClient>,
        peerings: Arc<dyn PeeringClient>,
        groups: Arc<dyn ResourceGroupClient>,
        installations: Vec<String>,
        delete_delay: Duration,
    ) -> Self {
        Self {
            networks,
            peerings,
            groups,
            installations,
            delete_delay,
        }
    }

    async fn group_exists(&self, name: &str) -> Result<bool> {
        match self.groups.get_group(name).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn clean_peering(
        &self,
        installation: &str,
        network: &str,
        peering: &NetworkPeering,
    ) -> Result<bool> {
        let group_exists = self.group_exists(&peering.name).await.map_err(|e| {
            CleanerError::operation("look up resource group of peering", &peering.name, e)
        })?;

        if !classify::peering_should_be_deleted(peering, group_exists) {
            debug!(
                "Keeping peering {} (group exists: {}, state: {:?})",
                peering.name, group_exists, peering.state
            );
            return Ok(false);
        }

        debug!("Deleting peering {} of network {}", peering.name, network);

        match self
            .peerings
            .delete_peering(installation, network, &peering.name)
            .await
        {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(CleanerError::operation("delete peering", &peering.name, e)),
        }
    }
}

#[async_trait]
impl Cleaner for PeeringCleaner {
    fn name(&self) -> &'static str {
        "virtual_network_peerings"
    }

    async fn clean(&self, _now: DateTime<Utc>) -> std::result::Result<(), ErrorCollection> {
        let mut errors = ErrorCollection::new();

        for installation in &self.installations {
            let networks = match self.networks.list_networks(installation).await {
                Ok(networks) => networks,
                Err(e) => {
                    error!(
                        "Failed to list virtual networks of installation {}: {}",
                        installation, e
                    );
                    errors.push(CleanerError::list("virtual networks", e));
                    continue;
                }
            };

            for network in &networks {
                for peering in &network.peerings {
                    if !patterns::is_ci_network_name(&peering.name) {
                        continue;
                    }

                    match self.clean_peering(installation, &network.name, peering).await {
                        Ok(true) => {
                            info!("Deleted peering {} of network {}", peering.name, network.name);
                            tokio::time::sleep(self.delete_delay).await;
                        }
                        Ok(false) => {}
                        Err(e) => {
                            error!("Failed to clean peering {}: {}", peering.name, e);
                            errors.push(e);
                        }
                    }
                }
            }
        }

        errors.into_result()
    }
}
