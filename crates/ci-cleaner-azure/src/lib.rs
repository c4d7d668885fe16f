mod arm;
mod delegate_dns;
mod peering;
mod provider;
mod record_set;
mod resolver;
mod resource_group;
mod vpn_connection;

pub use arm::{ArmClient, ArmCredentials};
pub use delegate_dns::DelegateDnsCleaner;
pub use peering::PeeringCleaner;
pub use provider::{
    ActivityEvent, ActivityFilter, ActivityLogClient, DnsClient, DnsZone, GatewayConnectionClient,
    HostResolver, PeeringClient, PendingDeletion, ResourceGroupClient, VirtualNetworkClient,
};
pub use record_set::RecordSetCleaner;
pub use resolver::SystemResolver;
pub use resource_group::ResourceGroupCleaner;
pub use vpn_connection::GatewayConnectionCleaner;

use ci_cleaner_config::AzureSettings;
use ci_cleaner_config::constants::{PEERING_DELETE_DELAY, ROOT_DNS_ZONE_RESOURCE_GROUP};
use ci_cleaner_core::{CleanerError, Orchestrator, Result};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AzureCleanerConfig {
    pub groups: Arc<dyn ResourceGroupClient>,
    pub activity: Arc<dyn ActivityLogClient>,
    pub networks: Arc<dyn VirtualNetworkClient>,
    pub peerings: Arc<dyn PeeringClient>,
    pub dns: Arc<dyn DnsClient>,
    pub connections: Arc<dyn GatewayConnectionClient>,
    pub resolver: Arc<dyn HostResolver>,
    pub installations: Vec<String>,
    pub dns_zones: Vec<DnsZone>,
    /// Zone the terraform test clusters are delegated from.
    pub root_zone: DnsZone,
    pub peering_delete_delay: Duration,
}

impl AzureCleanerConfig {
    /// Wires every client to one ARM client. Each installation's DNS zone
    /// lives in the resource group named after the installation. Host
    /// lookups go through the system resolver.
    pub fn from_arm_client(client: ArmClient, settings: &AzureSettings) -> Self {
        let client = Arc::new(client);

        let dns_zones = settings
            .installations
            .iter()
            .map(|installation| DnsZone {
                resource_group: installation.clone(),
                name: settings.dns_zone_name(installation),
            })
            .collect();

        Self {
            groups: client.clone(),
            activity: client.clone(),
            networks: client.clone(),
            peerings: client.clone(),
            dns: client.clone(),
            connections: client,
            resolver: Arc::new(SystemResolver),
            installations: settings.installations.clone(),
            dns_zones,
            root_zone: DnsZone {
                resource_group: ROOT_DNS_ZONE_RESOURCE_GROUP.to_string(),
                name: settings.dns_base_domain.clone(),
            },
            peering_delete_delay: PEERING_DELETE_DELAY,
        }
    }
}

/// Cleaners run in order: resource groups, peerings, record sets, VPN
/// connections, terraform delegations.
pub fn new_orchestrator(config: AzureCleanerConfig) -> Result<Orchestrator> {
    if config.installations.is_empty() {
        return Err(CleanerError::InvalidConfig(
            "installations must not be empty".to_string(),
        ));
    }
    if config.installations.iter().any(|i| i.trim().is_empty()) {
        return Err(CleanerError::InvalidConfig(
            "installations must not contain empty names".to_string(),
        ));
    }

    Ok(Orchestrator::new("Azure")
        .with_cleaner(ResourceGroupCleaner::new(
            config.groups.clone(),
            config.activity,
        ))
        .with_cleaner(PeeringCleaner::new(
            config.networks,
            config.peerings,
            config.groups.clone(),
            config.installations.clone(),
            config.peering_delete_delay,
        ))
        .with_cleaner(RecordSetCleaner::new(
            config.groups.clone(),
            config.dns.clone(),
            config.dns_zones,
        ))
        .with_cleaner(GatewayConnectionCleaner::new(
            config.groups,
            config.connections,
            config.installations,
        ))
        .with_cleaner(DelegateDnsCleaner::new(
            config.dns,
            config.resolver,
            config.root_zone,
        )))
}
