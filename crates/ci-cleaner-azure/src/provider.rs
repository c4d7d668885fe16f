use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use ci_cleaner_core::{GatewayConnection, RecordSet, ResourceGroup, Result, VirtualNetwork};

#[async_trait]
pub trait ResourceGroupClient: Send + Sync {
    async fn list_groups(&self) -> Result<Vec<ResourceGroup>>;

    /// Fails with a not-found error when the group does not exist.
    async fn get_group(&self, name: &str) -> Result<ResourceGroup>;

    async fn delete_group(&self, name: &str) -> Result<PendingDeletion>;

    async fn await_deletion(&self, pending: PendingDeletion) -> Result<()>;
}

#[async_trait]
pub trait ActivityLogClient: Send + Sync {
    async fn list_events(&self, filter: &ActivityFilter) -> Result<Vec<ActivityEvent>>;
}

#[async_trait]
pub trait VirtualNetworkClient: Send + Sync {
    /// Virtual networks of an installation, each with its peerings.
    async fn list_networks(&self, installation: &str) -> Result<Vec<VirtualNetwork>>;
}

#[async_trait]
pub trait PeeringClient: Send + Sync {
    async fn delete_peering(&self, installation: &str, network: &str, peering: &str)
    -> Result<()>;
}

#[async_trait]
pub trait DnsClient: Send + Sync {
    /// NS record sets of `zone`, optionally narrowed to names ending in `suffix`.
    async fn list_record_sets(&self, zone: &DnsZone, suffix: Option<&str>)
    -> Result<Vec<RecordSet>>;

    async fn delete_record_set(&self, zone: &DnsZone, name: &str) -> Result<()>;
}

#[async_trait]
pub trait GatewayConnectionClient: Send + Sync {
    async fn list_connections(&self, installation: &str) -> Result<Vec<GatewayConnection>>;

    async fn delete_connection(&self, installation: &str, name: &str) -> Result<()>;
}

#[async_trait]
pub trait HostResolver: Send + Sync {
    /// `Ok(false)` when the name has no address. Other lookup failures are errors.
    async fn resolves(&self, host: &str) -> Result<bool>;
}

/// Handle for a long-running deletion started by the provider.
#[derive(Debug, Clone)]
pub struct PendingDeletion {
    pub resource: String,
    pub status_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ActivityFilter {
    pub resource_group: String,
    pub since: DateTime<Utc>,
}

impl ActivityFilter {
    pub fn to_odata(&self) -> String {
        format!(
            "eventTimestamp ge '{}' and resourceGroupName eq '{}'",
            self.since.to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.resource_group
        )
    }
}

#[derive(Debug, Clone)]
pub struct ActivityEvent {
    pub operation_name: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsZone {
    pub resource_group: String,
    pub name: String,
}
