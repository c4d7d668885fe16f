#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use ci_cleaner_azure::{
    ActivityEvent, ActivityFilter, ActivityLogClient, AzureCleanerConfig, DnsClient, DnsZone,
    GatewayConnectionClient, HostResolver, PeeringClient, PendingDeletion, ResourceGroupClient,
    VirtualNetworkClient,
};
use ci_cleaner_core::{
    CleanerError, GatewayConnection, NetworkPeering, PeeringState, RecordSet, ResourceGroup,
    Result, VirtualNetwork,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// In-memory Azure subscription that records every call made against it.
#[derive(Default)]
pub struct FakeAzure {
    groups: Mutex<Vec<ResourceGroup>>,
    events: Mutex<HashMap<String, Vec<DateTime<Utc>>>>,
    networks: Mutex<HashMap<String, Vec<VirtualNetwork>>>,
    record_sets: Mutex<HashMap<String, Vec<String>>>,
    connections: Mutex<HashMap<String, Vec<String>>>,
    resolutions: Mutex<HashMap<String, Resolution>>,
    gone_while_awaiting: Mutex<HashSet<String>>,
    failures: Mutex<HashSet<String>>,
    vanished: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

/// Outcome of looking up a host name. Unknown hosts do not resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Resolution {
    Resolves,
    #[default]
    DoesNotResolve,
    Fails,
}

pub fn minutes_ago(now: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    now - Duration::minutes(minutes)
}

pub fn group(name: &str, created_at: Option<DateTime<Utc>>) -> ResourceGroup {
    ResourceGroup {
        name: name.to_string(),
        created_at,
        provisioning_state: Some("Succeeded".to_string()),
    }
}

pub fn peering(name: &str, state: &str) -> NetworkPeering {
    NetworkPeering {
        name: name.to_string(),
        state: PeeringState::from(state),
    }
}

pub fn zone(installation: &str) -> DnsZone {
    DnsZone {
        resource_group: installation.to_string(),
        name: format!("{}.westeurope.azure.gigantic.io", installation),
    }
}

pub fn root_zone() -> DnsZone {
    DnsZone {
        resource_group: "root_dns_zone_rg".to_string(),
        name: "azure.gigantic.io".to_string(),
    }
}

pub fn config(azure: &Arc<FakeAzure>, installations: &[&str]) -> AzureCleanerConfig {
    AzureCleanerConfig {
        groups: azure.clone(),
        activity: azure.clone(),
        networks: azure.clone(),
        peerings: azure.clone(),
        dns: azure.clone(),
        connections: azure.clone(),
        resolver: azure.clone(),
        installations: installations.iter().map(|s| s.to_string()).collect(),
        dns_zones: installations.iter().map(|i| zone(i)).collect(),
        root_zone: root_zone(),
        peering_delete_delay: std::time::Duration::ZERO,
    }
}

impl FakeAzure {
    pub fn add_group(&self, group: ResourceGroup) {
        self.groups.lock().unwrap().push(group);
    }

    pub fn add_event(&self, group: &str, at: DateTime<Utc>) {
        self.events
            .lock()
            .unwrap()
            .entry(group.to_string())
            .or_default()
            .push(at);
    }

    pub fn add_network(&self, installation: &str, name: &str, peerings: Vec<NetworkPeering>) {
        self.networks
            .lock()
            .unwrap()
            .entry(installation.to_string())
            .or_default()
            .push(VirtualNetwork {
                name: name.to_string(),
                peerings,
            });
    }

    pub fn add_record_set(&self, zone: &DnsZone, name: &str) {
        self.record_sets
            .lock()
            .unwrap()
            .entry(zone.name.clone())
            .or_default()
            .push(name.to_string());
    }

    pub fn add_connection(&self, installation: &str, name: &str) {
        self.connections
            .lock()
            .unwrap()
            .entry(installation.to_string())
            .or_default()
            .push(name.to_string());
    }

    pub fn set_resolution(&self, host: &str, resolution: Resolution) {
        self.resolutions
            .lock()
            .unwrap()
            .insert(host.to_string(), resolution);
    }

    /// Makes the deletion poll for `group` answer "not found".
    pub fn vanish_while_awaiting(&self, group: &str) {
        self.gone_while_awaiting
            .lock()
            .unwrap()
            .insert(group.to_string());
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

    pub fn group_names(&self) -> Vec<String> {
        self.groups
            .lock()
            .unwrap()
            .iter()
            .map(|g| g.name.clone())
            .collect()
    }

    pub fn peering_names(&self, installation: &str) -> Vec<String> {
        self.networks
            .lock()
            .unwrap()
            .get(installation)
            .map(|networks| {
                networks
                    .iter()
                    .flat_map(|n| n.peerings.iter().map(|p| p.name.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn record_set_names(&self, zone: &DnsZone) -> Vec<String> {
        self.record_sets
            .lock()
            .unwrap()
            .get(&zone.name)
            .cloned()
            .unwrap_or_default()
    }

    pub fn connection_names(&self, installation: &str) -> Vec<String> {
        self.connections
            .lock()
            .unwrap()
            .get(installation)
            .cloned()
            .unwrap_or_default()
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
impl ResourceGroupClient for FakeAzure {
    async fn list_groups(&self) -> Result<Vec<ResourceGroup>> {
        self.record("list_groups".into())?;
        Ok(self.groups.lock().unwrap().clone())
    }

    async fn get_group(&self, name: &str) -> Result<ResourceGroup> {
        self.record(format!("get_group:{}", name))?;
        self.groups
            .lock()
            .unwrap()
            .iter()
            .find(|g| g.name == name)
            .cloned()
            .ok_or_else(|| CleanerError::not_found("resource group", name))
    }

    async fn delete_group(&self, name: &str) -> Result<PendingDeletion> {
        self.record(format!("delete_group:{}", name))?;

        let mut groups = self.groups.lock().unwrap();
        if !groups.iter().any(|g| g.name == name) {
            return Err(CleanerError::not_found("resource group", name));
        }
        groups.retain(|g| g.name != name);

        Ok(PendingDeletion {
            resource: name.to_string(),
            status_url: Some(format!("https://status/{}", name)),
        })
    }

    async fn await_deletion(&self, pending: PendingDeletion) -> Result<()> {
        self.record(format!("await_deletion:{}", pending.resource))?;

        if self
            .gone_while_awaiting
            .lock()
            .unwrap()
            .contains(&pending.resource)
        {
            return Err(CleanerError::not_found("resource group", pending.resource));
        }
        Ok(())
    }
}

#[async_trait]
impl ActivityLogClient for FakeAzure {
    async fn list_events(&self, filter: &ActivityFilter) -> Result<Vec<ActivityEvent>> {
        self.record(format!("list_events:{}", filter.resource_group))?;

        Ok(self
            .events
            .lock()
            .unwrap()
            .get(&filter.resource_group)
            .map(|events| {
                events
                    .iter()
                    .filter(|at| **at >= filter.since)
                    .map(|at| ActivityEvent {
                        operation_name: Some("Update resource group".to_string()),
                        timestamp: Some(*at),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl VirtualNetworkClient for FakeAzure {
    async fn list_networks(&self, installation: &str) -> Result<Vec<VirtualNetwork>> {
        self.record(format!("list_networks:{}", installation))?;
        Ok(self
            .networks
            .lock()
            .unwrap()
            .get(installation)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl PeeringClient for FakeAzure {
    async fn delete_peering(&self, installation: &str, network: &str, peering: &str) -> Result<()> {
        self.record(format!("delete_peering:{}:{}:{}", installation, network, peering))?;

        if let Some(networks) = self.networks.lock().unwrap().get_mut(installation) {
            for n in networks.iter_mut().filter(|n| n.name == network) {
                n.peerings.retain(|p| p.name != peering);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl DnsClient for FakeAzure {
    async fn list_record_sets(
        &self,
        zone: &DnsZone,
        suffix: Option<&str>,
    ) -> Result<Vec<RecordSet>> {
        self.record(format!("list_record_sets:{}", zone.name))?;
        Ok(self
            .record_set_names(zone)
            .into_iter()
            .filter(|name| suffix.is_none_or(|suffix| name.ends_with(suffix)))
            .map(|name| RecordSet { name })
            .collect())
    }

    async fn delete_record_set(&self, zone: &DnsZone, name: &str) -> Result<()> {
        self.record(format!("delete_record_set:{}:{}", zone.name, name))?;

        let mut record_sets = self.record_sets.lock().unwrap();
        let Some(names) = record_sets.get_mut(&zone.name) else {
            return Err(CleanerError::not_found("DNS zone", &zone.name));
        };
        if !names.iter().any(|n| n == name) {
            return Err(CleanerError::not_found("record set", name));
        }
        names.retain(|n| n != name);
        Ok(())
    }
}

#[async_trait]
impl GatewayConnectionClient for FakeAzure {
    async fn list_connections(&self, installation: &str) -> Result<Vec<GatewayConnection>> {
        self.record(format!("list_connections:{}", installation))?;
        Ok(self
            .connection_names(installation)
            .into_iter()
            .map(|name| GatewayConnection { name })
            .collect())
    }

    async fn delete_connection(&self, installation: &str, name: &str) -> Result<()> {
        self.record(format!("delete_connection:{}:{}", installation, name))?;

        if let Some(names) = self.connections.lock().unwrap().get_mut(installation) {
            names.retain(|n| n != name);
        }
        Ok(())
    }
}

#[async_trait]
impl HostResolver for FakeAzure {
    async fn resolves(&self, host: &str) -> Result<bool> {
        self.record(format!("resolve:{}", host))?;

        let resolution = self
            .resolutions
            .lock()
            .unwrap()
            .get(host)
            .copied()
            .unwrap_or_default();
        match resolution {
            Resolution::Resolves => Ok(true),
            Resolution::DoesNotResolve => Ok(false),
            Resolution::Fails => Err(anyhow::anyhow!("lookup of {} timed out", host).into()),
        }
    }
}
