use crate::provider::{
    ActivityEvent, ActivityFilter, ActivityLogClient, DnsClient, DnsZone, GatewayConnectionClient,
    PeeringClient, PendingDeletion, ResourceGroupClient, VirtualNetworkClient,
};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use azure_core::credentials::{Secret, TokenCredential};
use azure_identity::ClientSecretCredential;
use chrono::{DateTime, Utc};
use ci_cleaner_config::constants::{
    ARM_ACTIVITY_LOG_API_VERSION, ARM_DNS_API_VERSION, ARM_ENDPOINT, ARM_NETWORK_API_VERSION,
    ARM_RESOURCES_API_VERSION, ARM_SCOPE, DELETION_POLL_INTERVAL, DELETION_POLL_LIMIT,
};
use ci_cleaner_core::{
    CleanerError, GatewayConnection, NetworkPeering, RecordSet, ResourceGroup, Result,
    VirtualNetwork,
};
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const ASYNC_OPERATION: &str = "azure-asyncoperation";

#[derive(Debug, Clone)]
pub struct ArmCredentials {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub subscription_id: String,
}

/// Azure Resource Manager REST client backing every Azure provider trait.
pub struct ArmClient {
    http: Client,
    credential: Arc<dyn TokenCredential>,
    subscription_id: String,
    poll_interval: Duration,
    poll_limit: u32,
}

impl ArmClient {
    pub fn new(credentials: &ArmCredentials) -> Result<Self> {
        let credential = ClientSecretCredential::new(
            &credentials.tenant_id,
            credentials.client_id.clone(),
            Secret::new(credentials.client_secret.clone()),
            None,
        )
        .map_err(|e| anyhow!("failed to create client secret credential: {e}"))?;

        Ok(Self {
            http: Client::new(),
            credential,
            subscription_id: credentials.subscription_id.clone(),
            poll_interval: DELETION_POLL_INTERVAL,
            poll_limit: DELETION_POLL_LIMIT,
        })
    }

    fn subscription_url(&self, path: &str) -> String {
        format!(
            "{}/subscriptions/{}{}",
            ARM_ENDPOINT, self.subscription_id, path
        )
    }

    fn url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let base = self.subscription_url(path);
        Ok(Url::parse_with_params(&base, params)
            .with_context(|| format!("invalid ARM url {base}"))?)
    }

    async fn send(&self, method: Method, url: Url) -> Result<Response> {
        let token = self
            .credential
            .get_token(&[ARM_SCOPE], None)
            .await
            .map_err(|e| anyhow!("failed to get Azure token: {e}"))?;

        debug!("{} {}", method, url.path());

        let response = self
            .http
            .request(method.clone(), url.clone())
            .bearer_auth(token.token.secret())
            .send()
            .await
            .with_context(|| format!("{} {} failed", method, url.path()))?;

        Ok(response)
    }

    /// Maps 404 to a not-found error and any other failure status to an error
    /// carrying the response body.
    async fn check(response: Response, kind: &'static str, name: &str) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CleanerError::not_found(kind, name));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("ARM request for {kind} {name:?} returned {status}: {body}").into());
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        kind: &'static str,
        name: &str,
    ) -> Result<T> {
        let response = self.send(Method::GET, url).await?;
        let response = Self::check(response, kind, name).await?;
        Ok(response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode {kind} {name:?}"))?)
    }

    /// Follows `nextLink` until the listing is complete.
    async fn list_all<T: DeserializeOwned>(
        &self,
        url: Url,
        kind: &'static str,
        name: &str,
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(url);

        while let Some(url) = next {
            let page: Page<T> = self.get_json(url, kind, name).await?;
            items.extend(page.value);
            next = match page.next_link {
                Some(link) if !link.is_empty() => {
                    Some(Url::parse(&link).with_context(|| format!("invalid nextLink {link}"))?)
                }
                _ => None,
            };
        }

        Ok(items)
    }

    async fn delete(&self, url: Url, kind: &'static str, name: &str) -> Result<HeaderMap> {
        let response = self.send(Method::DELETE, url).await?;
        let response = Self::check(response, kind, name).await?;
        Ok(response.headers().clone())
    }
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupResource {
    name: String,
    created_time: Option<DateTime<Utc>>,
    properties: Option<GroupProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupProperties {
    provisioning_state: Option<String>,
}

impl From<GroupResource> for ResourceGroup {
    fn from(group: GroupResource) -> Self {
        ResourceGroup {
            name: group.name,
            created_at: group.created_time,
            provisioning_state: group.properties.and_then(|p| p.provisioning_state),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkResource {
    name: String,
    properties: Option<NetworkProperties>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkProperties {
    #[serde(default)]
    virtual_network_peerings: Vec<PeeringResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeeringResource {
    name: String,
    properties: Option<PeeringProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeeringProperties {
    peering_state: Option<String>,
}

impl From<NetworkResource> for VirtualNetwork {
    fn from(network: NetworkResource) -> Self {
        let peerings = network
            .properties
            .unwrap_or_default()
            .virtual_network_peerings
            .into_iter()
            .map(|p| NetworkPeering {
                state: p
                    .properties
                    .and_then(|props| props.peering_state)
                    .as_deref()
                    .unwrap_or_default()
                    .into(),
                name: p.name,
            })
            .collect();

        VirtualNetwork {
            name: network.name,
            peerings,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventResource {
    operation_name: Option<LocalizableString>,
    event_timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalizableString {
    value: Option<String>,
    localized_value: Option<String>,
}

impl From<EventResource> for ActivityEvent {
    fn from(event: EventResource) -> Self {
        ActivityEvent {
            operation_name: event
                .operation_name
                .and_then(|op| op.localized_value.or(op.value)),
            timestamp: event.event_timestamp,
        }
    }
}

fn network_path(installation: &str, rest: &str) -> String {
    format!("/resourceGroups/{installation}/providers/Microsoft.Network{rest}")
}

#[async_trait]
impl ResourceGroupClient for ArmClient {
    async fn list_groups(&self) -> Result<Vec<ResourceGroup>> {
        let url = self.url(
            "/resourcegroups",
            &[("api-version", ARM_RESOURCES_API_VERSION)],
        )?;
        let groups: Vec<GroupResource> = self.list_all(url, "resource groups", "").await?;
        Ok(groups.into_iter().map(Into::into).collect())
    }

    async fn get_group(&self, name: &str) -> Result<ResourceGroup> {
        let url = self.url(
            &format!("/resourcegroups/{name}"),
            &[("api-version", ARM_RESOURCES_API_VERSION)],
        )?;
        let group: GroupResource = self.get_json(url, "resource group", name).await?;
        Ok(group.into())
    }

    async fn delete_group(&self, name: &str) -> Result<PendingDeletion> {
        let url = self.url(
            &format!("/resourcegroups/{name}"),
            &[("api-version", ARM_RESOURCES_API_VERSION)],
        )?;
        let headers = self.delete(url, "resource group", name).await?;

        Ok(PendingDeletion {
            resource: name.to_string(),
            status_url: [LOCATION.as_str(), ASYNC_OPERATION]
                .into_iter()
                .find_map(|h| headers.get(h).and_then(|v| v.to_str().ok()))
                .map(str::to_string),
        })
    }

    /// Polls the operation's status url until ARM stops answering 202 and the
    /// reported status, if any, is terminal.
    async fn await_deletion(&self, pending: PendingDeletion) -> Result<()> {
        let Some(status_url) = pending.status_url else {
            return Ok(());
        };
        let url = Url::parse(&status_url)
            .with_context(|| format!("invalid deletion status url {status_url}"))?;

        for _ in 0..self.poll_limit {
            let response = self.send(Method::GET, url.clone()).await?;
            let response = Self::check(response, "resource group", &pending.resource).await?;

            if response.status() != StatusCode::ACCEPTED {
                let status = response.json::<OperationStatus>().await.ok().and_then(|s| s.status);
                match status.as_deref() {
                    None | Some("Succeeded") => return Ok(()),
                    Some(state @ ("Failed" | "Canceled")) => {
                        return Err(anyhow!(
                            "deletion of resource group {:?} ended as {state}",
                            pending.resource
                        )
                        .into());
                    }
                    Some(_) => {}
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }

        Err(CleanerError::DeletionTimeout(pending.resource))
    }
}

#[async_trait]
impl ActivityLogClient for ArmClient {
    async fn list_events(&self, filter: &ActivityFilter) -> Result<Vec<ActivityEvent>> {
        let odata = filter.to_odata();
        let url = self.url(
            "/providers/microsoft.insights/eventtypes/management/values",
            &[
                ("api-version", ARM_ACTIVITY_LOG_API_VERSION),
                ("$filter", odata.as_str()),
            ],
        )?;
        let events: Vec<EventResource> = self
            .list_all(url, "activity log events", &filter.resource_group)
            .await?;
        Ok(events.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl VirtualNetworkClient for ArmClient {
    async fn list_networks(&self, installation: &str) -> Result<Vec<VirtualNetwork>> {
        let url = self.url(
            &network_path(installation, "/virtualNetworks"),
            &[("api-version", ARM_NETWORK_API_VERSION)],
        )?;
        let networks: Vec<NetworkResource> =
            self.list_all(url, "virtual networks", installation).await?;
        Ok(networks.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl PeeringClient for ArmClient {
    async fn delete_peering(&self, installation: &str, network: &str, peering: &str) -> Result<()> {
        let url = self.url(
            &network_path(
                installation,
                &format!("/virtualNetworks/{network}/virtualNetworkPeerings/{peering}"),
            ),
            &[("api-version", ARM_NETWORK_API_VERSION)],
        )?;
        self.delete(url, "peering", peering).await?;
        Ok(())
    }
}

#[async_trait]
impl DnsClient for ArmClient {
    async fn list_record_sets(
        &self,
        zone: &DnsZone,
        suffix: Option<&str>,
    ) -> Result<Vec<RecordSet>> {
        let mut params = vec![("api-version", ARM_DNS_API_VERSION)];
        if let Some(suffix) = suffix {
            params.push(("$recordsetnamesuffix", suffix));
        }

        let url = self.url(
            &network_path(&zone.resource_group, &format!("/dnsZones/{}/NS", zone.name)),
            &params,
        )?;
        let record_sets: Vec<NamedResource> = self.list_all(url, "DNS zone", &zone.name).await?;
        Ok(record_sets
            .into_iter()
            .map(|r| RecordSet { name: r.name })
            .collect())
    }

    async fn delete_record_set(&self, zone: &DnsZone, name: &str) -> Result<()> {
        let url = self.url(
            &network_path(
                &zone.resource_group,
                &format!("/dnsZones/{}/NS/{name}", zone.name),
            ),
            &[("api-version", ARM_DNS_API_VERSION)],
        )?;
        self.delete(url, "record set", name).await?;
        Ok(())
    }
}

#[async_trait]
impl GatewayConnectionClient for ArmClient {
    async fn list_connections(&self, installation: &str) -> Result<Vec<GatewayConnection>> {
        let url = self.url(
            &network_path(installation, "/connections"),
            &[("api-version", ARM_NETWORK_API_VERSION)],
        )?;
        let connections: Vec<NamedResource> =
            self.list_all(url, "VPN connections", installation).await?;
        Ok(connections
            .into_iter()
            .map(|c| GatewayConnection { name: c.name })
            .collect())
    }

    async fn delete_connection(&self, installation: &str, name: &str) -> Result<()> {
        let url = self.url(
            &network_path(installation, &format!("/connections/{name}")),
            &[("api-version", ARM_NETWORK_API_VERSION)],
        )?;
        self.delete(url, "VPN connection", name).await?;
        Ok(())
    }
}
