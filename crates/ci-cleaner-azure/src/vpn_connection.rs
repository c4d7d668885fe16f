use crate::provider::{GatewayConnectionClient, ResourceGroupClient};
use crate::resource_group::ci_group_names;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ci_cleaner_core::{Cleaner, CleanerError, ErrorCollection, classify};
use std::sync::Arc;
use tracing::{error, info};

pub struct GatewayConnectionCleaner {
    groups: Arc<dyn ResourceGroupClient>,
    connections: Arc<dyn GatewayConnectionClient>,
    installations: Vec<String>,
}

impl GatewayConnectionCleaner {
    pub fn new(
        groups: Arc<dyn ResourceGroupClient>,
        connections: Arc<dyn GatewayConnectionClient>,
        installations: Vec<String>,
    ) -> Self {
        Self {
            groups,
            connections,
            installations,
        }
    }
}

#[async_trait]
impl Cleaner for GatewayConnectionCleaner {
    fn name(&self) -> &'static str {
        "vpn_connections"
    }

    async fn clean(&self, _now: DateTime<Utc>) -> Result<(), ErrorCollection> {
        let ci_groups = ci_group_names(self.groups.as_ref())
            .await
            .map_err(|e| CleanerError::list("resource groups", e))?;

        let mut errors = ErrorCollection::new();

        for installation in &self.installations {
            let connections = match self.connections.list_connections(installation).await {
                Ok(connections) => connections,
                Err(e) => {
                    error!(
                        "Failed to list VPN connections of installation {}: {}",
                        installation, e
                    );
                    errors.push(CleanerError::list("VPN connections", e));
                    continue;
                }
            };

            for connection in &connections {
                if !classify::connection_should_be_deleted(&connection.name, &ci_groups) {
                    continue;
                }

                match self
                    .connections
                    .delete_connection(installation, &connection.name)
                    .await
                {
                    Ok(()) => info!(
                        "Deleted VPN connection {} of installation {}",
                        connection.name, installation
                    ),
                    Err(e) if e.is_not_found() => {}
                    Err(e) => {
                        error!("Failed to delete VPN connection {}: {}", connection.name, e);
                        errors.push(CleanerError::operation(
                            "delete VPN connection",
                            &connection.name,
                            e,
                        ));
                    }
                }
            }
        }

        errors.into_result()
    }
}
