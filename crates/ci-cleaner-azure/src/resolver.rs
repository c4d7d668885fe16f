use crate::provider::HostResolver;
use anyhow::anyhow;
use async_trait::async_trait;
use ci_cleaner_config::constants::TEMPORARY_RESOLUTION_FAILURE;
use ci_cleaner_core::Result;
use std::io;
use tokio::net::lookup_host;

/// Resolves names through the operating system resolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

/// A delegated zone whose name servers are gone fails with a temporary
/// resolution error rather than an empty answer.
fn is_unresolvable(err: &io::Error) -> bool {
    err.to_string().contains(TEMPORARY_RESOLUTION_FAILURE)
}

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolves(&self, host: &str) -> Result<bool> {
        match lookup_host((host, 0)).await {
            Ok(mut addresses) => Ok(addresses.next().is_some()),
            Err(e) if is_unresolvable(&e) => Ok(false),
            Err(e) => Err(anyhow!("failed to resolve {host}: {e}").into()),
        }
    }
}
