use std::time::Duration;

/// Minimum age, in minutes, before a CI resource may be deleted.
pub const GRACE_PERIOD_MINUTES: i64 = 90;

pub const MAX_OBJECTS_PER_DELETE: usize = 1000;

pub const PEERING_DELETE_DELAY: Duration = Duration::from_secs(1);

pub const DEFAULT_CONFIG_PATH: &str = "ci-cleaner.toml";
pub const DEFAULT_INSTALLATIONS: &[&str] = &["ghost", "godsmack"];
pub const DEFAULT_DNS_BASE_DOMAIN: &str = "azure.gigantic.io";

pub const RECORD_SET_NAME_SUFFIX: &str = ".k8s";

/// Resource group holding the root DNS zone that terraform tests delegate from.
pub const ROOT_DNS_ZONE_RESOURCE_GROUP: &str = "root_dns_zone_rg";
pub const DELEGATION_API_HOST_PREFIX: &str = "api";
/// Resolver message for a name that has no record, as opposed to an outage.
pub const TEMPORARY_RESOLUTION_FAILURE: &str = "Temporary failure in name resolution";

pub const TENANT_STACK_OUTPUT_KEY: &str = "MasterImageID";
pub const STACK_NAME_TAG: &str = "tag:aws:cloudformation:stack-name";
pub const MASTER_NAME_TAG: &str = "tag:Name";
pub const MASTER_NAME_PATTERN: &str = "*-master";

pub const ARM_ENDPOINT: &str = "https://management.azure.com";
pub const ARM_SCOPE: &str = "https://management.azure.com/.default";
pub const ARM_RESOURCES_API_VERSION: &str = "2021-04-01";
pub const ARM_NETWORK_API_VERSION: &str = "2023-09-01";
pub const ARM_DNS_API_VERSION: &str = "2018-05-01";
pub const ARM_ACTIVITY_LOG_API_VERSION: &str = "2015-04-01";

pub const DELETION_POLL_INTERVAL: Duration = Duration::from_secs(10);
pub const DELETION_POLL_LIMIT: u32 = 180;
