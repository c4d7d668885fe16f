//! Deletion eligibility rules.
//!
//! Stacks, buckets and resource groups are judged on age, status and name:
//!
//! 1. no creation time: malformed, eligible
//! 2. younger than the grace period: kept
//! 3. deletion already underway: kept
//! 4. name matches a CI pattern: eligible
//! 5. anything else: kept
//!
//! Peerings, record sets and gateway connections carry no usable creation
//! time and are judged on orphanhood instead. Terraform delegation records
//! are judged on whether their cluster API still resolves.

use crate::patterns;
use crate::resource::{Bucket, NetworkPeering, PeeringState, ResourceGroup, Stack};
use chrono::{DateTime, Duration, Utc};
use ci_cleaner_config::constants;
use std::collections::HashSet;

pub fn grace_period() -> Duration {
    Duration::minutes(constants::GRACE_PERIOD_MINUTES)
}

fn aged_resource_should_be_deleted(
    created_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    deleting: bool,
    name_matches: bool,
) -> bool {
    let Some(created_at) = created_at else {
        return true;
    };

    if now - created_at < grace_period() {
        return false;
    }

    if deleting {
        return false;
    }

    name_matches
}

pub fn stack_should_be_deleted(stack: &Stack, now: DateTime<Utc>) -> bool {
    aged_resource_should_be_deleted(
        stack.created_at,
        now,
        stack.status.is_deleting(),
        patterns::is_ci_stack_name(&stack.name),
    )
}

pub fn bucket_should_be_deleted(bucket: &Bucket, now: DateTime<Utc>) -> bool {
    aged_resource_should_be_deleted(
        bucket.created_at,
        now,
        false,
        patterns::is_ci_bucket_name(&bucket.name),
    )
}

/// Activity-log liveness is checked separately by the resource group cleaner.
pub fn group_should_be_deleted(group: &ResourceGroup, now: DateTime<Utc>) -> bool {
    aged_resource_should_be_deleted(
        group.created_at,
        now,
        group.is_deleting(),
        patterns::is_ci_network_name(&group.name),
    )
}

/// A peering must be CI-named, disconnected, and its resource group gone.
pub fn peering_should_be_deleted(peering: &NetworkPeering, group_exists: bool) -> bool {
    patterns::is_ci_network_name(&peering.name)
        && !group_exists
        && peering.state == PeeringState::Disconnected
}

pub fn record_set_should_be_deleted(record_set_name: &str, ci_groups: &HashSet<String>) -> bool {
    if !patterns::is_ci_network_name(record_set_name) {
        return false;
    }

    let group_name = record_set_name
        .strip_suffix(constants::RECORD_SET_NAME_SUFFIX)
        .unwrap_or(record_set_name);

    !ci_groups.contains(group_name)
}

pub fn connection_should_be_deleted(connection_name: &str, ci_groups: &HashSet<String>) -> bool {
    patterns::is_ci_network_name(connection_name) && !ci_groups.contains(connection_name)
}

/// A terraform delegation record is stale once its API host stops resolving.
pub fn delegation_should_be_deleted(record_set_name: &str, api_resolves: bool) -> bool {
    patterns::is_terraform_ci_record_name(record_set_name) && !api_resolves
}
