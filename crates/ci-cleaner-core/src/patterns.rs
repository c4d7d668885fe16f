//! Naming conventions used by CI tooling.
//!
//! Matching is plain prefix/substring/suffix comparison and case-sensitive.

pub const STACK_PREFIXES: &[&str] = &["cluster-ci-", "host-peer-ci-", "e2e-", "ci-"];

pub const BUCKET_PREFIXES: &[&str] = &["ci-last-", "ci-prev-", "ci-cur-", "ci-wip-"];
pub const BUCKET_SUBSTRINGS: &[&str] = &["g8s-ci-cur-", "g8s-ci-wip-", "g8s-ci-clop-", "-g8s-ci-"];
pub const ACCESS_LOG_BUCKET_PREFIX: &str = "ci-";
pub const ACCESS_LOG_BUCKET_SUFFIX: &str = "-g8s-access-logs";

/// Prefixes shared by resource groups, peerings, record sets and gateway
/// connections on the networking side.
pub const NETWORK_PREFIXES: &[&str] = &["ci-cur-", "ci-wip-"];

/// Prefix of delegation records created by the terraform end-to-end tests.
pub const TERRAFORM_RECORD_PREFIX: &str = "e2eterraform";

fn has_any_prefix(name: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| name.starts_with(p))
}

pub fn is_ci_stack_name(name: &str) -> bool {
    has_any_prefix(name, STACK_PREFIXES)
}

pub fn is_ci_bucket_name(name: &str) -> bool {
    has_any_prefix(name, BUCKET_PREFIXES)
        || BUCKET_SUBSTRINGS.iter().any(|s| name.contains(s))
        || is_access_log_bucket_name(name)
}

fn is_access_log_bucket_name(name: &str) -> bool {
    // "ci-*-g8s-access-logs": both affixes must fit without overlapping.
    name.len() >= ACCESS_LOG_BUCKET_PREFIX.len() + ACCESS_LOG_BUCKET_SUFFIX.len()
        && name.starts_with(ACCESS_LOG_BUCKET_PREFIX)
        && name.ends_with(ACCESS_LOG_BUCKET_SUFFIX)
}

pub fn is_ci_network_name(name: &str) -> bool {
    has_any_prefix(name, NETWORK_PREFIXES)
}

pub fn is_terraform_ci_record_name(name: &str) -> bool {
    name.starts_with(TERRAFORM_RECORD_PREFIX)
}
