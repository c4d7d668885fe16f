//! Read-only snapshots of the cloud resources a cleanup run looks at.

use chrono::{DateTime, Utc};
use ci_cleaner_config::constants;

#[derive(Debug, Clone)]
pub struct Stack {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub status: StackStatus,
    pub output_keys: Vec<String>,
}

impl Stack {
    /// Tenant stacks provision a master instance that carries its own
    /// termination protection.
    pub fn is_tenant_stack(&self) -> bool {
        self.output_keys
            .iter()
            .any(|k| k == constants::TENANT_STACK_OUTPUT_KEY)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StackStatus {
    DeleteInProgress,
    DeleteComplete,
    Other(String),
}

impl StackStatus {
    pub fn is_deleting(&self) -> bool {
        matches!(self, StackStatus::DeleteInProgress | StackStatus::DeleteComplete)
    }

    pub fn as_str(&self) -> &str {
        match self {
            StackStatus::DeleteInProgress => "DELETE_IN_PROGRESS",
            StackStatus::DeleteComplete => "DELETE_COMPLETE",
            StackStatus::Other(s) => s,
        }
    }
}

impl From<&str> for StackStatus {
    fn from(s: &str) -> Self {
        match s {
            "DELETE_IN_PROGRESS" => StackStatus::DeleteInProgress,
            "DELETE_COMPLETE" => StackStatus::DeleteComplete,
            other => StackStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for StackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Instance {
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct Bucket {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct ResourceGroup {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub provisioning_state: Option<String>,
}

impl ResourceGroup {
    pub fn is_deleting(&self) -> bool {
        self.provisioning_state.as_deref() == Some("Deleting")
    }
}

#[derive(Debug, Clone)]
pub struct VirtualNetwork {
    pub name: String,
    pub peerings: Vec<NetworkPeering>,
}

#[derive(Debug, Clone)]
pub struct NetworkPeering {
    pub name: String,
    pub state: PeeringState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeeringState {
    Initiated,
    Connected,
    Disconnected,
    Other(String),
}

impl From<&str> for PeeringState {
    fn from(s: &str) -> Self {
        match s {
            "Initiated" => PeeringState::Initiated,
            "Connected" => PeeringState::Connected,
            "Disconnected" => PeeringState::Disconnected,
            other => PeeringState::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordSet {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct GatewayConnection {
    pub name: String,
}
