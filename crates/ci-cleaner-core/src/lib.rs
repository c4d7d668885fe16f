pub mod classify;
mod error;
mod orchestrator;
pub mod patterns;
mod resource;

pub use error::{CleanerError, ErrorCollection, Result};
pub use orchestrator::{Cleaner, Orchestrator};
pub use resource::{
    Bucket, GatewayConnection, Instance, NetworkPeering, PeeringState, RecordSet, ResourceGroup,
    Stack, StackStatus, VirtualNetwork,
};
