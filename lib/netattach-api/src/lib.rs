//! Network Attachment Definition API types
//!
//! This library defines the `k8s.cni.cncf.io` resources and the values
//! carried in pod annotations:
//! - NetworkAttachmentDefinition: CNI configuration for a secondary network
//! - NetworkStatus: per-interface status written after attachment
//! - NetworkSelectionElement: a pod's request for a network attachment

pub mod error;
pub mod v1;

pub use error::ApiError;
pub use v1::{
    DeviceInfo, Dns, NetworkAttachmentDefinition, NetworkSelectionElement, NetworkStatus,
    ReconcilerState, StateType,
};
