/// API version v1 for `k8s.cni.cncf.io` resources and annotations

pub mod device_info;
pub mod network_attachment_definition;
pub mod network_selection;
pub mod network_status;

pub use device_info::{Device, DeviceInfo, MemifDevice, PciDevice, VdpaDevice, VhostDevice};
pub use network_attachment_definition::{
    NetworkAttachmentDefinition, NetworkAttachmentDefinitionList, NetworkAttachmentDefinitionSpec,
    NetworkAttachmentDefinitionStatus, ReconcilerState, StateType, PENDING_OBSERVATION_MESSAGE,
};
pub use network_selection::{BandwidthEntry, NetworkSelectionElement, PortMapEntry};
pub use network_status::{Dns, NetworkStatus};

/// API group for network attachment resources
pub const API_GROUP: &str = "k8s.cni.cncf.io";
/// API version for network attachment resources
pub const API_VERSION: &str = "v1";

/// Pod annotation carrying the network selection request
pub const NETWORK_ATTACHMENT_ANNOT: &str = "k8s.v1.cni.cncf.io/networks";
/// Pod annotation carrying the network status
pub const NETWORK_STATUS_ANNOT: &str = "k8s.v1.cni.cncf.io/network-status";
/// Obsolete pod annotation for network status, still honored on read
pub const OLD_NETWORK_STATUS_ANNOT: &str = "k8s.v1.cni.cncf.io/networks-status";
