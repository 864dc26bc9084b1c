use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::DeviceInfo;

/// DNS settings handed to resolvers inside the pod
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dns {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub domain: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Status of one network interface attached to a pod, as recorded in the
/// network-status annotation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    /// Name of the network the interface is attached to
    pub name: String,

    /// Interface name inside the pod's network namespace
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub interface: String,

    /// Addresses without prefix length, in CNI result order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mac: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,

    /// Whether this is the pod's default attachment
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,

    #[serde(default)]
    pub dns: Dns,

    /// Gateways of the default routes reported for this interface
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gateway: Vec<String>,

    /// Device backing the attachment, shared by every interface of it
    #[serde(
        default,
        rename = "device-info",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "super::device_info::deserialize_recorded"
    )]
    pub device_info: Option<Arc<DeviceInfo>>,
}
