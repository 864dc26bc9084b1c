use std::net::IpAddr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::ApiError;

/// Port mapping requested for an attachment, handed to the portmap plugin
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapEntry {
    pub host_port: u16,
    pub container_port: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protocol: String,
    #[serde(default, rename = "hostIP", skip_serializing_if = "String::is_empty")]
    pub host_ip: String,
}

/// Bandwidth limits requested for an attachment, in bits per second / bits
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandwidthEntry {
    pub ingress_rate: u64,
    pub ingress_burst: u64,
    pub egress_rate: u64,
    pub egress_burst: u64,
}

/// One element of the JSON form of the networks annotation
///
/// Deserialization validates the element: plain IP requests and an IPAM
/// claim reference are mutually exclusive sources for the addresses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self")]
pub struct NetworkSelectionElement {
    /// Name of the NetworkAttachmentDefinition this element selects
    pub name: String,

    /// Namespace of the NetworkAttachmentDefinition, defaults to the pod's
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Requested IP addresses
    #[serde(default, rename = "ips", skip_serializing_if = "Vec::is_empty")]
    pub ip_request: Vec<String>,

    /// Requested MAC address
    #[serde(default, rename = "mac", skip_serializing_if = "Option::is_none")]
    pub mac_request: Option<String>,

    /// Requested Infiniband GUID
    #[serde(default, rename = "infiniband-guid", skip_serializing_if = "Option::is_none")]
    pub infiniband_guid_request: Option<String>,

    /// Requested interface name inside the pod
    #[serde(default, rename = "interface", skip_serializing_if = "Option::is_none")]
    pub interface_request: Option<String>,

    #[serde(default, rename = "portMappings", skip_serializing_if = "Vec::is_empty")]
    pub port_mappings_request: Vec<PortMapEntry>,

    #[serde(default, rename = "bandwidth", skip_serializing_if = "Option::is_none")]
    pub bandwidth_request: Option<BandwidthEntry>,

    /// Extra CNI arguments, passed through untouched
    #[serde(default, rename = "cni-args", skip_serializing_if = "Option::is_none")]
    pub cni_args: Option<Map<String, Value>>,

    /// Gateways to install as the pod's default route
    #[serde(default, rename = "default-route", skip_serializing_if = "Vec::is_empty")]
    pub gateway_request: Vec<IpAddr>,

    /// Name of an IPAMClaim providing the addresses
    #[serde(default, rename = "ipam-claim-reference", skip_serializing_if = "Option::is_none")]
    pub ipam_claim_reference: Option<String>,
}

impl NetworkSelectionElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let has_claim = self
            .ipam_claim_reference
            .as_deref()
            .is_some_and(|claim| !claim.is_empty());
        if has_claim && !self.ip_request.is_empty() {
            return Err(ApiError::TooManyIpSources);
        }
        Ok(())
    }

    /// Decode and validate one element of the JSON form
    pub fn from_value(value: Value) -> Result<Self, ApiError> {
        // Resolves to the unvalidated decoder generated for `remote = "Self"`
        let element = Self::deserialize(value)
            .map_err(|e| ApiError::MalformedSelection(e.to_string()))?;
        element.validate()?;
        Ok(element)
    }
}

impl<'de> Deserialize<'de> for NetworkSelectionElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let element = NetworkSelectionElement::deserialize(deserializer)?;
        element.validate().map_err(serde::de::Error::custom)?;
        Ok(element)
    }
}

impl Serialize for NetworkSelectionElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NetworkSelectionElement::serialize(self, serializer)
    }
}
