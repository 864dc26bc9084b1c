//! CNI plugin result model (cniVersion 0.3.0 and later)

use std::net::IpAddr;

use ipnetwork::IpNetwork;
use netattach_api::v1::Dns;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{NetAttachError, Result};

/// Result returned by a CNI plugin for an ADD
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CniResult {
    #[serde(default)]
    pub cni_version: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<Interface>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<IpConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,

    #[serde(default)]
    pub dns: Dns,
}

/// Interface created or configured by the plugin
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mac: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,

    /// Network namespace path; empty for host-side interfaces
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sandbox: String,

    #[serde(default, rename = "socketPath", skip_serializing_if = "String::is_empty")]
    pub socket_path: String,

    #[serde(default, rename = "pciID", skip_serializing_if = "String::is_empty")]
    pub pci_id: String,
}

impl Interface {
    /// Whether the interface lives in the container's network namespace
    pub fn in_sandbox(&self) -> bool {
        !self.sandbox.is_empty()
    }
}

/// Address assigned to an interface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpConfig {
    /// Index into the result's interfaces; out-of-range values, negative
    /// ones included, name no interface
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<i64>,

    pub address: IpNetwork,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<IpAddr>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst: Option<IpNetwork>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gw: Option<IpAddr>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advmss: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<u32>,
}

impl Route {
    /// Whether the route covers every address (0.0.0.0/0 or ::/0).
    /// A route without destination counts as default.
    pub fn is_default(&self) -> bool {
        match self.dst {
            None => true,
            Some(dst) => dst.prefix() == 0 && dst.ip().is_unspecified(),
        }
    }
}

impl CniResult {
    /// Parse a CNI result as printed by a plugin
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(raw)
            .map_err(|e| NetAttachError::InvalidResult(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let object = match &value {
            Value::Null => {
                return Err(NetAttachError::InvalidResult("result is null".to_string()));
            }
            Value::Object(object) => object,
            other => {
                return Err(NetAttachError::InvalidResult(format!(
                    "expected an object, got {}",
                    other
                )));
            }
        };

        let version = object.get("cniVersion").and_then(Value::as_str).unwrap_or("");
        if object.contains_key("ip4")
            || object.contains_key("ip6")
            || version.starts_with("0.1.")
            || version.starts_with("0.2.")
        {
            return Err(NetAttachError::InvalidResult(format!(
                "unsupported result format for cniVersion {:?}",
                version
            )));
        }

        serde_json::from_value(value).map_err(|e| NetAttachError::InvalidResult(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRIDGE_RESULT: &str = r#"{
        "cniVersion": "1.0.0",
        "interfaces": [
            { "name": "cni0", "mac": "00:11:22:33:44:55" },
            { "name": "veth3243", "mac": "55:44:33:22:11:11" },
            { "name": "eth0", "mac": "99:88:77:66:55:44", "mtu": 1450, "sandbox": "/var/run/netns/blue" }
        ],
        "ips": [
            { "address": "10.1.0.5/16", "gateway": "10.1.0.1", "interface": 2 },
            { "address": "fd00::5/64", "interface": 2 }
        ],
        "routes": [
            { "dst": "0.0.0.0/0" },
            { "dst": "10.2.0.0/16", "gw": "10.1.0.254", "mtu": 1400 }
        ],
        "dns": { "nameservers": ["10.1.0.1"] }
    }"#;

    #[test]
    fn test_parse_result() {
        let result = CniResult::from_slice(BRIDGE_RESULT.as_bytes()).unwrap();
        assert_eq!(result.cni_version, "1.0.0");
        assert_eq!(result.interfaces.len(), 3);
        assert!(!result.interfaces[0].in_sandbox());
        assert!(result.interfaces[2].in_sandbox());
        assert_eq!(result.interfaces[2].mtu, Some(1450));
        assert_eq!(result.ips[0].interface, Some(2));
        assert_eq!(result.ips[0].address.ip().to_string(), "10.1.0.5");
        assert_eq!(result.ips[0].gateway, Some("10.1.0.1".parse().unwrap()));
        assert_eq!(result.ips[1].gateway, None);
        assert_eq!(result.routes[1].mtu, Some(1400));
        assert_eq!(result.dns.nameservers, vec!["10.1.0.1"]);
    }

    #[test]
    fn test_default_route_detection() {
        let route = |dst: Option<&str>| Route {
            dst: dst.map(|d| d.parse().unwrap()),
            ..Default::default()
        };
        assert!(route(Some("0.0.0.0/0")).is_default());
        assert!(route(Some("::/0")).is_default());
        assert!(route(None).is_default());
        assert!(!route(Some("10.10.10.0/24")).is_default());
        assert!(!route(Some("10.0.0.0/0")).is_default());
        assert!(!route(Some("0.0.0.0/8")).is_default());
    }

    #[test]
    fn test_null_result_rejected() {
        assert!(matches!(
            CniResult::from_slice(b"null"),
            Err(NetAttachError::InvalidResult(_))
        ));
        assert!(matches!(
            CniResult::from_slice(b""),
            Err(NetAttachError::InvalidResult(_))
        ));
        assert!(matches!(
            CniResult::from_slice(b"[]"),
            Err(NetAttachError::InvalidResult(_))
        ));
    }

    #[test]
    fn test_malformed_address_rejected() {
        let raw = r#"{"cniVersion":"1.0.0","ips":[{"address":"not-a-cidr"}]}"#;
        assert!(matches!(
            CniResult::from_slice(raw.as_bytes()),
            Err(NetAttachError::InvalidResult(_))
        ));
    }

    #[test]
    fn test_legacy_result_rejected() {
        let raw = r#"{"cniVersion":"0.2.0","ip4":{"ip":"10.1.0.5/16"}}"#;
        assert!(matches!(
            CniResult::from_slice(raw.as_bytes()),
            Err(NetAttachError::InvalidResult(_))
        ));
    }
}
