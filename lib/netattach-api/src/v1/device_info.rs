use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ApiError;

pub const DEVICE_INFO_TYPE_PCI: &str = "pci";
pub const DEVICE_INFO_TYPE_VHOST_USER: &str = "vhost-user";
pub const DEVICE_INFO_TYPE_MEMIF: &str = "memif";
pub const DEVICE_INFO_TYPE_VDPA: &str = "vdpa";
pub const DEVICE_INFO_VERSION: &str = "1.0.0";

pub const VHOST_DEVICE_MODE_CLIENT: &str = "client";
pub const VHOST_DEVICE_MODE_SERVER: &str = "server";

pub const MEMIF_DEVICE_ROLE_MASTER: &str = "master";
pub const MEMIF_DEVICE_ROLE_SLAVE: &str = "slave";
pub const MEMIF_DEVICE_MODE_ETHERNET: &str = "ethernet";
pub const MEMIF_DEVICE_MODE_IP: &str = "ip";
pub const MEMIF_DEVICE_MODE_PUNT: &str = "punt";

/// Information about the device backing a network attachment
///
/// On the wire this is `{"type": "pci", "version": "1.0.0", "pci": {...}}`;
/// in memory the type tag and its payload are a single [`Device`] so a tag
/// can never disagree with the payload it describes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DeviceInfoWire", into = "DeviceInfoWire")]
pub struct DeviceInfo {
    /// Version of the device info format
    pub version: String,
    pub device: Device,
}

impl DeviceInfo {
    pub fn new(device: Device) -> Self {
        Self {
            version: DEVICE_INFO_VERSION.to_string(),
            device,
        }
    }

    /// Wire tag of the device type
    pub fn device_type(&self) -> &'static str {
        self.device.device_type()
    }
}

/// Device backing a network attachment, one variant per device type
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Device {
    Pci(PciDevice),
    VhostUser(VhostDevice),
    Memif(MemifDevice),
    Vdpa(VdpaDevice),
}

impl Device {
    pub fn device_type(&self) -> &'static str {
        match self {
            Device::Pci(_) => DEVICE_INFO_TYPE_PCI,
            Device::VhostUser(_) => DEVICE_INFO_TYPE_VHOST_USER,
            Device::Memif(_) => DEVICE_INFO_TYPE_MEMIF,
            Device::Vdpa(_) => DEVICE_INFO_TYPE_VDPA,
        }
    }

    /// Device of the given type with an empty payload
    fn empty(device_type: &str) -> Result<Self, ApiError> {
        match device_type {
            DEVICE_INFO_TYPE_PCI => Ok(Device::Pci(PciDevice::default())),
            DEVICE_INFO_TYPE_VHOST_USER => Ok(Device::VhostUser(VhostDevice::default())),
            DEVICE_INFO_TYPE_MEMIF => Ok(Device::Memif(MemifDevice::default())),
            DEVICE_INFO_TYPE_VDPA => Ok(Device::Vdpa(VdpaDevice::default())),
            other => Err(ApiError::UnknownDeviceType(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PciDevice {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pci_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vhost_net: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub rdma_device: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pf_pci_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub representor_device: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VdpaDevice {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_device: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub driver: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pci_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pf_pci_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub representor_device: String,
}

/// vhost-user socket; `mode` is "client" or "server"
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VhostDevice {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mode: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
}

/// memif socket; `role` is "master" or "slave", `mode` one of
/// "ethernet", "ip" or "punt"
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemifDevice {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub role: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mode: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct DeviceInfoWire {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    device_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pci: Option<PciDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    vdpa: Option<VdpaDevice>,
    #[serde(default, rename = "vhost-user", skip_serializing_if = "Option::is_none")]
    vhost_user: Option<VhostDevice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    memif: Option<MemifDevice>,
}

impl TryFrom<DeviceInfoWire> for DeviceInfo {
    type Error = ApiError;

    fn try_from(wire: DeviceInfoWire) -> Result<Self, Self::Error> {
        let mut payloads: Vec<Device> = Vec::new();
        payloads.extend(wire.pci.map(Device::Pci));
        payloads.extend(wire.vhost_user.map(Device::VhostUser));
        payloads.extend(wire.memif.map(Device::Memif));
        payloads.extend(wire.vdpa.map(Device::Vdpa));

        if payloads.len() > 1 {
            let expected = if wire.device_type.is_empty() {
                payloads[0].device_type().to_string()
            } else {
                wire.device_type.clone()
            };
            let found = payloads
                .iter()
                .map(Device::device_type)
                .find(|t| *t != expected)
                .unwrap_or(DEVICE_INFO_TYPE_PCI);
            return Err(ApiError::DevicePayloadMismatch {
                expected,
                found: found.to_string(),
            });
        }

        let device = match (wire.device_type.as_str(), payloads.pop()) {
            ("", None) => return Err(ApiError::MissingDeviceType),
            ("", Some(device)) => device,
            (device_type, None) => Device::empty(device_type)?,
            (device_type, Some(device)) if device.device_type() == device_type => device,
            (device_type, Some(device)) => {
                // Surface an unknown tag before a mismatch
                Device::empty(device_type)?;
                return Err(ApiError::DevicePayloadMismatch {
                    expected: device_type.to_string(),
                    found: device.device_type().to_string(),
                });
            }
        };

        Ok(DeviceInfo {
            version: wire.version,
            device,
        })
    }
}

/// Read an optional device info recorded by another writer
///
/// Entries that name no device, an unknown type or conflicting payloads
/// (`{}` included) read as absent; only malformed JSON is an error.
pub(crate) fn deserialize_recorded<'de, D>(deserializer: D) -> Result<Option<Arc<DeviceInfo>>, D::Error>
where
    D: Deserializer<'de>,
{
    let wire = Option::<DeviceInfoWire>::deserialize(deserializer)?;
    Ok(wire
        .and_then(|wire| DeviceInfo::try_from(wire).ok())
        .map(Arc::new))
}

impl From<DeviceInfo> for DeviceInfoWire {
    fn from(info: DeviceInfo) -> Self {
        let mut wire = DeviceInfoWire {
            device_type: info.device.device_type().to_string(),
            version: info.version,
            ..Default::default()
        };
        match info.device {
            Device::Pci(pci) => wire.pci = Some(pci),
            Device::VhostUser(vhost) => wire.vhost_user = Some(vhost),
            Device::Memif(memif) => wire.memif = Some(memif),
            Device::Vdpa(vdpa) => wire.vdpa = Some(vdpa),
        }
        wire
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pci_wire_format() {
        let info = DeviceInfo {
            version: "v1.1.0".to_string(),
            device: Device::Pci(PciDevice {
                pci_address: "0000:01:02.2".to_string(),
                pf_pci_address: "0000:01:02.0".to_string(),
                representor_device: "eth3".to_string(),
                ..Default::default()
            }),
        };

        let value = serde_json::to_value(&info).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "pci",
                "version": "v1.1.0",
                "pci": {
                    "pci-address": "0000:01:02.2",
                    "pf-pci-address": "0000:01:02.0",
                    "representor-device": "eth3"
                }
            })
        );
    }

    #[test]
    fn test_decode_vhost_user() {
        let info: DeviceInfo = serde_json::from_value(json!({
            "type": "vhost-user",
            "version": "1.0.0",
            "vhost-user": { "mode": "server", "path": "/var/run/vhost/sock0" }
        }))
        .unwrap();

        assert_eq!(info.device_type(), DEVICE_INFO_TYPE_VHOST_USER);
        assert_eq!(
            info.device,
            Device::VhostUser(VhostDevice {
                mode: VHOST_DEVICE_MODE_SERVER.to_string(),
                path: "/var/run/vhost/sock0".to_string(),
            })
        );
    }

    #[test]
    fn test_type_inferred_from_single_payload() {
        let info: DeviceInfo = serde_json::from_value(json!({
            "memif": { "role": "master", "mode": "ethernet", "path": "/run/memif.sock" }
        }))
        .unwrap();
        assert_eq!(info.device_type(), DEVICE_INFO_TYPE_MEMIF);
        assert!(info.version.is_empty());
    }

    #[test]
    fn test_type_without_payload() {
        let info: DeviceInfo =
            serde_json::from_value(json!({ "type": "vdpa", "version": "1.0.0" })).unwrap();
        assert_eq!(info, DeviceInfo::new(Device::Vdpa(VdpaDevice::default())));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = serde_json::from_value::<DeviceInfo>(json!({ "type": "nvme" })).unwrap_err();
        assert!(err.to_string().contains("unknown device type: nvme"));
    }

    #[test]
    fn test_mismatched_payload_rejected() {
        let wire = DeviceInfoWire {
            device_type: DEVICE_INFO_TYPE_PCI.to_string(),
            memif: Some(MemifDevice::default()),
            ..Default::default()
        };
        assert_eq!(
            DeviceInfo::try_from(wire),
            Err(ApiError::DevicePayloadMismatch {
                expected: "pci".to_string(),
                found: "memif".to_string(),
            })
        );
    }

    #[test]
    fn test_multiple_payloads_rejected() {
        let wire = DeviceInfoWire {
            pci: Some(PciDevice::default()),
            vdpa: Some(VdpaDevice::default()),
            ..Default::default()
        };
        assert_eq!(
            DeviceInfo::try_from(wire),
            Err(ApiError::DevicePayloadMismatch {
                expected: "pci".to_string(),
                found: "vdpa".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_type_and_payload_rejected() {
        assert_eq!(
            DeviceInfo::try_from(DeviceInfoWire::default()),
            Err(ApiError::MissingDeviceType)
        );
    }
}
