//! Derivation of pod network statuses from CNI results

use std::collections::HashMap;
use std::sync::Arc;

use netattach_api::v1::{DeviceInfo, NetworkStatus};
use tracing::debug;

use crate::cni::CniResult;
use crate::{NetAttachError, Result};

/// Build one NetworkStatus per interface the CNI result placed in the pod
///
/// Interfaces without a sandbox are host-side and never reported. An IP
/// entry without an interface index belongs to the last sandboxed
/// interface. At most one status is flagged default: the first interface
/// owning an IP entry with a gateway, otherwise the first interface when
/// `default_network` is set. Default-route gateways are reported only when
/// the result has a single sandboxed interface.
pub fn create_network_statuses(
    result: &CniResult,
    network_name: &str,
    default_network: bool,
    device_info: Option<Arc<DeviceInfo>>,
) -> Vec<NetworkStatus> {
    // CNI interface index -> index into statuses
    let mut positions: HashMap<usize, usize> = HashMap::new();
    let mut statuses: Vec<NetworkStatus> = Vec::new();

    for (index, iface) in result.interfaces.iter().enumerate() {
        if !iface.in_sandbox() {
            debug!("Skipping host-side interface {}", iface.name);
            continue;
        }
        positions.insert(index, statuses.len());
        statuses.push(NetworkStatus {
            name: network_name.to_string(),
            interface: iface.name.clone(),
            mac: iface.mac.clone(),
            mtu: iface.mtu,
            dns: result.dns.clone(),
            device_info: device_info.clone(),
            ..Default::default()
        });
    }

    let mut has_gateway = vec![false; statuses.len()];
    for ip in &result.ips {
        let owner = match ip.interface {
            Some(index) => usize::try_from(index)
                .ok()
                .and_then(|index| positions.get(&index).copied()),
            None => statuses.len().checked_sub(1),
        };
        let Some(owner) = owner else {
            debug!(
                "Dropping address {} with no sandboxed interface (index {:?})",
                ip.address, ip.interface
            );
            continue;
        };
        statuses[owner].ips.push(ip.address.ip().to_string());
        if ip.gateway.is_some() {
            has_gateway[owner] = true;
        }
    }

    let default_position = has_gateway
        .iter()
        .position(|gateway| *gateway)
        .or_else(|| (default_network && !statuses.is_empty()).then_some(0));
    if let Some(position) = default_position {
        statuses[position].default = true;
    }

    if let [status] = statuses.as_mut_slice() {
        status.gateway = result
            .routes
            .iter()
            .filter(|route| route.is_default())
            .filter_map(|route| route.gw)
            .map(|gw| gw.to_string())
            .collect();
    }

    debug!(
        "Created {} network statuses for network {}",
        statuses.len(),
        network_name
    );
    statuses
}

/// Build the status of a result that placed exactly one interface in the pod
pub fn create_network_status(
    result: &CniResult,
    network_name: &str,
    default_network: bool,
    device_info: Option<Arc<DeviceInfo>>,
) -> Result<NetworkStatus> {
    let mut statuses = create_network_statuses(result, network_name, default_network, device_info);
    match statuses.len() {
        1 => Ok(statuses.remove(0)),
        0 => Err(NetAttachError::InvalidResult(
            "no interface with a sandbox".to_string(),
        )),
        n => Err(NetAttachError::InvalidResult(format!(
            "expected one interface with a sandbox, found {}",
            n
        ))),
    }
}

/// Parse a raw CNI result and build its network statuses
pub fn network_statuses_from_json(
    raw: &[u8],
    network_name: &str,
    default_network: bool,
    device_info: Option<Arc<DeviceInfo>>,
) -> Result<Vec<NetworkStatus>> {
    let result = CniResult::from_slice(raw)?;
    Ok(create_network_statuses(
        &result,
        network_name,
        default_network,
        device_info,
    ))
}
