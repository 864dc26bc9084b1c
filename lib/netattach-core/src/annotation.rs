//! Encoding and parsing of the network pod annotations

use k8s_openapi::api::core::v1::Pod;
use kube::ResourceExt;
use netattach_api::v1::{NetworkSelectionElement, NetworkStatus};
use netattach_api::ApiError;
use serde_json::Value;
use tracing::debug;

use crate::config::AnnotationKeys;
use crate::{NetAttachError, Result};

/// Longest interface name the kernel accepts
const MAX_INTERFACE_NAME_LEN: usize = 15;

/// Encode statuses as the JSON array stored in the network-status annotation
pub fn encode_network_status(statuses: &[NetworkStatus]) -> Result<String> {
    Ok(serde_json::to_string(statuses)?)
}

/// Decode a network-status annotation value
///
/// An empty value or `null` decodes to no statuses.
pub fn decode_network_status(value: &str) -> Result<Vec<NetworkStatus>> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    let statuses: Option<Vec<NetworkStatus>> =
        serde_json::from_str(value).map_err(NetAttachError::DecodeFailure)?;
    Ok(statuses.unwrap_or_default())
}

/// Read the network status of a pod, falling back to the legacy annotation
pub fn get_network_status(pod: &Pod) -> Result<Vec<NetworkStatus>> {
    get_network_status_with_keys(pod, &AnnotationKeys::default())
}

pub fn get_network_status_with_keys(pod: &Pod, keys: &AnnotationKeys) -> Result<Vec<NetworkStatus>> {
    let (key, value) = keys
        .lookup_status(pod.annotations())
        .ok_or_else(|| NetAttachError::MissingAnnotation(keys.status.clone()))?;
    if key != keys.status {
        debug!(
            "Reading network status of pod {} from legacy annotation {}",
            pod.name_any(),
            key
        );
    }
    decode_network_status(value)
}

/// Parse the network selection annotation of a pod
///
/// Elements without a namespace are placed in the pod's namespace.
pub fn parse_pod_network_annotation(pod: &Pod) -> Result<Vec<NetworkSelectionElement>> {
    parse_pod_network_annotation_with_keys(pod, &AnnotationKeys::default())
}

pub fn parse_pod_network_annotation_with_keys(
    pod: &Pod,
    keys: &AnnotationKeys,
) -> Result<Vec<NetworkSelectionElement>> {
    let value = keys
        .lookup_selection(pod.annotations())
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            NetAttachError::NoNetwork(format!("pod {} has no {} annotation", pod.name_any(), keys.selection))
        })?;
    let namespace = pod.namespace().unwrap_or_default();
    parse_network_selection(value, &namespace)
}

/// Parse a network selection annotation value
///
/// The value is either a JSON array of selection elements or a
/// comma-separated list of `[namespace/]name[@interface]` references.
pub fn parse_network_selection(
    value: &str,
    default_namespace: &str,
) -> Result<Vec<NetworkSelectionElement>> {
    let value = value.trim();
    if value.is_empty() {
        return Err(NetAttachError::ParseFailure(
            "annotation value is empty".to_string(),
        ));
    }

    let mut elements = if value.starts_with('[') {
        parse_selection_json(value)?
    } else {
        parse_selection_list(value)?
    };

    for element in &mut elements {
        if element.namespace.as_deref().map_or(true, str::is_empty) {
            element.namespace = Some(default_namespace.to_string());
        }
    }
    Ok(elements)
}

fn parse_selection_json(value: &str) -> Result<Vec<NetworkSelectionElement>> {
    let items: Vec<Value> = serde_json::from_str(value)
        .map_err(|e| NetAttachError::ParseFailure(format!("invalid JSON: {}", e)))?;

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let label = match item.get("name").and_then(Value::as_str) {
                Some(name) => format!("element {} ({:?})", index, name),
                None => format!("element {}", index),
            };
            NetworkSelectionElement::from_value(item).map_err(|e| match e {
                ApiError::TooManyIpSources => NetAttachError::IncompatibleIpSources(label),
                other => NetAttachError::ParseFailure(format!("{}: {}", label, other)),
            })
        })
        .collect()
}

fn parse_selection_list(value: &str) -> Result<Vec<NetworkSelectionElement>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(parse_selection_item)
        .collect()
}

/// Parse a `[namespace/]name[@interface]` reference
fn parse_selection_item(item: &str) -> Result<NetworkSelectionElement> {
    let invalid = |reason: &str| NetAttachError::ParseFailure(format!("{:?}: {}", item, reason));

    let (namespace, rest) = match item.split_once('/') {
        Some((namespace, rest)) => (Some(namespace), rest),
        None => (None, item),
    };
    if rest.contains('/') {
        return Err(invalid("more than one '/'"));
    }

    let (name, interface) = match rest.split_once('@') {
        Some((name, interface)) => (name, Some(interface)),
        None => (rest, None),
    };
    if interface.is_some_and(|interface| interface.contains('@')) {
        return Err(invalid("more than one '@'"));
    }

    if let Some(namespace) = namespace {
        if !is_dns1123_label(namespace) {
            return Err(invalid("namespace is not a valid DNS-1123 label"));
        }
    }
    if !is_dns1123_subdomain(name) {
        return Err(invalid("network name is not a valid DNS-1123 subdomain"));
    }
    if let Some(interface) = interface {
        if !is_interface_name(interface) {
            return Err(invalid("invalid interface name"));
        }
    }

    Ok(NetworkSelectionElement {
        name: name.to_string(),
        namespace: namespace.map(str::to_string),
        interface_request: interface.map(str::to_string),
        ..Default::default()
    })
}

fn is_dns1123_label(value: &str) -> bool {
    let bytes = value.as_bytes();
    !bytes.is_empty()
        && bytes.len() <= 63
        && bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        && bytes[0] != b'-'
        && bytes[bytes.len() - 1] != b'-'
}

fn is_dns1123_subdomain(value: &str) -> bool {
    value.len() <= 253 && value.split('.').all(is_dns1123_label)
}

fn is_interface_name(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_INTERFACE_NAME_LEN
        && value != "."
        && value != ".."
        && !value
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == ':')
}
