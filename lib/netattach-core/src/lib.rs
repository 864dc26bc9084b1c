//! Network status derivation and pod annotation handling
//!
//! This library provides:
//! - A model of CNI plugin results
//! - Derivation of per-interface network statuses from a CNI result
//! - Encoding and decoding of the network-status and networks annotations
//! - A store boundary for writing annotations back to pods

pub mod annotation;
pub mod cni;
pub mod config;
pub mod error;
pub mod status;
pub mod store;

pub use annotation::{
    decode_network_status, encode_network_status, get_network_status, parse_network_selection,
    parse_pod_network_annotation,
};
pub use cni::CniResult;
pub use config::AnnotationKeys;
pub use error::{NetAttachError, Result};
pub use status::{create_network_status, create_network_statuses, network_statuses_from_json};
pub use store::{set_network_status, AnnotationStore, KubeAnnotationStore};
