use thiserror::Error;

/// Validation errors raised while decoding API values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("multiple IP sources: \"ips\" and \"ipam-claim-reference\" are mutually exclusive")]
    TooManyIpSources,

    #[error("malformed network selection element: {0}")]
    MalformedSelection(String),

    #[error("unknown device type: {0}")]
    UnknownDeviceType(String),

    #[error("device info of type {expected:?} carries a {found:?} payload")]
    DevicePayloadMismatch { expected: String, found: String },

    #[error("device info does not name a device type")]
    MissingDeviceType,

    #[error("invalid reconciler state: {0}")]
    InvalidState(String),
}
