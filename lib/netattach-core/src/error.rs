use thiserror::Error;

pub type Result<T> = std::result::Result<T, NetAttachError>;

#[derive(Error, Debug)]
pub enum NetAttachError {
    #[error("Invalid CNI result: {0}")]
    InvalidResult(String),

    #[error("Failed to decode network status annotation: {0}")]
    DecodeFailure(#[source] serde_json::Error),

    #[error("Failed to parse network selection annotation: {0}")]
    ParseFailure(String),

    #[error("Network selection {0} requests both IPs and an IPAM claim")]
    IncompatibleIpSources(String),

    #[error("No kubernetes network found: {0}")]
    NoNetwork(String),

    #[error("Pod has no {0} annotation")]
    MissingAnnotation(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Kubernetes error: {0}")]
    KubernetesError(#[from] kube::Error),
}
