use std::fmt;
use std::str::FromStr;

use kube::core::ObjectList;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ApiError;

/// Default observation for a NetworkAttachmentDefinition that has not been
/// reconciled yet
pub const PENDING_OBSERVATION_MESSAGE: &str = "NetworkAttachmentDefinition waiting to be reconciled";

/// NetworkAttachmentDefinition carries the CNI configuration of a secondary
/// network that pods can request through the networks annotation
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "k8s.cni.cncf.io",
    version = "v1",
    kind = "NetworkAttachmentDefinition",
    plural = "network-attachment-definitions",
    shortname = "net-attach-def",
    namespaced,
    derive = "Default",
    derive = "PartialEq",
    status = "NetworkAttachmentDefinitionStatus",
)]
pub struct NetworkAttachmentDefinitionSpec {
    /// CNI configuration, owned and interpreted by the CNI plugin
    #[serde(default)]
    pub config: String,
}

/// List of NetworkAttachmentDefinitions as returned by the API server
pub type NetworkAttachmentDefinitionList = ObjectList<NetworkAttachmentDefinition>;

/// Status of a NetworkAttachmentDefinition
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NetworkAttachmentDefinitionStatus {
    #[serde(flatten)]
    pub reconciler_state: ReconcilerState,
}

/// Reconciliation state of a NetworkAttachmentDefinition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum StateType {
    /// Waiting to be reconciled
    #[default]
    Pending,
    /// Reconciled successfully
    Success,
    /// Failed to reconcile for one or more reasons
    Failure,
}

impl StateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateType::Pending => "Pending",
            StateType::Success => "Success",
            StateType::Failure => "Failure",
        }
    }

    /// Whether a reconciliation pass has concluded
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StateType::Pending)
    }
}

impl fmt::Display for StateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(StateType::Pending),
            "Success" => Ok(StateType::Success),
            "Failure" => Ok(StateType::Failure),
            other => Err(ApiError::InvalidState(other.to_string())),
        }
    }
}

/// ReconcilerState tells whether a NetworkAttachmentDefinition was reconciled
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReconcilerState {
    /// Current state of the reconciliation
    pub state: StateType,

    /// Details about the state, e.g. the error that caused a failure
    #[serde(default)]
    pub observation: String,
}

impl Default for ReconcilerState {
    fn default() -> Self {
        Self {
            state: StateType::Pending,
            observation: PENDING_OBSERVATION_MESSAGE.to_string(),
        }
    }
}

impl ReconcilerState {
    pub fn succeeded(observation: impl Into<String>) -> Self {
        Self {
            state: StateType::Success,
            observation: observation.into(),
        }
    }

    pub fn failed(observation: impl Into<String>) -> Self {
        Self {
            state: StateType::Failure,
            observation: observation.into(),
        }
    }
}

impl NetworkAttachmentDefinition {
    /// Create a NetworkAttachmentDefinition in the initial pending state
    pub fn pending(name: &str, spec: NetworkAttachmentDefinitionSpec) -> Self {
        let mut nad = Self::new(name, spec);
        nad.status = Some(NetworkAttachmentDefinitionStatus::default());
        nad
    }

    /// Current reconciler state, pending when no status was written yet
    pub fn reconciler_state(&self) -> ReconcilerState {
        self.status
            .as_ref()
            .map(|status| status.reconciler_state.clone())
            .unwrap_or_default()
    }
}
