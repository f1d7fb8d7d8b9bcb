//! Typed views of CLI results.
//!
//! Fields the CLI may omit default to empty values so older CLI releases
//! still deserialize.

use serde::{Deserialize, Serialize};

/// An app or org reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Active app/org selection of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveContext {
    #[serde(default)]
    pub app: Option<EntityRef>,
    #[serde(default)]
    pub org: Option<EntityRef>,
}

/// Result of `kinvey profile show`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub active: ActiveContext,
}

/// Entry of `kinvey profile list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub profile: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
}

/// Result of `kinvey flex show`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexServiceInfo {
    #[serde(default)]
    pub service_id: Option<String>,
    pub service_name: String,
    #[serde(default)]
    pub svc_env_id: Option<String>,
}

/// Deployment sub-record of `kinvey flex status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentState {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: String,
}

/// Result of `kinvey flex status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub deployment: DeploymentState,
}

impl FlexStatus {
    /// Whether a deployment job is still in flight.
    pub fn is_deploying(&self) -> bool {
        self.deployment.status.eq_ignore_ascii_case("RUNNING")
    }
}

/// Result of `kinvey flex deploy`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentJob {
    #[serde(default)]
    pub id: Option<String>,
}
