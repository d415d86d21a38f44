use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of a deployment. Services stay up, jobs run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentType {
    Service,
    Job,
}

impl DeploymentType {
    /// Label/string representation, also used in list filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentType::Service => "service",
            DeploymentType::Job => "job",
        }
    }

    /// Parse the label representation back. Unknown strings map to `None`.
    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "service" => Some(DeploymentType::Service),
            "job" => Some(DeploymentType::Job),
            _ => None,
        }
    }
}

impl std::fmt::Display for DeploymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a deployment, derived from the runtime container
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Pending,
    Running,
    Paused,
    Stopped,
    Failed,
    Terminated,
    Unknown,
}

impl DeploymentStatus {
    /// Map a runtime container status string to a deployment status.
    /// Anything unrecognized degrades to `Unknown` instead of failing.
    pub fn from_container_status(status: &str) -> Self {
        match status {
            "created" => DeploymentStatus::Pending,
            "running" => DeploymentStatus::Running,
            "restarting" => DeploymentStatus::Running,
            "paused" => DeploymentStatus::Paused,
            "removing" => DeploymentStatus::Terminated,
            "exited" => DeploymentStatus::Stopped,
            "dead" => DeploymentStatus::Failed,
            _ => DeploymentStatus::Unknown,
        }
    }
}

/// Compute requirements and limits of a deployment.
///
/// Minimums are admission requirements checked against system capacity,
/// maximums become runtime limits. Memory figures are in MB.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentCompute {
    #[serde(default)]
    pub min_cpus: Option<f64>,
    #[serde(default)]
    pub max_cpus: Option<f64>,
    #[serde(default)]
    pub min_memory: Option<u64>,
    #[serde(default)]
    pub max_memory: Option<u64>,
    #[serde(default)]
    pub min_gpus: Option<u32>,
    #[serde(default)]
    pub max_gpus: Option<u32>,
    /// Minimum lifetime in seconds the deployment should be kept alive.
    #[serde(default)]
    pub min_lifetime: Option<String>,
    /// Mount path of the data volume inside the container.
    #[serde(default)]
    pub volume_path: Option<String>,
    /// Volume size limit in MB, announced to the container via env.
    #[serde(default)]
    pub max_volume_size: Option<u64>,
    /// Replica count. Not supported by the Docker backend.
    #[serde(default)]
    pub max_replicas: Option<u32>,
}

/// A backend-agnostic request to deploy a service or job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeploymentRequest {
    pub container_image: String,
    #[serde(default)]
    pub display_name: Option<String>,
    /// Command line, whitespace-split before handing it to the runtime.
    /// Absent or empty means the image entrypoint runs unchanged.
    #[serde(default)]
    pub command: Option<String>,
    /// Environment parameters passed into the container.
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Exposed endpoint port specs (e.g. `8080`, `8080/tools`).
    #[serde(default)]
    pub endpoints: Vec<String>,
    /// Feature requirements, e.g. `docker` for the control-socket mount.
    #[serde(default)]
    pub requirements: Vec<String>,
    /// Free-form metadata, persisted as labels.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub compute: Option<DeploymentCompute>,
}

/// A deployed service or job, reconstructed from runtime state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deployment {
    /// Runtime-native container id. The only id space there is.
    pub id: String,
    /// Same as `id`; kept separate for backends with distinct id spaces.
    pub internal_id: String,
    pub display_name: Option<String>,
    pub container_image: String,
    pub command: Option<String>,
    pub deployment_type: Option<DeploymentType>,
    pub status: DeploymentStatus,
    /// Reverse-mapped limits. `max_gpus` is not recoverable from a live
    /// container and stays `None`.
    pub compute: DeploymentCompute,
    /// Container environment as key/value pairs.
    pub parameters: HashMap<String, String>,
    pub metadata: HashMap<String, String>,
    pub endpoints: Vec<String>,
    pub requirements: Vec<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    /// Raw runtime timestamps, passed through untouched.
    pub started_at: Option<String>,
    pub stopped_at: Option<String>,
}

/// An action offered for a resource, e.g. the default deploy action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAction {
    pub action_id: String,
    pub display_name: String,
}
