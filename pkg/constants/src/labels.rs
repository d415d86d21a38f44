//! Reserved container label keys.
//!
//! Every deployment the platform creates carries its typed state as labels
//! under this prefix, so a deployment can be fully reconstructed from the
//! runtime without any secondary store.

/// Prefix shared by all reserved label keys.
pub const LABEL_PREFIX: &str = "wharf.";

/// System namespace the deployment belongs to.
pub const LABEL_NAMESPACE: &str = "wharf.namespace";

/// Project the deployment belongs to.
pub const LABEL_PROJECT_NAME: &str = "wharf.projectName";

/// Deterministic deployment (container) name.
pub const LABEL_DEPLOYMENT_NAME: &str = "wharf.deploymentName";

/// Human-readable display name the deployment was created with.
pub const LABEL_DISPLAY_NAME: &str = "wharf.displayName";

/// Deployment kind: `service` or `job`.
pub const LABEL_DEPLOYMENT_TYPE: &str = "wharf.deploymentType";

/// Minimum lifetime in seconds requested for the deployment.
pub const LABEL_MIN_LIFETIME: &str = "wharf.minLifetime";

/// Comma-joined list of exposed endpoint port specs.
pub const LABEL_ENDPOINTS: &str = "wharf.endpoints";

/// Comma-joined list of feature requirements.
pub const LABEL_REQUIREMENTS: &str = "wharf.requirements";

/// Mount path of the deployment's data volume inside the container.
pub const LABEL_VOLUME_PATH: &str = "wharf.volumePath";

/// Free-text description.
pub const LABEL_DESCRIPTION: &str = "wharf.description";

/// Icon identifier or URL.
pub const LABEL_ICON: &str = "wharf.icon";

/// Prefix for user-supplied metadata labels.
pub const LABEL_METADATA_PREFIX: &str = "wharf.meta.";
