//! Deployment runtime constants.

/// Default system namespace when none is configured.
pub const DEFAULT_NAMESPACE: &str = "wharf";

/// Default API server port.
pub const DEFAULT_PORT: u16 = 8090;

/// Default CPU limit in cores when a request carries no maximum.
pub const DEFAULT_MAX_CPUS: f64 = 1.0;

/// Default memory limit in MB when a request carries no maximum.
pub const DEFAULT_MAX_MEMORY_MB: u64 = 6;

/// Hard floor for the container memory limit in MB.
/// Docker refuses to start containers with less.
pub const MIN_MEMORY_MB: u64 = 6;

/// Retry count for the on-failure restart policy.
pub const RESTART_POLICY_MAX_RETRIES: i64 = 10;

/// Requirement flag that grants the Docker control-socket mount.
pub const DOCKER_REQUIREMENT: &str = "docker";

/// Environment variable that selects visible GPUs inside the container.
/// Stripped from user input and set by the platform only.
pub const GPU_VISIBLE_DEVICES_ENV: &str = "NVIDIA_VISIBLE_DEVICES";

/// Suffix of the namespaced env var announcing the volume size limit.
/// Full name = uppercased namespace + this suffix.
pub const MAX_VOLUME_SIZE_ENV_SUFFIX: &str = "_MAX_VOLUME_SIZE_MB";

/// Marker env var set when the control plane itself runs in a container.
pub const CONTAINER_MARKER_ENV: &str = "WHARF_IN_CONTAINER";

/// Env var holding the container hostname (equals the container id).
pub const HOSTNAME_ENV: &str = "HOSTNAME";

/// Action id of the default deploy action.
pub const DEFAULT_DEPLOYMENT_ACTION_ID: &str = "default";
