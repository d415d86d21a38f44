//! Filesystem path constants.

/// Default config file path for the server.
pub const DEFAULT_SERVER_CONFIG: &str = "/etc/wharf/config.yaml";

/// Docker control socket, mounted into containers with the `docker`
/// requirement.
pub const DOCKER_SOCKET_PATH: &str = "/var/run/docker.sock";
