//! Container spec construction.
//!
//! Translates a validated deployment request into the exact create call
//! the runtime receives. Pure except for the admission check input; the
//! network is referenced by its deterministic name only.

use std::collections::HashMap;

use bollard::models::{
    ContainerCreateBody, HostConfig, Mount, MountTypeEnum, MountVolumeOptions, RestartPolicy,
    RestartPolicyNameEnum,
};
use bollard::query_parameters::CreateContainerOptions;

use pkg_constants::labels::{LABEL_DEPLOYMENT_NAME, LABEL_NAMESPACE, LABEL_PROJECT_NAME};
use pkg_constants::paths::DOCKER_SOCKET_PATH;
use pkg_constants::runtime::{
    DEFAULT_MAX_CPUS, DEFAULT_MAX_MEMORY_MB, DOCKER_REQUIREMENT, GPU_VISIBLE_DEVICES_ENV,
    MAX_VOLUME_SIZE_ENV_SUFFIX, MIN_MEMORY_MB, RESTART_POLICY_MAX_RETRIES,
};
use pkg_types::deployment::{DeploymentRequest, DeploymentType};

use crate::admission;
use crate::capacity::SystemCapacity;
use crate::error::{Result, RuntimeError};
use crate::labels::encode_labels;
use crate::naming;

/// Everything needed to create and start one container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// Whitespace-split command, `None` runs the image entrypoint.
    pub command: Option<Vec<String>>,
    /// `KEY=VALUE` lines, sorted so the spec is deterministic.
    pub env: Vec<String>,
    pub labels: HashMap<String, String>,
    pub nano_cpus: i64,
    pub memory_bytes: i64,
    /// Name of the project network the container is attached to.
    pub network: String,
    /// `None` when there is nothing to mount.
    pub mounts: Option<Vec<Mount>>,
}

/// Build the container spec for a deployment request.
///
/// Rejects requests without a display name, runs admission, clamps the
/// limits to system capacity and flattens the request into labels.
pub fn build_spec(
    request: &DeploymentRequest,
    kind: DeploymentType,
    project_id: &str,
    capacity: &SystemCapacity,
    namespace: &str,
    host_data_root: Option<&str>,
) -> Result<ContainerSpec> {
    let Some(display_name) = request.display_name.as_deref() else {
        return Err(RuntimeError::InvalidRequest(
            "deployment display name is not defined".to_string(),
        ));
    };

    let compute = request.compute.clone().unwrap_or_default();
    let (min_cpus, min_memory_mb, min_gpus) = admission::minimal_resources(&compute);
    admission::check_minimal_resources(
        capacity,
        min_cpus,
        min_memory_mb,
        min_gpus,
        Some(&compute),
    )?;

    let name = naming::deployment_name(project_id, display_name, kind);

    // Requested limits are capped by what the system actually has.
    let max_cpus = compute.max_cpus.unwrap_or(DEFAULT_MAX_CPUS);
    let nano_cpus = (max_cpus.min(capacity.cpu_count as f64) * 1e9) as i64;
    // Docker needs a few MB to start a container at all, so the memory
    // limit has a floor as well as the capacity cap.
    let max_memory_mb = compute.max_memory.unwrap_or(DEFAULT_MAX_MEMORY_MB);
    let memory_mb = max_memory_mb.min(capacity.memory_mb).max(MIN_MEMORY_MB);
    let memory_bytes = (memory_mb * 1_000_000) as i64;

    let mut env = request.parameters.clone();
    // Which GPUs a container sees is decided here, never by the caller.
    env.remove(GPU_VISIBLE_DEVICES_ENV);
    if let Some(max_gpus) = compute.max_gpus {
        if max_gpus > 0 {
            env.insert(GPU_VISIBLE_DEVICES_ENV.to_string(), max_gpus.to_string());
        }
    }
    if let Some(max_volume_size) = compute.max_volume_size {
        env.insert(
            format!(
                "{}{}",
                namespace.to_uppercase(),
                MAX_VOLUME_SIZE_ENV_SUFFIX
            ),
            max_volume_size.to_string(),
        );
    }
    let mut env: Vec<String> = env
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();
    env.sort();

    let command = request.command.as_deref().and_then(|line| {
        let parts: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if parts.is_empty() { None } else { Some(parts) }
    });

    let mounts = build_mounts(request, &compute, project_id, &name, namespace, host_data_root);

    Ok(ContainerSpec {
        labels: encode_labels(request, kind, project_id, &name, namespace),
        image: request.container_image.clone(),
        network: naming::network_name(project_id),
        name,
        command,
        env,
        nano_cpus,
        memory_bytes,
        mounts: if mounts.is_empty() { None } else { Some(mounts) },
    })
}

/// Mounts for a deployment: the Docker control socket when the request
/// carries the `docker` requirement, and the data volume when a volume
/// path is set. With a configured host data root the volume becomes a
/// host bind mount instead of a named volume.
fn build_mounts(
    request: &DeploymentRequest,
    compute: &pkg_types::deployment::DeploymentCompute,
    project_id: &str,
    container_name: &str,
    namespace: &str,
    host_data_root: Option<&str>,
) -> Vec<Mount> {
    let mut mounts = Vec::new();

    if request.requirements.iter().any(|r| r == DOCKER_REQUIREMENT) {
        // TODO: surface the extended privileges to the admission layer so
        // non-admins cannot request the control socket.
        mounts.push(Mount {
            target: Some(DOCKER_SOCKET_PATH.to_string()),
            source: Some(DOCKER_SOCKET_PATH.to_string()),
            typ: Some(MountTypeEnum::BIND),
            ..Default::default()
        });
    }

    if let Some(volume_path) = compute.volume_path.as_deref() {
        if !volume_path.is_empty() {
            let volume = naming::volume_name(container_name);
            let mount_labels = HashMap::from([
                (LABEL_NAMESPACE.to_string(), namespace.to_string()),
                (LABEL_PROJECT_NAME.to_string(), project_id.to_string()),
                (
                    LABEL_DEPLOYMENT_NAME.to_string(),
                    container_name.to_string(),
                ),
            ]);
            let mount = match host_data_root {
                Some(root) => Mount {
                    target: Some(volume_path.to_string()),
                    source: Some(format!("{}{}", root, volume)),
                    typ: Some(MountTypeEnum::BIND),
                    ..Default::default()
                },
                None => Mount {
                    target: Some(volume_path.to_string()),
                    source: Some(volume),
                    typ: Some(MountTypeEnum::VOLUME),
                    volume_options: Some(MountVolumeOptions {
                        labels: Some(mount_labels),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
            };
            mounts.push(mount);
        }
    }

    mounts
}

impl ContainerSpec {
    /// Lower the spec into the runtime's create-container call.
    pub fn to_create_request(&self) -> (CreateContainerOptions, ContainerCreateBody) {
        let host_config = HostConfig {
            nano_cpus: Some(self.nano_cpus),
            memory: Some(self.memory_bytes),
            mounts: self.mounts.clone(),
            network_mode: Some(self.network.clone()),
            restart_policy: Some(RestartPolicy {
                name: Some(RestartPolicyNameEnum::ON_FAILURE),
                maximum_retry_count: Some(RESTART_POLICY_MAX_RETRIES),
            }),
            ..Default::default()
        };

        let body = ContainerCreateBody {
            image: Some(self.image.clone()),
            cmd: self.command.clone(),
            env: if self.env.is_empty() {
                None
            } else {
                Some(self.env.clone())
            },
            labels: Some(self.labels.clone()),
            host_config: Some(host_config),
            ..Default::default()
        };

        let options = CreateContainerOptions {
            name: Some(self.name.clone()),
            platform: String::new(),
        };

        (options, body)
    }
}

// ─── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_types::deployment::DeploymentCompute;

    fn capacity() -> SystemCapacity {
        SystemCapacity {
            cpu_count: 8,
            memory_mb: 16_000,
            gpu_count: 2,
        }
    }

    fn request(compute: Option<DeploymentCompute>) -> DeploymentRequest {
        DeploymentRequest {
            container_image: "registry.example.com/workspace:1.0".to_string(),
            display_name: Some("My App".to_string()),
            compute,
            ..Default::default()
        }
    }

    fn build(request: &DeploymentRequest) -> Result<ContainerSpec> {
        build_spec(
            request,
            DeploymentType::Service,
            "proj-1",
            &capacity(),
            "wharf",
            None,
        )
    }

    #[test]
    fn test_missing_display_name_rejected() {
        let mut r = request(None);
        r.display_name = None;
        assert!(matches!(build(&r), Err(RuntimeError::InvalidRequest(_))));
    }

    #[test]
    fn test_defaults_one_cpu_min_memory() {
        let spec = build(&request(None)).unwrap();
        assert_eq!(spec.nano_cpus, 1_000_000_000);
        assert_eq!(spec.memory_bytes, 6_000_000);
        assert_eq!(spec.name, "proj-1-my-app-service");
        assert_eq!(spec.network, "wharf-project-proj-1");
        assert!(spec.mounts.is_none());
    }

    #[test]
    fn test_cpu_capped_at_system() {
        let spec = build(&request(Some(DeploymentCompute {
            max_cpus: Some(16.0),
            ..Default::default()
        })))
        .unwrap();
        assert_eq!(spec.nano_cpus, 8_000_000_000);
    }

    #[test]
    fn test_memory_floor() {
        let spec = build(&request(Some(DeploymentCompute {
            max_memory: Some(2),
            ..Default::default()
        })))
        .unwrap();
        assert_eq!(spec.memory_bytes, 6_000_000);
    }

    #[test]
    fn test_memory_capped_at_system() {
        let spec = build(&request(Some(DeploymentCompute {
            max_memory: Some(64_000),
            ..Default::default()
        })))
        .unwrap();
        assert_eq!(spec.memory_bytes, 16_000_000_000);
    }

    #[test]
    fn test_caller_gpu_selection_stripped() {
        let mut r = request(None);
        r.parameters
            .insert("NVIDIA_VISIBLE_DEVICES".to_string(), "all".to_string());
        let spec = build(&r).unwrap();
        assert!(spec.env.iter().all(|e| !e.starts_with("NVIDIA_VISIBLE_DEVICES")));
    }

    #[test]
    fn test_gpu_count_injected() {
        let spec = build(&request(Some(DeploymentCompute {
            max_gpus: Some(2),
            ..Default::default()
        })))
        .unwrap();
        assert!(spec.env.contains(&"NVIDIA_VISIBLE_DEVICES=2".to_string()));
    }

    #[test]
    fn test_volume_size_env_is_namespaced() {
        let spec = build(&request(Some(DeploymentCompute {
            max_volume_size: Some(500),
            ..Default::default()
        })))
        .unwrap();
        assert!(spec.env.contains(&"WHARF_MAX_VOLUME_SIZE_MB=500".to_string()));
    }

    #[test]
    fn test_docker_requirement_mounts_socket() {
        let mut r = request(None);
        r.requirements.push("docker".to_string());
        let spec = build(&r).unwrap();
        let mounts = spec.mounts.unwrap();
        assert_eq!(mounts.len(), 1);
        assert_eq!(
            mounts[0].source.as_deref(),
            Some("/var/run/docker.sock")
        );
        assert_eq!(mounts[0].typ, Some(MountTypeEnum::BIND));
    }

    #[test]
    fn test_volume_path_yields_named_volume() {
        let spec = build(&request(Some(DeploymentCompute {
            volume_path: Some("/workspace".to_string()),
            ..Default::default()
        })))
        .unwrap();
        let mounts = spec.mounts.unwrap();
        assert_eq!(mounts[0].typ, Some(MountTypeEnum::VOLUME));
        assert_eq!(
            mounts[0].source.as_deref(),
            Some("proj-1-my-app-service-data")
        );
    }

    #[test]
    fn test_host_data_root_switches_to_bind() {
        let spec = build_spec(
            &request(Some(DeploymentCompute {
                volume_path: Some("/workspace".to_string()),
                ..Default::default()
            })),
            DeploymentType::Service,
            "proj-1",
            &capacity(),
            "wharf",
            Some("/mnt/wharf-data/"),
        )
        .unwrap();
        let mounts = spec.mounts.unwrap();
        assert_eq!(mounts[0].typ, Some(MountTypeEnum::BIND));
        assert_eq!(
            mounts[0].source.as_deref(),
            Some("/mnt/wharf-data/proj-1-my-app-service-data")
        );
    }

    #[test]
    fn test_command_is_whitespace_split() {
        let mut r = request(None);
        r.command = Some("python -m http.server 8080".to_string());
        let spec = build(&r).unwrap();
        assert_eq!(
            spec.command,
            Some(vec![
                "python".to_string(),
                "-m".to_string(),
                "http.server".to_string(),
                "8080".to_string(),
            ])
        );

        r.command = Some("   ".to_string());
        assert!(build(&r).unwrap().command.is_none());
    }

    #[test]
    fn test_create_request_shape() {
        let spec = build(&request(None)).unwrap();
        let (options, body) = spec.to_create_request();
        assert_eq!(options.name.as_deref(), Some("proj-1-my-app-service"));
        let host_config = body.host_config.unwrap();
        assert_eq!(host_config.nano_cpus, Some(1_000_000_000));
        assert_eq!(host_config.memory, Some(6_000_000));
        let restart = host_config.restart_policy.unwrap();
        assert_eq!(restart.name, Some(RestartPolicyNameEnum::ON_FAILURE));
        assert_eq!(restart.maximum_retry_count, Some(10));
        assert!(body.env.is_none());
    }
}
