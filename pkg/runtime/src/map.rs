//! Runtime state mapping.
//!
//! Reconstructs a typed `Deployment` from a container inspect response.
//! The mapping is total: whatever the runtime returns, decoding labels
//! and status never fails.

use std::collections::HashMap;

use bollard::models::ContainerInspectResponse;

use pkg_types::deployment::{Deployment, DeploymentCompute, DeploymentStatus};

use crate::labels::decode_labels;

/// Map an inspect response to a deployment record.
pub fn map_container(container: &ContainerInspectResponse) -> Deployment {
    let config = container.config.as_ref();
    let raw_labels = config
        .and_then(|c| c.labels.clone())
        .unwrap_or_default();
    let labels = decode_labels(&raw_labels);

    let host_config = container.host_config.as_ref();
    let compute = DeploymentCompute {
        max_cpus: host_config
            .and_then(|hc| hc.nano_cpus)
            .filter(|nano| *nano > 0)
            .map(|nano| nano as f64 / 1e9),
        max_memory: host_config
            .and_then(|hc| hc.memory)
            .filter(|bytes| *bytes > 0)
            .map(|bytes| (bytes / 1_000_000) as u64),
        // Not recoverable from a live container.
        max_gpus: None,
        min_lifetime: labels.min_lifetime.clone(),
        volume_path: labels.volume_path.clone(),
        ..Default::default()
    };

    let status = match container.state.as_ref().and_then(|s| s.status) {
        Some(status) => DeploymentStatus::from_container_status(&status.to_string()),
        None => DeploymentStatus::Unknown,
    };

    let state = container.state.as_ref();
    let id = container.id.clone().unwrap_or_default();

    let command = container
        .args
        .as_ref()
        .filter(|args| !args.is_empty())
        .map(|args| args.join(" "));

    Deployment {
        internal_id: id.clone(),
        id,
        display_name: labels.display_name,
        container_image: config
            .and_then(|c| c.image.clone())
            .unwrap_or_default(),
        command,
        deployment_type: labels.deployment_type,
        status,
        compute,
        parameters: transform_env_list(config.and_then(|c| c.env.as_deref()).unwrap_or(&[])),
        metadata: labels.metadata,
        endpoints: labels.endpoints,
        requirements: labels.requirements,
        description: labels.description,
        icon: labels.icon,
        started_at: state.and_then(|s| s.started_at.clone()),
        stopped_at: state.and_then(|s| s.finished_at.clone()),
    }
}

/// Turn `KEY=VALUE` env lines back into a map. Splits on the first `=`;
/// a line without one becomes a key with an empty value.
fn transform_env_list(envs: &[String]) -> HashMap<String, String> {
    envs.iter()
        .map(|env| match env.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (env.clone(), String::new()),
        })
        .collect()
}

// ─── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{
        ContainerConfig, ContainerState, ContainerStateStatusEnum, HostConfig,
    };
    use pkg_types::deployment::DeploymentType;

    fn inspect_response() -> ContainerInspectResponse {
        ContainerInspectResponse {
            id: Some("abc123".to_string()),
            args: Some(vec!["-m".to_string(), "http.server".to_string()]),
            config: Some(ContainerConfig {
                image: Some("registry.example.com/workspace:1.0".to_string()),
                env: Some(vec![
                    "FOO=bar".to_string(),
                    "EQUALS=a=b".to_string(),
                    "EMPTY".to_string(),
                ]),
                labels: Some(HashMap::from([
                    ("wharf.projectName".to_string(), "proj-1".to_string()),
                    ("wharf.displayName".to_string(), "My App".to_string()),
                    ("wharf.deploymentType".to_string(), "service".to_string()),
                    ("wharf.minLifetime".to_string(), "3600".to_string()),
                ])),
                ..Default::default()
            }),
            host_config: Some(HostConfig {
                nano_cpus: Some(2_000_000_000),
                memory: Some(512_000_000),
                ..Default::default()
            }),
            state: Some(ContainerState {
                status: Some(ContainerStateStatusEnum::RUNNING),
                started_at: Some("2024-03-01T10:00:00.0Z".to_string()),
                finished_at: Some("0001-01-01T00:00:00Z".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_maps_full_response() {
        let deployment = map_container(&inspect_response());

        assert_eq!(deployment.id, "abc123");
        assert_eq!(deployment.internal_id, "abc123");
        assert_eq!(deployment.display_name.as_deref(), Some("My App"));
        assert_eq!(deployment.deployment_type, Some(DeploymentType::Service));
        assert_eq!(deployment.status, DeploymentStatus::Running);
        assert_eq!(deployment.command.as_deref(), Some("-m http.server"));
        assert_eq!(deployment.compute.max_cpus, Some(2.0));
        assert_eq!(deployment.compute.max_memory, Some(512));
        assert_eq!(deployment.compute.max_gpus, None);
        assert_eq!(deployment.compute.min_lifetime.as_deref(), Some("3600"));
        assert_eq!(
            deployment.started_at.as_deref(),
            Some("2024-03-01T10:00:00.0Z")
        );
    }

    #[test]
    fn test_env_splits_on_first_equals() {
        let deployment = map_container(&inspect_response());
        assert_eq!(deployment.parameters.get("FOO").map(String::as_str), Some("bar"));
        assert_eq!(
            deployment.parameters.get("EQUALS").map(String::as_str),
            Some("a=b")
        );
        assert_eq!(deployment.parameters.get("EMPTY").map(String::as_str), Some(""));
    }

    #[test]
    fn test_status_enum_mapping() {
        let mut response = inspect_response();
        let cases = [
            (ContainerStateStatusEnum::CREATED, DeploymentStatus::Pending),
            (ContainerStateStatusEnum::RESTARTING, DeploymentStatus::Running),
            (ContainerStateStatusEnum::PAUSED, DeploymentStatus::Paused),
            (ContainerStateStatusEnum::REMOVING, DeploymentStatus::Terminated),
            (ContainerStateStatusEnum::EXITED, DeploymentStatus::Stopped),
            (ContainerStateStatusEnum::DEAD, DeploymentStatus::Failed),
            (ContainerStateStatusEnum::EMPTY, DeploymentStatus::Unknown),
        ];
        for (runtime_status, expected) in cases {
            response.state.as_mut().unwrap().status = Some(runtime_status);
            assert_eq!(map_container(&response).status, expected);
        }
    }

    #[test]
    fn test_empty_response_maps_to_unknown() {
        let deployment = map_container(&ContainerInspectResponse::default());
        assert_eq!(deployment.status, DeploymentStatus::Unknown);
        assert!(deployment.id.is_empty());
        assert!(deployment.command.is_none());
        assert!(deployment.compute.max_cpus.is_none());
        assert!(deployment.parameters.is_empty());
    }
}
