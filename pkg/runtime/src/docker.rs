//! Docker backend.
//!
//! Implements the deployment operations against the Docker Engine API.
//! Deployments are looked up purely by their labels; the daemon is the
//! only source of truth.

use std::collections::HashMap;

use async_trait::async_trait;
use bollard::Docker;
use bollard::models::ContainerInspectResponse;
use bollard::query_parameters::{
    InspectContainerOptions, ListContainersOptions, LogsOptions, RemoveContainerOptions,
    RemoveVolumeOptions, StartContainerOptions,
};
use futures_util::StreamExt;
use tracing::{info, warn};

use pkg_constants::labels::{LABEL_DEPLOYMENT_NAME, LABEL_DEPLOYMENT_TYPE, LABEL_PROJECT_NAME};
use pkg_types::deployment::{Deployment, DeploymentRequest, DeploymentType, ResourceAction};

use crate::admission;
use crate::backend::DeploymentBackend;
use crate::capacity::SystemCapacity;
use crate::error::{Result, RuntimeError};
use crate::map::map_container;
use crate::naming;
use crate::network::{NetworkManager, is_not_found};
use crate::spec::build_spec;

/// Settings the Docker backend is constructed with.
#[derive(Debug, Clone)]
pub struct DockerBackendConfig {
    /// System namespace written into every label set.
    pub namespace: String,
    /// Host path prefix for deployment data. When set, data volumes
    /// become host bind mounts under this prefix.
    pub host_data_root: Option<String>,
}

pub struct DockerBackend {
    docker: Docker,
    capacity: SystemCapacity,
    config: DockerBackendConfig,
    network: NetworkManager,
}

impl DockerBackend {
    /// Connect to the local Docker daemon and verify it answers.
    pub async fn connect(capacity: SystemCapacity, config: DockerBackendConfig) -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()?;
        docker.ping().await?;
        info!("Connected to the Docker daemon");

        let network = NetworkManager::new(docker.clone(), config.namespace.clone());
        Ok(Self {
            docker,
            capacity,
            config,
            network,
        })
    }

    async fn inspect_raw(&self, deployment_id: &str) -> Result<ContainerInspectResponse> {
        match self
            .docker
            .inspect_container(deployment_id, None::<InspectContainerOptions>)
            .await
        {
            Ok(response) => Ok(response),
            Err(e) if is_not_found(&e) => {
                Err(RuntimeError::NotFound(deployment_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Inspect a deployment and verify it belongs to the given project and
    /// kind. A foreign container id behaves exactly like a missing one.
    async fn inspect_in_project(
        &self,
        project_id: &str,
        deployment_id: &str,
        kind: Option<DeploymentType>,
    ) -> Result<ContainerInspectResponse> {
        let response = self.inspect_raw(deployment_id).await?;
        let labels = response
            .config
            .as_ref()
            .and_then(|c| c.labels.as_ref());
        let label = |key: &str| labels.and_then(|l| l.get(key)).map(String::as_str);

        if label(LABEL_PROJECT_NAME) != Some(project_id) {
            return Err(RuntimeError::NotFound(deployment_id.to_string()));
        }
        if let Some(kind) = kind {
            if label(LABEL_DEPLOYMENT_TYPE) != Some(kind.as_str()) {
                return Err(RuntimeError::NotFound(deployment_id.to_string()));
            }
        }
        Ok(response)
    }
}

#[async_trait]
impl DeploymentBackend for DockerBackend {
    fn name(&self) -> &str {
        "docker"
    }

    async fn deploy(
        &self,
        project_id: &str,
        request: &DeploymentRequest,
        kind: DeploymentType,
    ) -> Result<Deployment> {
        let spec = build_spec(
            request,
            kind,
            project_id,
            &self.capacity,
            &self.config.namespace,
            self.config.host_data_root.as_deref(),
        )?;

        self.network.ensure_network(project_id).await?;

        let (options, body) = spec.to_create_request();
        info!("Deploying {} {} (image {})", kind, spec.name, spec.image);
        let created = self.docker.create_container(Some(options), body).await?;
        self.docker
            .start_container(&created.id, None::<StartContainerOptions>)
            .await?;

        Ok(map_container(&self.inspect_raw(&created.id).await?))
    }

    async fn list(&self, project_id: &str, kind: DeploymentType) -> Result<Vec<Deployment>> {
        let filters = HashMap::from([(
            "label".to_string(),
            vec![
                format!("{}={}", LABEL_PROJECT_NAME, project_id),
                format!("{}={}", LABEL_DEPLOYMENT_TYPE, kind.as_str()),
            ],
        )]);
        let containers = self
            .docker
            .list_containers(Some(ListContainersOptions {
                all: true,
                filters: Some(filters),
                ..Default::default()
            }))
            .await?;

        let mut deployments = Vec::with_capacity(containers.len());
        for summary in containers {
            let Some(id) = summary.id else { continue };
            // A container may vanish between list and inspect.
            match self.inspect_raw(&id).await {
                Ok(response) => deployments.push(map_container(&response)),
                Err(RuntimeError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(deployments)
    }

    async fn get(
        &self,
        project_id: &str,
        deployment_id: &str,
        kind: DeploymentType,
    ) -> Result<Deployment> {
        let response = self
            .inspect_in_project(project_id, deployment_id, Some(kind))
            .await?;
        Ok(map_container(&response))
    }

    async fn delete(
        &self,
        project_id: &str,
        deployment_id: &str,
        kind: DeploymentType,
        delete_volumes: bool,
    ) -> Result<()> {
        let response = self
            .inspect_in_project(project_id, deployment_id, Some(kind))
            .await?;
        let container_name = response
            .config
            .as_ref()
            .and_then(|c| c.labels.as_ref())
            .and_then(|labels| labels.get(LABEL_DEPLOYMENT_NAME).cloned());

        self.docker
            .remove_container(
                deployment_id,
                Some(RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await?;
        info!("Removed {} {}", kind, deployment_id);

        if delete_volumes {
            if let Some(container_name) = container_name {
                let volume = naming::volume_name(&container_name);
                // Best effort: the deployment may never have had a volume.
                match self
                    .docker
                    .remove_volume(&volume, None::<RemoveVolumeOptions>)
                    .await
                {
                    Ok(()) => info!("Removed volume {}", volume),
                    Err(e) if is_not_found(&e) => {}
                    Err(e) => warn!("Could not remove volume {}: {}", volume, e),
                }
            }
        }

        Ok(())
    }

    async fn logs(
        &self,
        project_id: &str,
        deployment_id: &str,
        tail: Option<usize>,
    ) -> Result<String> {
        // Ensure the id exists and belongs to the project before streaming.
        self.inspect_in_project(project_id, deployment_id, None)
            .await?;

        let options = LogsOptions {
            stdout: true,
            stderr: true,
            tail: tail
                .map(|t| t.to_string())
                .unwrap_or_else(|| "all".to_string()),
            ..Default::default()
        };
        let mut stream = self.docker.logs(deployment_id, Some(options));
        let mut output = String::new();
        while let Some(chunk) = stream.next().await {
            output.push_str(&chunk?.to_string());
        }
        Ok(output)
    }

    async fn deploy_actions(&self, request: &DeploymentRequest) -> Result<Vec<ResourceAction>> {
        Ok(admission::list_deploy_actions(&self.capacity, request))
    }
}
