//! Deployment backend seam.
//!
//! Everything above this trait is runtime-agnostic; a backend translates
//! the operations to one concrete container runtime. The Docker backend
//! is the one that ships, further runtimes plug in behind the trait.

use async_trait::async_trait;

use pkg_types::deployment::{Deployment, DeploymentRequest, DeploymentType, ResourceAction};

use crate::error::Result;

#[async_trait]
pub trait DeploymentBackend: Send + Sync {
    /// Backend name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Validate, create and start a deployment, returning its mapped state.
    async fn deploy(
        &self,
        project_id: &str,
        request: &DeploymentRequest,
        kind: DeploymentType,
    ) -> Result<Deployment>;

    /// All deployments of the given kind in a project.
    async fn list(&self, project_id: &str, kind: DeploymentType) -> Result<Vec<Deployment>>;

    /// A single deployment by id. Fails with `NotFound` when the id does
    /// not exist or belongs to another project.
    async fn get(
        &self,
        project_id: &str,
        deployment_id: &str,
        kind: DeploymentType,
    ) -> Result<Deployment>;

    /// Remove a deployment, optionally with its data volume.
    async fn delete(
        &self,
        project_id: &str,
        deployment_id: &str,
        kind: DeploymentType,
        delete_volumes: bool,
    ) -> Result<()>;

    /// The deployment's log output, optionally limited to the last `tail`
    /// lines.
    async fn logs(
        &self,
        project_id: &str,
        deployment_id: &str,
        tail: Option<usize>,
    ) -> Result<String>;

    /// Actions offered for a deploy request, empty when the request would
    /// fail admission.
    async fn deploy_actions(&self, request: &DeploymentRequest) -> Result<Vec<ResourceAction>>;
}
