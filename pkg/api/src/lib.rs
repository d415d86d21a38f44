pub mod handlers;
pub mod server;

use std::sync::Arc;

use pkg_runtime::DeploymentBackend;

/// Shared application state injected into all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn DeploymentBackend>,
}
