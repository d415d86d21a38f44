use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

use crate::AppState;
use crate::handlers::deployments;

/// Server configuration passed from the binary's CLI.
pub struct ServerConfig {
    pub addr: SocketAddr,
}

pub async fn start_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let app = Router::new()
        // services
        .route(
            "/api/v1/projects/{project}/services",
            post(deployments::deploy_service).get(deployments::list_services),
        )
        .route(
            "/api/v1/projects/{project}/services/deploy-actions",
            post(deployments::list_service_deploy_actions),
        )
        .route(
            "/api/v1/projects/{project}/services/{id}",
            get(deployments::get_service).delete(deployments::delete_service),
        )
        .route(
            "/api/v1/projects/{project}/services/{id}/logs",
            get(deployments::get_service_logs),
        )
        // jobs
        .route(
            "/api/v1/projects/{project}/jobs",
            post(deployments::deploy_job).get(deployments::list_jobs),
        )
        .route(
            "/api/v1/projects/{project}/jobs/deploy-actions",
            post(deployments::list_job_deploy_actions),
        )
        .route(
            "/api/v1/projects/{project}/jobs/{id}",
            get(deployments::get_job).delete(deployments::delete_job),
        )
        .route(
            "/api/v1/projects/{project}/jobs/{id}/logs",
            get(deployments::get_job_logs),
        )
        .with_state(state);

    info!("Starting API server on {}", config.addr);
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
