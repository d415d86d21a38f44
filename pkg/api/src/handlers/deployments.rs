use axum::{
    Json,
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{info, warn};

use pkg_runtime::RuntimeError;
use pkg_types::deployment::{DeploymentRequest, DeploymentType};

use crate::AppState;

/// Query parameters for deleting a deployment.
#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub delete_volumes: bool,
}

/// Query parameters for fetching logs.
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    #[serde(default)]
    pub lines: Option<usize>,
}

/// Map a core error to the HTTP status it travels out with.
fn error_response(err: RuntimeError) -> Response {
    let status = match &err {
        RuntimeError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        RuntimeError::ResourceExceeded { .. } | RuntimeError::UnsupportedConfiguration(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RuntimeError::NotFound(_) => StatusCode::NOT_FOUND,
        RuntimeError::AddressSpaceExhausted
        | RuntimeError::NetworkSetupFailed(_)
        | RuntimeError::RuntimeCall(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        warn!("Deployment operation failed: {}", err);
    }
    (status, err.to_string()).into_response()
}

// ============================================================
// Shared implementations
// ============================================================

async fn deploy(
    state: AppState,
    project: String,
    request: DeploymentRequest,
    kind: DeploymentType,
) -> Response {
    match state.backend.deploy(&project, &request, kind).await {
        Ok(deployment) => {
            info!("Deployed {} {} in project {}", kind, deployment.id, project);
            (StatusCode::CREATED, Json(deployment)).into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn list(state: AppState, project: String, kind: DeploymentType) -> Response {
    match state.backend.list(&project, kind).await {
        Ok(deployments) => (StatusCode::OK, Json(deployments)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn get_one(state: AppState, project: String, id: String, kind: DeploymentType) -> Response {
    match state.backend.get(&project, &id, kind).await {
        Ok(deployment) => (StatusCode::OK, Json(deployment)).into_response(),
        Err(e) => error_response(e),
    }
}

async fn delete_one(
    state: AppState,
    project: String,
    id: String,
    kind: DeploymentType,
    delete_volumes: bool,
) -> Response {
    match state
        .backend
        .delete(&project, &id, kind, delete_volumes)
        .await
    {
        Ok(()) => {
            info!("Deleted {} {} in project {}", kind, id, project);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => error_response(e),
    }
}

async fn get_logs(state: AppState, project: String, id: String, lines: Option<usize>) -> Response {
    match state.backend.logs(&project, &id, lines).await {
        Ok(logs) => (StatusCode::OK, logs).into_response(),
        Err(e) => error_response(e),
    }
}

async fn deploy_actions(state: AppState, request: DeploymentRequest) -> Response {
    match state.backend.deploy_actions(&request).await {
        Ok(actions) => (StatusCode::OK, Json(actions)).into_response(),
        Err(e) => error_response(e),
    }
}

// ============================================================
// Services
// ============================================================

pub async fn deploy_service(
    State(state): State<AppState>,
    AxumPath(project): AxumPath<String>,
    Json(request): Json<DeploymentRequest>,
) -> impl IntoResponse {
    deploy(state, project, request, DeploymentType::Service).await
}

pub async fn list_services(
    State(state): State<AppState>,
    AxumPath(project): AxumPath<String>,
) -> impl IntoResponse {
    list(state, project, DeploymentType::Service).await
}

pub async fn get_service(
    State(state): State<AppState>,
    AxumPath((project, id)): AxumPath<(String, String)>,
) -> impl IntoResponse {
    get_one(state, project, id, DeploymentType::Service).await
}

pub async fn delete_service(
    State(state): State<AppState>,
    AxumPath((project, id)): AxumPath<(String, String)>,
    Query(query): Query<DeleteQuery>,
) -> impl IntoResponse {
    delete_one(
        state,
        project,
        id,
        DeploymentType::Service,
        query.delete_volumes,
    )
    .await
}

pub async fn get_service_logs(
    State(state): State<AppState>,
    AxumPath((project, id)): AxumPath<(String, String)>,
    Query(query): Query<LogsQuery>,
) -> impl IntoResponse {
    get_logs(state, project, id, query.lines).await
}

pub async fn list_service_deploy_actions(
    State(state): State<AppState>,
    AxumPath(_project): AxumPath<String>,
    Json(request): Json<DeploymentRequest>,
) -> impl IntoResponse {
    deploy_actions(state, request).await
}

// ============================================================
// Jobs
// ============================================================

pub async fn deploy_job(
    State(state): State<AppState>,
    AxumPath(project): AxumPath<String>,
    Json(request): Json<DeploymentRequest>,
) -> impl IntoResponse {
    deploy(state, project, request, DeploymentType::Job).await
}

pub async fn list_jobs(
    State(state): State<AppState>,
    AxumPath(project): AxumPath<String>,
) -> impl IntoResponse {
    list(state, project, DeploymentType::Job).await
}

pub async fn get_job(
    State(state): State<AppState>,
    AxumPath((project, id)): AxumPath<(String, String)>,
) -> impl IntoResponse {
    get_one(state, project, id, DeploymentType::Job).await
}

pub async fn delete_job(
    State(state): State<AppState>,
    AxumPath((project, id)): AxumPath<(String, String)>,
    Query(query): Query<DeleteQuery>,
) -> impl IntoResponse {
    delete_one(state, project, id, DeploymentType::Job, query.delete_volumes).await
}

pub async fn get_job_logs(
    State(state): State<AppState>,
    AxumPath((project, id)): AxumPath<(String, String)>,
    Query(query): Query<LogsQuery>,
) -> impl IntoResponse {
    get_logs(state, project, id, query.lines).await
}

pub async fn list_job_deploy_actions(
    State(state): State<AppState>,
    AxumPath(_project): AxumPath<String>,
    Json(request): Json<DeploymentRequest>,
) -> impl IntoResponse {
    deploy_actions(state, request).await
}
