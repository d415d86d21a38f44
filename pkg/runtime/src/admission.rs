//! Resource admission policy.
//!
//! Pure checks of a request's minimal requirements against the detected
//! system capacity. Runs before any runtime call so a rejected request
//! leaves no partial state behind.

use pkg_constants::runtime::DEFAULT_DEPLOYMENT_ACTION_ID;
use pkg_types::deployment::{DeploymentCompute, DeploymentRequest, ResourceAction};

use crate::capacity::SystemCapacity;
use crate::error::{Result, RuntimeError};

/// Extract the minimal requirements from a compute descriptor.
/// Absent minimums count as zero and always pass.
pub fn minimal_resources(compute: &DeploymentCompute) -> (f64, u64, u32) {
    (
        compute.min_cpus.unwrap_or(0.0),
        compute.min_memory.unwrap_or(0),
        compute.min_gpus.unwrap_or(0),
    )
}

/// Check minimal requirements against capacity.
///
/// When `compute` is given, configurations this backend cannot honor at
/// all (replicas) are rejected too.
pub fn check_minimal_resources(
    capacity: &SystemCapacity,
    min_cpus: f64,
    min_memory_mb: u64,
    min_gpus: u32,
    compute: Option<&DeploymentCompute>,
) -> Result<()> {
    if min_cpus > capacity.cpu_count as f64 {
        return Err(RuntimeError::ResourceExceeded {
            resource: "cpus",
            requested: min_cpus.to_string(),
            available: capacity.cpu_count.to_string(),
        });
    }
    if min_memory_mb > capacity.memory_mb {
        return Err(RuntimeError::ResourceExceeded {
            resource: "memory (MB)",
            requested: min_memory_mb.to_string(),
            available: capacity.memory_mb.to_string(),
        });
    }
    if min_gpus > capacity.gpu_count {
        return Err(RuntimeError::ResourceExceeded {
            resource: "gpus",
            requested: min_gpus.to_string(),
            available: capacity.gpu_count.to_string(),
        });
    }

    if let Some(compute) = compute {
        if compute.max_replicas.is_some() {
            return Err(RuntimeError::UnsupportedConfiguration(
                "replicas are not supported by the docker backend".to_string(),
            ));
        }
    }

    Ok(())
}

/// Actions offered for a deploy request: the default deploy action, or
/// nothing at all when the request would fail admission.
pub fn list_deploy_actions(
    capacity: &SystemCapacity,
    request: &DeploymentRequest,
) -> Vec<ResourceAction> {
    let compute = request.compute.clone().unwrap_or_default();
    let (min_cpus, min_memory_mb, min_gpus) = minimal_resources(&compute);
    if check_minimal_resources(capacity, min_cpus, min_memory_mb, min_gpus, None).is_err() {
        return Vec::new();
    }

    vec![ResourceAction {
        action_id: DEFAULT_DEPLOYMENT_ACTION_ID.to_string(),
        display_name: DEFAULT_DEPLOYMENT_ACTION_ID.to_string(),
    }]
}

// ─── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn capacity() -> SystemCapacity {
        SystemCapacity {
            cpu_count: 8,
            memory_mb: 16_000,
            gpu_count: 0,
        }
    }

    #[test]
    fn test_within_capacity_passes() {
        assert!(check_minimal_resources(&capacity(), 4.0, 8_000, 0, None).is_ok());
    }

    #[test]
    fn test_absent_minimums_pass() {
        let compute = DeploymentCompute::default();
        let (cpus, memory, gpus) = minimal_resources(&compute);
        assert!(check_minimal_resources(&capacity(), cpus, memory, gpus, Some(&compute)).is_ok());
    }

    #[test]
    fn test_min_cpus_over_capacity_rejected() {
        let err = check_minimal_resources(&capacity(), 16.0, 0, 0, None).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::ResourceExceeded { resource: "cpus", .. }
        ));
    }

    #[test]
    fn test_min_memory_over_capacity_rejected() {
        let err = check_minimal_resources(&capacity(), 0.0, 32_000, 0, None).unwrap_err();
        assert!(matches!(err, RuntimeError::ResourceExceeded { .. }));
    }

    #[test]
    fn test_min_gpus_over_capacity_rejected() {
        let err = check_minimal_resources(&capacity(), 0.0, 0, 1, None).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::ResourceExceeded { resource: "gpus", .. }
        ));
    }

    #[test]
    fn test_replicas_rejected() {
        let compute = DeploymentCompute {
            max_replicas: Some(3),
            ..Default::default()
        };
        let err = check_minimal_resources(&capacity(), 0.0, 0, 0, Some(&compute)).unwrap_err();
        assert!(matches!(err, RuntimeError::UnsupportedConfiguration(_)));
    }

    #[test]
    fn test_deploy_actions_default() {
        let request = DeploymentRequest {
            container_image: "nginx:latest".to_string(),
            ..Default::default()
        };
        let actions = list_deploy_actions(&capacity(), &request);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_id, DEFAULT_DEPLOYMENT_ACTION_ID);
    }

    #[test]
    fn test_deploy_actions_empty_when_unsatisfiable() {
        let request = DeploymentRequest {
            container_image: "nginx:latest".to_string(),
            compute: Some(DeploymentCompute {
                min_gpus: Some(2),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(list_deploy_actions(&capacity(), &request).is_empty());
    }
}
