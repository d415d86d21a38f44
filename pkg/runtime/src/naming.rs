//! Deterministic names for containers, networks and volumes.
//!
//! The same project and display name always yield the same names, so
//! lookups never need a stored mapping.

use pkg_constants::network::NETWORK_NAME_PREFIX;
use pkg_types::deployment::DeploymentType;

/// Lowercase a display name and replace every non-alphanumeric run with a
/// single `-`. Leading/trailing dashes are trimmed.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Deterministic container name for a deployment:
/// `<project>-<slug(display_name)>-<kind>`.
pub fn deployment_name(project_id: &str, display_name: &str, kind: DeploymentType) -> String {
    format!("{}-{}-{}", project_id, slugify(display_name), kind.as_str())
}

/// Name of a project's bridge network.
pub fn network_name(project_id: &str) -> String {
    format!("{}{}", NETWORK_NAME_PREFIX, project_id)
}

/// Name of a deployment's data volume.
pub fn volume_name(container_name: &str) -> String {
    format!("{}-data", container_name)
}

// ─── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_collapses_and_trims() {
        assert_eq!(slugify("My  Fancy App!"), "my-fancy-app");
        assert_eq!(slugify("--hello--"), "hello");
        assert_eq!(slugify("Already-Fine"), "already-fine");
    }

    #[test]
    fn test_deployment_name_is_deterministic() {
        let a = deployment_name("proj-1", "ML Workspace", DeploymentType::Service);
        let b = deployment_name("proj-1", "ML Workspace", DeploymentType::Service);
        assert_eq!(a, b);
        assert_eq!(a, "proj-1-ml-workspace-service");
    }

    #[test]
    fn test_kind_distinguishes_names() {
        let service = deployment_name("p", "runner", DeploymentType::Service);
        let job = deployment_name("p", "runner", DeploymentType::Job);
        assert_ne!(service, job);
        assert!(job.ends_with("-job"));
    }

    #[test]
    fn test_network_and_volume_names() {
        assert_eq!(network_name("proj-1"), "wharf-project-proj-1");
        assert_eq!(volume_name("proj-1-app-service"), "proj-1-app-service-data");
    }
}
