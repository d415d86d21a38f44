//! Bidirectional label codec.
//!
//! A deployment's typed state is flattened into container labels under the
//! reserved `wharf.` prefix and reconstructed from them on read. Encoding
//! omits absent fields; decoding never fails, missing or malformed keys
//! degrade to empty values.

use std::collections::HashMap;

use pkg_constants::labels::*;
use pkg_types::deployment::{DeploymentRequest, DeploymentType};

/// Typed view of a container's labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedLabels {
    pub namespace: Option<String>,
    pub project_name: Option<String>,
    pub deployment_name: Option<String>,
    pub display_name: Option<String>,
    pub deployment_type: Option<DeploymentType>,
    pub min_lifetime: Option<String>,
    pub endpoints: Vec<String>,
    pub requirements: Vec<String>,
    pub volume_path: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub metadata: HashMap<String, String>,
}

/// Flatten a request into the reserved label set.
///
/// List fields are comma-joined; absent options are omitted entirely.
/// User metadata goes under `wharf.meta.`; metadata keys that collide
/// with the reserved prefix are dropped.
pub fn encode_labels(
    request: &DeploymentRequest,
    kind: DeploymentType,
    project_id: &str,
    container_name: &str,
    namespace: &str,
) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    labels.insert(LABEL_NAMESPACE.to_string(), namespace.to_string());
    labels.insert(LABEL_PROJECT_NAME.to_string(), project_id.to_string());
    labels.insert(
        LABEL_DEPLOYMENT_NAME.to_string(),
        container_name.to_string(),
    );
    labels.insert(
        LABEL_DEPLOYMENT_TYPE.to_string(),
        kind.as_str().to_string(),
    );

    if let Some(display_name) = &request.display_name {
        labels.insert(LABEL_DISPLAY_NAME.to_string(), display_name.clone());
    }
    if let Some(description) = &request.description {
        labels.insert(LABEL_DESCRIPTION.to_string(), description.clone());
    }
    if let Some(icon) = &request.icon {
        labels.insert(LABEL_ICON.to_string(), icon.clone());
    }
    if !request.endpoints.is_empty() {
        labels.insert(LABEL_ENDPOINTS.to_string(), request.endpoints.join(","));
    }
    if !request.requirements.is_empty() {
        labels.insert(
            LABEL_REQUIREMENTS.to_string(),
            request.requirements.join(","),
        );
    }
    if let Some(compute) = &request.compute {
        if let Some(min_lifetime) = &compute.min_lifetime {
            labels.insert(LABEL_MIN_LIFETIME.to_string(), min_lifetime.clone());
        }
        if let Some(volume_path) = &compute.volume_path {
            labels.insert(LABEL_VOLUME_PATH.to_string(), volume_path.clone());
        }
    }

    for (key, value) in &request.metadata {
        // Reserved keys cannot be smuggled in through metadata.
        if key.starts_with(LABEL_PREFIX) || key.is_empty() {
            continue;
        }
        labels.insert(format!("{}{}", LABEL_METADATA_PREFIX, key), value.clone());
    }

    labels
}

/// Reconstruct the typed view from raw container labels.
///
/// Reserved keys are consumed into their fields; `wharf.meta.*` keys are
/// stripped back into metadata; any other key (e.g. image-baked labels)
/// surfaces in metadata verbatim. Unrecognized `wharf.*` keys are ignored.
pub fn decode_labels(labels: &HashMap<String, String>) -> DecodedLabels {
    let mut decoded = DecodedLabels::default();

    for (key, value) in labels {
        match key.as_str() {
            LABEL_NAMESPACE => decoded.namespace = Some(value.clone()),
            LABEL_PROJECT_NAME => decoded.project_name = Some(value.clone()),
            LABEL_DEPLOYMENT_NAME => decoded.deployment_name = Some(value.clone()),
            LABEL_DISPLAY_NAME => decoded.display_name = Some(value.clone()),
            LABEL_DEPLOYMENT_TYPE => {
                decoded.deployment_type = DeploymentType::from_label(value);
            }
            LABEL_MIN_LIFETIME => decoded.min_lifetime = Some(value.clone()),
            LABEL_VOLUME_PATH => decoded.volume_path = Some(value.clone()),
            LABEL_DESCRIPTION => decoded.description = Some(value.clone()),
            LABEL_ICON => decoded.icon = Some(value.clone()),
            LABEL_ENDPOINTS => decoded.endpoints = split_list(value),
            LABEL_REQUIREMENTS => decoded.requirements = split_list(value),
            _ => {
                if let Some(meta_key) = key.strip_prefix(LABEL_METADATA_PREFIX) {
                    decoded.metadata.insert(meta_key.to_string(), value.clone());
                } else if !key.starts_with(LABEL_PREFIX) {
                    decoded.metadata.insert(key.clone(), value.clone());
                }
            }
        }
    }

    decoded
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

// ─── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_types::deployment::DeploymentCompute;

    fn full_request() -> DeploymentRequest {
        DeploymentRequest {
            container_image: "registry.example.com/workspace:1.0".to_string(),
            display_name: Some("ML Workspace".to_string()),
            endpoints: vec!["8080".to_string(), "8091/tools".to_string()],
            requirements: vec!["docker".to_string()],
            metadata: HashMap::from([("team".to_string(), "research".to_string())]),
            description: Some("shared workspace".to_string()),
            icon: Some("flask".to_string()),
            compute: Some(DeploymentCompute {
                min_lifetime: Some("3600".to_string()),
                volume_path: Some("/workspace".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_round_trip_preserves_all_fields() {
        let request = full_request();
        let labels = encode_labels(
            &request,
            DeploymentType::Service,
            "proj-1",
            "proj-1-ml-workspace-service",
            "wharf",
        );
        let decoded = decode_labels(&labels);

        assert_eq!(decoded.namespace.as_deref(), Some("wharf"));
        assert_eq!(decoded.project_name.as_deref(), Some("proj-1"));
        assert_eq!(
            decoded.deployment_name.as_deref(),
            Some("proj-1-ml-workspace-service")
        );
        assert_eq!(decoded.display_name, request.display_name);
        assert_eq!(decoded.deployment_type, Some(DeploymentType::Service));
        assert_eq!(decoded.endpoints, request.endpoints);
        assert_eq!(decoded.requirements, request.requirements);
        assert_eq!(decoded.min_lifetime.as_deref(), Some("3600"));
        assert_eq!(decoded.volume_path.as_deref(), Some("/workspace"));
        assert_eq!(decoded.description, request.description);
        assert_eq!(decoded.icon, request.icon);
        assert_eq!(decoded.metadata, request.metadata);
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let request = DeploymentRequest {
            container_image: "nginx:latest".to_string(),
            display_name: Some("plain".to_string()),
            ..Default::default()
        };
        let labels = encode_labels(
            &request,
            DeploymentType::Job,
            "proj-1",
            "proj-1-plain-job",
            "wharf",
        );

        assert!(!labels.contains_key(LABEL_ENDPOINTS));
        assert!(!labels.contains_key(LABEL_MIN_LIFETIME));
        assert!(!labels.contains_key(LABEL_DESCRIPTION));

        let decoded = decode_labels(&labels);
        assert!(decoded.endpoints.is_empty());
        assert!(decoded.min_lifetime.is_none());
        assert!(decoded.description.is_none());
    }

    #[test]
    fn test_decode_tolerates_foreign_and_malformed_labels() {
        let labels = HashMap::from([
            ("maintainer".to_string(), "NGINX <docker@nginx.com>".to_string()),
            (LABEL_DEPLOYMENT_TYPE.to_string(), "daemonset".to_string()),
            ("wharf.unknownKey".to_string(), "x".to_string()),
        ]);
        let decoded = decode_labels(&labels);

        assert_eq!(decoded.deployment_type, None);
        assert_eq!(
            decoded.metadata.get("maintainer").map(String::as_str),
            Some("NGINX <docker@nginx.com>")
        );
        assert!(!decoded.metadata.contains_key("wharf.unknownKey"));
    }

    #[test]
    fn test_metadata_cannot_shadow_reserved_keys() {
        let request = DeploymentRequest {
            container_image: "nginx:latest".to_string(),
            metadata: HashMap::from([(
                "wharf.projectName".to_string(),
                "spoofed".to_string(),
            )]),
            ..Default::default()
        };
        let labels = encode_labels(&request, DeploymentType::Service, "real", "c", "wharf");
        assert_eq!(labels.get(LABEL_PROJECT_NAME).map(String::as_str), Some("real"));
        assert!(!labels.contains_key("wharf.meta.wharf.projectName"));
    }
}
