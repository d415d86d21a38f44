use serde::{Deserialize, Serialize};

/// Server configuration file (YAML).
///
/// Example `config.yaml`:
/// ```yaml
/// port: 8090
/// namespace: wharf
/// host-data-root: /mnt/wharf-data/
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfigFile {
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub namespace: Option<String>,
    /// Host path prefix for deployment data. When set, volumes become
    /// host bind mounts under this prefix instead of named volumes.
    #[serde(default, alias = "host-data-root")]
    pub host_data_root: Option<String>,
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> anyhow::Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_default() {
        let cfg: ServerConfigFile = load_config_file("/nonexistent/wharf.yaml").unwrap();
        assert!(cfg.port.is_none());
        assert!(cfg.namespace.is_none());
    }

    #[test]
    fn test_aliased_keys_parse() {
        let cfg: ServerConfigFile =
            serde_yaml::from_str("port: 9000\nhost-data-root: /data/\n").unwrap();
        assert_eq!(cfg.port, Some(9000));
        assert_eq!(cfg.host_data_root.as_deref(), Some("/data/"));
    }
}
