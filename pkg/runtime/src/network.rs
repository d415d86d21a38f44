//! Per-project network allocation.
//!
//! Every project gets one bridge network so its deployments only see each
//! other. Subnets are /24 blocks carved out of the reserved range: the
//! numerically highest allocated subnet plus one block, never gap-filling.
//! Without explicit subnets Docker would fall back to its small default
//! pool and cap the number of networks per host.

use std::collections::HashMap;

use bollard::Docker;
use bollard::models::{
    ContainerInspectResponse, Ipam, IpamConfig, Network, NetworkConnectRequest,
    NetworkCreateRequest,
};
use bollard::query_parameters::{
    InspectContainerOptions, InspectNetworkOptions, ListNetworksOptions,
};
use tokio::sync::Mutex;
use tracing::{info, warn};

use pkg_constants::labels::{LABEL_NAMESPACE, LABEL_PROJECT_NAME};
use pkg_constants::network::{
    NETWORK_FIRST_OCTET, NETWORK_PREFIX_LEN, NETWORK_SECOND_OCTET, SUBNET_BLOCK_SIZE,
};
use pkg_constants::runtime::{CONTAINER_MARKER_ENV, HOSTNAME_ENV};

use crate::error::{Result, RuntimeError};
use crate::naming;

/// Allocates and looks up per-project networks.
///
/// Subnet selection races with itself when two deployments hit a new
/// project at once, so creation is serialized by an internal lock.
pub struct NetworkManager {
    docker: Docker,
    namespace: String,
    create_lock: Mutex<()>,
}

impl NetworkManager {
    pub fn new(docker: Docker, namespace: impl Into<String>) -> Self {
        Self {
            docker,
            namespace: namespace.into(),
            create_lock: Mutex::new(()),
        }
    }

    /// Return the project's network, creating it on first use.
    pub async fn ensure_network(&self, project_id: &str) -> Result<Network> {
        let name = naming::network_name(project_id);

        if let Some(network) = self.inspect(&name).await? {
            return Ok(network);
        }

        let _guard = self.create_lock.lock().await;
        // Double check: another task may have created it while we waited.
        if let Some(network) = self.inspect(&name).await? {
            return Ok(network);
        }

        let networks = self
            .docker
            .list_networks(None::<ListNetworksOptions>)
            .await?;
        let existing: Vec<String> = networks
            .iter()
            .filter_map(|n| {
                n.ipam
                    .as_ref()
                    .and_then(|ipam| ipam.config.as_ref())
                    .and_then(|configs| configs.first())
                    .and_then(|config| config.subnet.clone())
            })
            .collect();
        let subnet = next_subnet(&existing)?;
        info!("Creating network {} with subnet {}", name, subnet.cidr);

        let labels = HashMap::from([
            (LABEL_NAMESPACE.to_string(), self.namespace.clone()),
            (LABEL_PROJECT_NAME.to_string(), project_id.to_string()),
        ]);
        self.docker
            .create_network(NetworkCreateRequest {
                name: name.clone(),
                driver: Some("bridge".to_string()),
                ipam: Some(Ipam {
                    config: Some(vec![IpamConfig {
                        subnet: Some(subnet.cidr.clone()),
                        gateway: Some(subnet.gateway.clone()),
                        ..Default::default()
                    }]),
                    ..Default::default()
                }),
                labels: Some(labels),
                ..Default::default()
            })
            .await?;

        self.attach_own_container(&name).await?;

        match self.inspect(&name).await? {
            Some(network) => Ok(network),
            None => Err(RuntimeError::NetworkSetupFailed(format!(
                "network {} disappeared right after creation",
                name
            ))),
        }
    }

    /// When the control plane itself runs inside a container, connect that
    /// container to the freshly created network so it can reach the
    /// project's deployments. Rolls the network back on failure.
    async fn attach_own_container(&self, network_name: &str) -> Result<()> {
        let Some(own) = self.own_container().await else {
            return Ok(());
        };

        let already_connected = own
            .network_settings
            .as_ref()
            .and_then(|settings| settings.networks.as_ref())
            .is_some_and(|networks| networks.contains_key(network_name));
        if already_connected {
            return Ok(());
        }

        let container_id = own.id.unwrap_or_default();
        if let Err(e) = self
            .docker
            .connect_network(
                network_name,
                NetworkConnectRequest {
                    container: Some(container_id.clone()),
                    ..Default::default()
                },
            )
            .await
        {
            // Nothing is attached to the network yet, remove it again.
            if let Err(remove_err) = self.docker.remove_network(network_name).await {
                warn!(
                    "Rollback of network {} failed: {}",
                    network_name, remove_err
                );
            }
            return Err(RuntimeError::NetworkSetupFailed(format!(
                "could not connect container {} to network {}: {}",
                container_id, network_name, e
            )));
        }

        Ok(())
    }

    /// The container this process runs in, detected via env markers, or
    /// `None` when running directly on the host.
    async fn own_container(&self) -> Option<ContainerInspectResponse> {
        if std::env::var(CONTAINER_MARKER_ENV).is_err() {
            return None;
        }
        let hostname = std::env::var(HOSTNAME_ENV).ok()?;
        self.docker
            .inspect_container(&hostname, None::<InspectContainerOptions>)
            .await
            .ok()
    }

    async fn inspect(&self, name: &str) -> Result<Option<Network>> {
        match self
            .docker
            .inspect_network(name, None::<InspectNetworkOptions>)
            .await
        {
            Ok(network) => Ok(Some(network)),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Whether a bollard error is a 404 from the daemon.
pub(crate) fn is_not_found(err: &bollard::errors::Error) -> bool {
    matches!(
        err,
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

/// An allocated subnet: CIDR plus its gateway (first host address).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedSubnet {
    pub cidr: String,
    pub gateway: String,
}

/// Pick the next free /24 in the reserved range.
///
/// Scans the given subnets for the numerically highest one inside the
/// range and adds one block. Subnets outside the range (Docker's own
/// pools, user networks) are ignored. Fails with `AddressSpaceExhausted`
/// once the next block would leave the reserved first octet.
pub fn next_subnet<S: AsRef<str>>(existing: &[S]) -> Result<AllocatedSubnet> {
    let initial = (NETWORK_FIRST_OCTET as u32) << 24 | (NETWORK_SECOND_OCTET as u32) << 16;

    let mut highest = initial;
    for subnet in existing {
        let Some(base) = parse_subnet_base(subnet.as_ref()) else {
            continue;
        };
        let first = (base >> 24) as u8;
        let second = (base >> 16 & 0xFF) as u8;
        if first == NETWORK_FIRST_OCTET && second >= NETWORK_SECOND_OCTET && base > highest {
            highest = base;
        }
    }

    let next = highest.wrapping_add(SUBNET_BLOCK_SIZE);
    if (next >> 24) as u8 > NETWORK_FIRST_OCTET || next < initial {
        return Err(RuntimeError::AddressSpaceExhausted);
    }

    Ok(AllocatedSubnet {
        cidr: format!("{}/{}", format_ip(next), NETWORK_PREFIX_LEN),
        gateway: format_ip(next + 1),
    })
}

/// Parse the base address of `a.b.c.d/len` into a u32. Returns `None`
/// for anything malformed.
fn parse_subnet_base(subnet: &str) -> Option<u32> {
    let (ip, _prefix) = subnet.split_once('/')?;
    let octets: Vec<u8> = ip.split('.').map(str::parse).collect::<std::result::Result<_, _>>().ok()?;
    if octets.len() != 4 {
        return None;
    }
    Some(
        (octets[0] as u32) << 24
            | (octets[1] as u32) << 16
            | (octets[2] as u32) << 8
            | (octets[3] as u32),
    )
}

fn format_ip(ip: u32) -> String {
    format!(
        "{}.{}.{}.{}",
        (ip >> 24) & 0xFF,
        (ip >> 16) & 0xFF,
        (ip >> 8) & 0xFF,
        ip & 0xFF,
    )
}

// ─── Tests ─────────────────────────────────────────────────────
