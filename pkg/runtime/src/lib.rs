//! Deployment abstraction and container-runtime translation layer.
//!
//! Turns backend-agnostic deployment requests into concrete container
//! primitives, enforces resource admission policy, and reconstructs typed
//! deployment state from runtime-native metadata. All deployment state
//! lives in the runtime itself (as labels), there is no secondary store.

pub mod admission;
pub mod backend;
pub mod capacity;
pub mod docker;
pub mod error;
pub mod labels;
pub mod map;
pub mod naming;
pub mod network;
pub mod spec;

pub use backend::DeploymentBackend;
pub use capacity::SystemCapacity;
pub use docker::DockerBackend;
pub use error::{Result, RuntimeError};
