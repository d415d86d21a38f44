use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Errors raised by the deployment core.
///
/// Validation errors are raised before any runtime call is made; only
/// network creation has a partial-effect window and it rolls itself back.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A minimal resource requirement exceeds the detected system capacity.
    #[error(
        "the minimal amount of {resource} of {requested} cannot be fulfilled, \
         the system has only {available}"
    )]
    ResourceExceeded {
        resource: &'static str,
        requested: String,
        available: String,
    },

    /// The request asks for something this backend cannot honor at all.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// The request is malformed, e.g. the display name is missing.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The reserved subnet range has no free /24 block left.
    #[error("no more subnet addresses exist in the reserved network range")]
    AddressSpaceExhausted,

    /// Network creation or self-attachment failed after partial effects
    /// were rolled back.
    #[error("network setup failed: {0}")]
    NetworkSetupFailed(String),

    /// The requested deployment does not exist in this project.
    #[error("deployment {0} not found")]
    NotFound(String),

    /// An underlying container runtime call failed.
    #[error("runtime call failed: {0}")]
    RuntimeCall(#[from] bollard::errors::Error),
}
