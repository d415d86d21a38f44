//! Shared wire and config types for the wharf workspace.

pub mod config;
pub mod deployment;
