//! Project network constants.
//!
//! Each project gets its own bridge network with a /24 subnet carved out
//! of the reserved range below. Docker's own default pools live in
//! 172.17-32.0.0, so the 10.42.0.0/16 range does not collide with them.

/// First octet of the reserved subnet range.
pub const NETWORK_FIRST_OCTET: u8 = 10;

/// Second octet where the reserved subnet range starts.
pub const NETWORK_SECOND_OCTET: u8 = 42;

/// Prefix length of every allocated project subnet.
pub const NETWORK_PREFIX_LEN: u8 = 24;

/// Address distance between two consecutive /24 subnets.
pub const SUBNET_BLOCK_SIZE: u32 = 256;

/// Name prefix of per-project networks. Full name = prefix + project id.
pub const NETWORK_NAME_PREFIX: &str = "wharf-project-";
