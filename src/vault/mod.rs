//! Vault tiers, lock policy and configuration
//!
//! The tier model is cumulative: each tier's policy is the fold of the policy
//! deltas of every tier up to and including it, so a stricter tier can never
//! drop a control the tier below carries.

pub mod config;
pub mod tier;

pub use config::{LockConfig, VaultConfig};
pub use tier::{PolicyDelta, VaultTier};
