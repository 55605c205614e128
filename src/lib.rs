//! # VaultGraph Rust Implementation
//!
//! A Rust library for declaring tiered backup infrastructure (vaults, backup
//! plans, resource selections, roles, encryption keys) as a typed, validated
//! resource graph.
//!
//! ## Overview
//!
//! VaultGraph models backup policy as data: a tier (Silver, Gold, Platinum)
//! resolves to a vault configuration, fixed schedule/retention rules, and
//! account-scoped resource selections read from a JSON side-file. Synthesis
//! produces a declarative resource graph and a checksummed JSON manifest;
//! submitting that declaration to a provisioning service is the caller's
//! concern. Nothing here executes a backup.
//!
//! ## Quick Start
//!
//! ```rust
//! use vaultgraph::accounts::AccountResourceMap;
//! use vaultgraph::resolver::{ResolverConfig, VaultPolicyResolver};
//! use vaultgraph::vault::VaultTier;
//!
//! # fn example() -> vaultgraph::Result<()> {
//! let resolver = VaultPolicyResolver::new(ResolverConfig::new("o-example123"));
//!
//! // A tier resolves to a vault configuration
//! let vault = resolver.build_vault(VaultTier::Gold, "member-vault-gold");
//! assert!(vault.lock.is_some());
//!
//! // Account-scoped selections come from a JSON side-file
//! let map = AccountResourceMap::from_json_str(
//!     r#"{"111122223333": {"daily": ["arn:aws:dynamodb:ap-southeast-2:111122223333:table/app"]}}"#,
//! )?;
//! let selections = resolver.register_selections(&vault, &map, "111122223333")?;
//! assert_eq!(selections.len(), 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Key Features
//!
//! - **Tiered vault policies**: Silver/Gold/Platinum as cumulative policy
//!   deltas, so each tier is provably a superset of the tier below
//! - **Declarative resource graphs**: vaults, plans, selections, roles and
//!   keys as nodes with validated ownership edges
//! - **Side-file driven selections**: account → rule → ARN lists with an
//!   explicit absent-means-empty contract and typed structural errors
//! - **Type safety**: Leverage Rust's type system for compile-time guarantees
//! - **Manifest output**: deterministic, checksummed JSON for downstream
//!   provisioning
//!
//! ## Modules
//!
//! - [`graph`]: Resource graph structures and builder
//! - [`vault`]: Tier model, lock policy and vault configuration
//! - [`plan`]: Backup rules, plans and resource selections
//! - [`iam`]: Policy documents, the backup role and encryption key specs
//! - [`accounts`]: The account resource map side-file
//! - [`resolver`]: The vault policy resolver
//! - [`stack`]: Full backup stack composition
//! - [`pipeline`]: Declarative deployment pipeline and repository seeding
//! - [`synth`]: Synthesis entry point and manifest emission

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use thiserror::Error;

/// Result type for VaultGraph operations
pub type Result<T> = std::result::Result<T, VaultGraphError>;

/// Main error type for VaultGraph operations
#[derive(Error, Debug)]
pub enum VaultGraphError {
    /// Resource graph structure error (missing nodes, bad ownership, etc.)
    #[error("Graph error: {0}")]
    Graph(#[from] graph::GraphError),

    /// Account resource map error
    #[error("Account map error: {0}")]
    AccountMap(#[from] accounts::MapError),

    /// Resource selection error
    #[error("Selection error: {0}")]
    Selection(#[from] plan::SelectionError),

    /// Synthesis configuration error
    #[error("Synthesis error: {0}")]
    Synth(#[from] synth::SynthError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Resource graph structures and builder
pub mod graph;

/// Vault tiers, lock policy and configuration
pub mod vault;

/// Backup rules, plans and resource selections
pub mod plan;

/// Policy documents, backup role and encryption key declarations
pub mod iam;

/// Account resource map side-file
pub mod accounts;

/// The vault policy resolver
pub mod resolver;

/// Backup stack composition
pub mod stack;

/// Declarative pipeline and repository seeding interfaces
pub mod pipeline;

/// Synthesis entry point and manifest emission
pub mod synth;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err = VaultGraphError::from(graph::GraphError::NodeNotFound("vault".to_string()));
        assert!(err.to_string().contains("vault"));
    }
}
