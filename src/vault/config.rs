//! Vault configuration and lock policy

use serde::{Deserialize, Serialize};

use crate::iam::PolicyDocument;

use super::tier::{PolicyDelta, VaultTier};

/// Compliance-mode lock thresholds
///
/// Once the declaration is applied, the external service enforces the lock:
/// after `changeable_for_days` from creation it cannot be deleted or relaxed,
/// not even by the account root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    /// Days during which the lock itself may still be changed
    pub changeable_for_days: u32,
    /// Upper bound on recovery point retention, in days
    pub max_retention_days: u32,
    /// Lower bound on recovery point retention, in days
    pub min_retention_days: u32,
}

impl LockConfig {
    /// The fixed compliance lock used by locked tiers
    pub fn compliance() -> Self {
        Self {
            changeable_for_days: 14,
            max_retention_days: 35,
            min_retention_days: 1,
        }
    }

    /// Human-readable notice about the cooling-off window. Advisory output
    /// only, never an error.
    pub fn advisory(&self) -> String {
        format!(
            "vault lock is in compliance mode: after {} days it cannot be deleted or modified, even by the account root",
            self.changeable_for_days
        )
    }
}

/// Resolved configuration for one vault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Tier the configuration was resolved for
    pub tier: VaultTier,
    /// Vault name submitted to the backup service
    pub vault_name: String,
    /// Organization whose principals may copy into the vault
    pub organization_id: String,
    /// Logical id of the key encrypting the vault
    pub encryption_key_ref: String,
    /// Access policy attached to the vault
    pub access_policy: PolicyDocument,
    /// Lock configuration, present iff the tier locks
    pub lock: Option<LockConfig>,
    /// Class tag value, always the tier's lowercase label
    pub class: String,
    /// Advisory notices produced during resolution
    pub advisories: Vec<String>,
}

impl VaultConfig {
    /// Resolve the configuration for a tier by folding policy deltas from
    /// `Silver` upward.
    pub fn for_tier(
        tier: VaultTier,
        vault_name: impl Into<String>,
        organization_id: impl Into<String>,
        encryption_key_ref: impl Into<String>,
    ) -> Self {
        let organization_id = organization_id.into();
        let delta = PolicyDelta::cumulative(tier, &organization_id);

        let mut access_policy = PolicyDocument::new();
        for statement in delta.statements {
            access_policy.push(statement);
        }

        Self {
            tier,
            vault_name: vault_name.into(),
            organization_id,
            encryption_key_ref: encryption_key_ref.into(),
            access_policy,
            lock: delta.lock,
            class: tier.label().to_string(),
            advisories: delta.advisories,
        }
    }

    /// Whether the vault carries a lock
    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vault(tier: VaultTier) -> VaultConfig {
        VaultConfig::for_tier(tier, "member-vault", "o-abc123", "MemberAccountBackupKey")
    }

    #[test]
    fn test_silver_has_no_lock() {
        let config = vault(VaultTier::Silver);
        assert!(!config.is_locked());
        assert!(config.advisories.is_empty());
        assert_eq!(config.class, "silver");
        assert_eq!(config.access_policy.len(), 1);
    }

    #[test]
    fn test_gold_lock_thresholds() {
        let config = vault(VaultTier::Gold);
        let lock = config.lock.expect("gold locks");
        assert_eq!(lock.changeable_for_days, 14);
        assert_eq!(lock.max_retention_days, 35);
        assert_eq!(lock.min_retention_days, 1);
        assert_eq!(config.advisories.len(), 1);
    }

    #[test]
    fn test_platinum_differs_from_gold_only_in_label() {
        let gold = vault(VaultTier::Gold);
        let platinum = vault(VaultTier::Platinum);
        assert_eq!(gold.lock, platinum.lock);
        assert_eq!(gold.access_policy, platinum.access_policy);
        assert_eq!(platinum.class, "platinum");
    }

    #[test]
    fn test_advisory_names_the_window() {
        let advisory = LockConfig::compliance().advisory();
        assert!(advisory.contains("14 days"));
    }
}
