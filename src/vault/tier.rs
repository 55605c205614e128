//! Vault tiers and cumulative policy composition

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::iam::PolicyStatement;

use super::config::LockConfig;

/// Vault strictness tier
///
/// Ordered from least to most strict. The ordering matters: policy resolution
/// folds deltas from `Silver` upward, so every tier carries everything the
/// tiers below it carry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VaultTier {
    /// Encrypted vault, organization-scoped access, no lock
    Silver,
    /// Silver plus a compliance lock
    Gold,
    /// Gold under a distinct class label
    Platinum,
}

impl VaultTier {
    /// All tiers, least strict first
    pub const ALL: [VaultTier; 3] = [VaultTier::Silver, VaultTier::Gold, VaultTier::Platinum];

    /// The lowercase class label attached to vaults of this tier
    pub fn label(&self) -> &'static str {
        match self {
            VaultTier::Silver => "silver",
            VaultTier::Gold => "gold",
            VaultTier::Platinum => "platinum",
        }
    }

    /// The tier directly below, if any
    pub fn predecessor(&self) -> Option<VaultTier> {
        match self {
            VaultTier::Silver => None,
            VaultTier::Gold => Some(VaultTier::Silver),
            VaultTier::Platinum => Some(VaultTier::Gold),
        }
    }
}

impl fmt::Display for VaultTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The increment of policy a tier adds on top of the tier below it
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolicyDelta {
    /// Access-policy statements this tier introduces
    pub statements: Vec<PolicyStatement>,
    /// Lock configuration this tier introduces, if any
    pub lock: Option<LockConfig>,
    /// Advisory notices this tier introduces
    pub advisories: Vec<String>,
}

impl PolicyDelta {
    /// The delta a single tier contributes, not counting tiers below it
    pub fn for_tier(tier: VaultTier, organization_id: &str) -> Self {
        match tier {
            VaultTier::Silver => Self {
                statements: vec![PolicyStatement::copy_into_vault(organization_id)],
                lock: None,
                advisories: Vec::new(),
            },
            VaultTier::Gold => {
                let lock = LockConfig::compliance();
                let advisory = lock.advisory();
                Self {
                    statements: Vec::new(),
                    lock: Some(lock),
                    advisories: vec![advisory],
                }
            }
            // Platinum tightens nothing beyond Gold; only the class label differs
            VaultTier::Platinum => Self::default(),
        }
    }

    /// The full policy for a tier: deltas folded from `Silver` upward
    pub fn cumulative(tier: VaultTier, organization_id: &str) -> Self {
        VaultTier::ALL
            .iter()
            .filter(|t| **t <= tier)
            .fold(Self::default(), |acc, t| {
                acc.merge(Self::for_tier(*t, organization_id))
            })
    }

    /// Layer a stricter delta on top of this one. A later lock replaces an
    /// earlier one; statements and advisories accumulate.
    fn merge(mut self, delta: PolicyDelta) -> Self {
        self.statements.extend(delta.statements);
        self.lock = delta.lock.or(self.lock);
        self.advisories.extend(delta.advisories);
        self
    }

    /// Whether this delta carries every constraint of `other`
    pub fn is_superset_of(&self, other: &PolicyDelta) -> bool {
        let statements_covered = other
            .statements
            .iter()
            .all(|s| self.statements.contains(s));
        let lock_covered = match (&other.lock, &self.lock) {
            (None, _) => true,
            (Some(theirs), Some(ours)) => ours == theirs,
            (Some(_), None) => false,
        };
        let advisories_covered = other
            .advisories
            .iter()
            .all(|a| self.advisories.contains(a));
        statements_covered && lock_covered && advisories_covered
    }
}
