//! The vault policy resolver
//!
//! Given a tier, an organization, and the account resource map, the resolver
//! produces the vault configuration, the fixed rule plans, and the resource
//! selections to submit to the backup service. This is a pure, idempotent
//! build step invoked once per synthesis; there is no running state and no
//! retry, the correct recovery from a failure is re-running the whole build.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::accounts::AccountResourceMap;
use crate::plan::{BackupPlan, BackupRule, ResourceSelection};
use crate::vault::{VaultConfig, VaultTier};
use crate::Result;

/// Explicit resolver configuration
///
/// The organization and the shared refs are passed in here rather than read
/// from globals; sourcing them from the environment or a config file is the
/// calling layer's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Organization whose principals may copy into resolved vaults
    pub organization_id: String,
    /// Logical id of the key encrypting resolved vaults
    pub encryption_key_ref: String,
    /// Logical id of the shared execution role for selections
    pub backup_role_ref: String,
    /// Selection id used for every registered selection
    pub selection_id: String,
}

impl ResolverConfig {
    /// Configuration with the standard refs
    pub fn new(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            encryption_key_ref: "MemberAccountBackupKey".to_string(),
            backup_role_ref: "backup-role".to_string(),
            selection_id: "all".to_string(),
        }
    }

    /// Override the encryption key ref
    pub fn with_encryption_key_ref(mut self, key_ref: impl Into<String>) -> Self {
        self.encryption_key_ref = key_ref.into();
        self
    }

    /// Override the execution role ref
    pub fn with_backup_role_ref(mut self, role_ref: impl Into<String>) -> Self {
        self.backup_role_ref = role_ref.into();
        self
    }

    /// Override the shared selection id
    pub fn with_selection_id(mut self, selection_id: impl Into<String>) -> Self {
        self.selection_id = selection_id.into();
        self
    }
}

/// Everything one resolved vault contributes to the declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedVault {
    /// The vault configuration
    pub vault: VaultConfig,
    /// One plan per rule, all targeting the vault
    pub plans: Vec<BackupPlan>,
    /// Selections registered from the account map
    pub selections: Vec<ResourceSelection>,
}

/// Resolves tiers and account maps into backup declarations
#[derive(Debug, Clone)]
pub struct VaultPolicyResolver {
    config: ResolverConfig,
}

impl VaultPolicyResolver {
    /// Create a resolver over an explicit configuration
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// The resolver's configuration
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Construct the tier-appropriate vault configuration.
    ///
    /// Locked tiers come back with advisories; each is logged as a warning
    /// here. Advisory output only, never an error.
    pub fn build_vault(&self, tier: VaultTier, vault_name: impl Into<String>) -> VaultConfig {
        let vault = VaultConfig::for_tier(
            tier,
            vault_name,
            &self.config.organization_id,
            &self.config.encryption_key_ref,
        );
        for advisory in &vault.advisories {
            warn!(vault = %vault.vault_name, class = %vault.class, "{advisory}");
        }
        vault
    }

    /// Register the selections configured for `account_id` against `vault`.
    ///
    /// For each rule, a present non-empty ARN list becomes one selection under
    /// the shared execution role; an absent or empty list is skipped. Any
    /// structural failure is logged with the offending rule and re-raised:
    /// a silently missing selection would mean unprotected resources, so
    /// synthesis aborts instead of returning a partial set.
    pub fn register_selections(
        &self,
        vault: &VaultConfig,
        map: &AccountResourceMap,
        account_id: &str,
    ) -> Result<Vec<ResourceSelection>> {
        let mut selections = Vec::new();
        for rule in BackupRule::ALL {
            let resources = map.resources_for(account_id, rule).map_err(|e| {
                error!(
                    vault = %vault.vault_name,
                    account = account_id,
                    rule = rule.key(),
                    "failed to read resources for plan: {e}"
                );
                e
            })?;

            let Some(arns) = resources else {
                debug!(
                    vault = %vault.vault_name,
                    account = account_id,
                    rule = rule.key(),
                    "no resources configured, skipping rule"
                );
                continue;
            };
            if arns.is_empty() {
                debug!(
                    vault = %vault.vault_name,
                    account = account_id,
                    rule = rule.key(),
                    "empty resource list, skipping rule"
                );
                continue;
            }

            let selection = ResourceSelection::new(
                rule,
                &self.config.selection_id,
                arns,
                &self.config.backup_role_ref,
            )
            .map_err(|e| {
                error!(
                    vault = %vault.vault_name,
                    account = account_id,
                    rule = rule.key(),
                    "failed to add resources to plan: {e}"
                );
                e
            })?;
            selections.push(selection);
        }
        Ok(selections)
    }

    /// Resolve the full (vault, plans, selections) declaration for one tier
    /// and account
    pub fn resolve(
        &self,
        tier: VaultTier,
        vault_name: impl Into<String>,
        map: &AccountResourceMap,
        account_id: &str,
    ) -> Result<ResolvedVault> {
        let vault = self.build_vault(tier, vault_name);
        let plans = BackupRule::ALL
            .iter()
            .map(|rule| BackupPlan::new(*rule, vault.vault_name.clone()))
            .collect();
        let selections = self.register_selections(&vault, map, account_id)?;
        Ok(ResolvedVault {
            vault,
            plans,
            selections,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> VaultPolicyResolver {
        VaultPolicyResolver::new(ResolverConfig::new("o-abc123"))
    }

    #[test]
    fn test_register_selections_is_idempotent() {
        let map = AccountResourceMap::from_json_str(
            r#"{"111": {"daily": ["arn:a", "arn:b"], "weekly": ["arn:c"]}}"#,
        )
        .expect("valid map");
        let r = resolver();
        let vault = r.build_vault(VaultTier::Silver, "member-vault");

        let first = r
            .register_selections(&vault, &map, "111")
            .expect("first pass");
        let second = r
            .register_selections(&vault, &map, "111")
            .expect("second pass");
        assert_eq!(first, second);
    }

    #[test]
    fn test_only_configured_rules_are_registered() {
        let map = AccountResourceMap::from_json_str(r#"{"111": {"daily": ["arn:a"], "monthly": []}}"#)
            .expect("valid map");
        let r = resolver();
        let vault = r.build_vault(VaultTier::Silver, "member-vault");

        let selections = r
            .register_selections(&vault, &map, "111")
            .expect("registration");
        assert_eq!(selections.len(), 1);
        assert_eq!(selections[0].rule, BackupRule::Daily);
        assert_eq!(selections[0].resource_arns, vec!["arn:a"]);
        assert_eq!(selections[0].selection_id, "all");
    }

    #[test]
    fn test_malformed_rule_aborts_registration() {
        let map = AccountResourceMap::from_json_str(
            r#"{"111": {"daily": "arn:a", "weekly": ["arn:b"]}}"#,
        )
        .expect("parses fine");
        let r = resolver();
        let vault = r.build_vault(VaultTier::Silver, "member-vault");

        let err = r
            .register_selections(&vault, &map, "111")
            .expect_err("structural error");
        assert!(err.to_string().contains("daily"));
    }

    #[test]
    fn test_resolve_produces_one_plan_per_rule() {
        let r = resolver();
        let resolved = r
            .resolve(
                VaultTier::Gold,
                "member-vault-gold",
                &AccountResourceMap::empty(),
                "111",
            )
            .expect("resolution");
        assert_eq!(resolved.plans.len(), 3);
        assert!(resolved.selections.is_empty());
        assert!(resolved.vault.is_locked());
    }
}
