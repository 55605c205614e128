//! Backup stack composition
//!
//! Assembles one tiered vault, its execution role and encryption key, the
//! three rule plans, the account-map selections, and the stack outputs into a
//! validated [`ResourceGraph`].

use tracing::info;

use crate::accounts::AccountResourceMap;
use crate::graph::{GraphBuilder, ResourceGraph, ResourceKind};
use crate::iam::{BackupRoleSpec, EncryptionKeySpec};
use crate::plan::{BackupPlan, BackupRule};
use crate::resolver::VaultPolicyResolver;
use crate::vault::VaultTier;
use crate::Result;

/// Logical id of the vault node
pub const VAULT_LOGICAL_ID: &str = "MemberAccountBackupVault";

/// Name of the pre-existing instance role the backup role may pass to SSM
const SSM_INSTANCE_ROLE: &str = "AmazonEC2RoleForSSM";

/// One deployable backup stack: a tiered vault plus everything it needs
#[derive(Debug, Clone)]
pub struct BackupStack {
    name: String,
    tier: VaultTier,
    vault_name: String,
    account_id: String,
    resolver: VaultPolicyResolver,
}

impl BackupStack {
    /// Declare a stack for one tier and account
    pub fn new(
        name: impl Into<String>,
        tier: VaultTier,
        vault_name: impl Into<String>,
        account_id: impl Into<String>,
        resolver: VaultPolicyResolver,
    ) -> Self {
        Self {
            name: name.into(),
            tier,
            vault_name: vault_name.into(),
            account_id: account_id.into(),
            resolver,
        }
    }

    /// Stack name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Synthesize the stack into a validated resource graph.
    ///
    /// A selection failure aborts the whole synthesis; there is no partial
    /// graph.
    pub fn synthesize(&self, map: &AccountResourceMap) -> Result<ResourceGraph> {
        info!(
            stack = %self.name,
            tier = %self.tier,
            account = %self.account_id,
            "synthesizing backup stack"
        );

        let config = self.resolver.config().clone();
        let role_id = config.backup_role_ref.clone();
        let key_id = config.encryption_key_ref.clone();

        let role = BackupRoleSpec::standard(&role_id).with_pass_role(SSM_INSTANCE_ROLE);
        let key = EncryptionKeySpec::vault_default(&key_id).grant_encrypt_decrypt(&role_id);
        let vault = self.resolver.build_vault(self.tier, &self.vault_name);
        let selections = self
            .resolver
            .register_selections(&vault, map, &self.account_id)?;

        let mut builder = GraphBuilder::new(&self.name)
            .add_resource(&role_id, ResourceKind::Role, serde_json::to_value(&role)?)
            .add_resource(&key_id, ResourceKind::Key, serde_json::to_value(&key)?)
            .add_resource(
                VAULT_LOGICAL_ID,
                ResourceKind::Vault,
                serde_json::to_value(&vault)?,
            )
            .references(VAULT_LOGICAL_ID, &key_id);

        for rule in BackupRule::ALL {
            let plan = BackupPlan::new(rule, VAULT_LOGICAL_ID);
            let plan_id = plan.id.clone();
            builder = builder
                .add_resource(&plan_id, ResourceKind::Plan, serde_json::to_value(&plan)?)
                .references(&plan_id, VAULT_LOGICAL_ID);
        }

        for selection in &selections {
            let selection_id = selection.logical_id();
            let owning_plan = format!("{}BackupPlan", selection.rule.title());
            builder = builder
                .add_resource(
                    &selection_id,
                    ResourceKind::Selection,
                    serde_json::to_value(selection)?,
                )
                .owns(owning_plan, &selection_id)
                .references(&selection_id, &role_id);
        }

        // Stack outputs so other stacks can reference the ARNs
        for (output_id, target) in [
            ("backup-role-arn-output", role_id.as_str()),
            ("MemberAccountBackupVaultOutput", VAULT_LOGICAL_ID),
            ("MemberAccountBackupKeyOutput", key_id.as_str()),
        ] {
            builder = builder
                .add_resource(
                    output_id,
                    ResourceKind::Output,
                    serde_json::json!({ "ref": target }),
                )
                .references(output_id, target);
        }

        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ResolverConfig;

    fn stack(tier: VaultTier) -> BackupStack {
        BackupStack::new(
            "backup-stack",
            tier,
            "member-vault",
            "111",
            VaultPolicyResolver::new(ResolverConfig::new("o-abc123")),
        )
    }

    #[test]
    fn test_synthesize_shape() {
        let map = AccountResourceMap::from_json_str(r#"{"111": {"daily": ["arn:a"]}}"#)
            .expect("valid map");
        let graph = stack(VaultTier::Silver).synthesize(&map).expect("synthesis");

        // role + key + vault + 3 plans + 1 selection + 3 outputs
        assert_eq!(graph.node_count(), 9);
        assert!(graph.get_node(VAULT_LOGICAL_ID).is_some());
        assert_eq!(graph.nodes_of_kind(&ResourceKind::Plan).len(), 3);
        assert_eq!(graph.nodes_of_kind(&ResourceKind::Selection).len(), 1);

        let owner = graph
            .owner_of("DailyBackupSelection-all")
            .expect("selection owned");
        assert_eq!(owner.id, "DailyBackupPlan");
    }

    #[test]
    fn test_synthesize_without_resources_has_no_selections() {
        let graph = stack(VaultTier::Silver)
            .synthesize(&AccountResourceMap::empty())
            .expect("synthesis");
        assert!(graph.nodes_of_kind(&ResourceKind::Selection).is_empty());
    }

    #[test]
    fn test_gold_stack_carries_lock_in_vault_node() {
        let graph = stack(VaultTier::Gold)
            .synthesize(&AccountResourceMap::empty())
            .expect("synthesis");
        let vault = graph.get_node(VAULT_LOGICAL_ID).expect("vault node");
        let properties = vault.properties.as_ref().expect("properties");
        assert_eq!(properties["lock"]["changeable_for_days"], 14);
        assert_eq!(properties["class"], "gold");
    }

    #[test]
    fn test_malformed_map_aborts_synthesis() {
        let map = AccountResourceMap::from_json_str(r#"{"111": {"weekly": 7}}"#)
            .expect("parses fine");
        let err = stack(VaultTier::Silver)
            .synthesize(&map)
            .expect_err("structural error");
        assert!(err.to_string().contains("weekly"));
    }
}
