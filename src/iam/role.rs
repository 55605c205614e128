//! Backup service role declaration

use serde::{Deserialize, Serialize};

use super::PolicyStatement;

/// Service principal the backup role trusts
pub const BACKUP_SERVICE_PRINCIPAL: &str = "backup.amazonaws.com";

/// Managed policies every backup role carries: backup and restore for the
/// general service plus the S3 variants, and SSM instance access for
/// in-instance restore tooling.
const STANDARD_MANAGED_POLICIES: [&str; 5] = [
    "service-role/AWSBackupServiceRolePolicyForBackup",
    "service-role/AWSBackupServiceRolePolicyForRestores",
    "AWSBackupServiceRolePolicyForS3Backup",
    "AWSBackupServiceRolePolicyForS3Restore",
    "AmazonSSMManagedInstanceCore",
];

/// Declaration of the role the backup service assumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupRoleSpec {
    /// Logical id of the role
    pub id: String,
    /// Human-readable purpose
    pub description: String,
    /// Service principal allowed to assume the role
    pub assumed_by: String,
    /// Managed policy names attached to the role
    pub managed_policy_names: Vec<String>,
    /// Inline statements attached to the role
    pub inline_statements: Vec<PolicyStatement>,
}

impl BackupRoleSpec {
    /// The standard backup role: assumed by the backup service, carrying the
    /// full set of backup/restore managed policies.
    pub fn standard(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: "Allows the backup service to access protected resources".to_string(),
            assumed_by: BACKUP_SERVICE_PRINCIPAL.to_string(),
            managed_policy_names: STANDARD_MANAGED_POLICIES
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
            inline_statements: Vec::new(),
        }
    }

    /// Attach an `iam:PassRole` inline statement scoped to `role_ref`, so the
    /// backup role may hand that role to SSM during restores.
    pub fn with_pass_role(mut self, role_ref: impl Into<String>) -> Self {
        self.inline_statements
            .push(PolicyStatement::pass_role(role_ref));
        self
    }
}
