//! Backup rules and plans
//!
//! Each rule carries a fixed schedule/retention template. The templates are
//! deliberately not configurable: tier policy decides *where* recovery points
//! live, the rule decides *when* they are taken and how long they are kept.

use serde::{Deserialize, Serialize};

pub mod selection;

pub use selection::{ResourceSelection, SelectionError};

/// Backup cadence, one plan per rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupRule {
    /// One run per day
    Daily,
    /// One run per week
    Weekly,
    /// One run per month, retained a year
    Monthly,
}

impl BackupRule {
    /// All rules, in registration order
    pub const ALL: [BackupRule; 3] = [BackupRule::Daily, BackupRule::Weekly, BackupRule::Monthly];

    /// The lowercase key the rule uses in the account resource map
    pub fn key(&self) -> &'static str {
        match self {
            BackupRule::Daily => "daily",
            BackupRule::Weekly => "weekly",
            BackupRule::Monthly => "monthly",
        }
    }

    /// The capitalized name used in logical ids, e.g. `DailyBackupPlan`
    pub fn title(&self) -> &'static str {
        match self {
            BackupRule::Daily => "Daily",
            BackupRule::Weekly => "Weekly",
            BackupRule::Monthly => "Monthly",
        }
    }

    /// The schedule/retention template for this rule
    pub fn template(&self) -> RuleTemplate {
        match self {
            BackupRule::Daily => RuleTemplate {
                schedule_expression: "cron(0 5 * * ? *)".to_string(),
                delete_after_days: 35,
                move_to_cold_storage_after_days: None,
            },
            BackupRule::Weekly => RuleTemplate {
                schedule_expression: "cron(0 5 ? * SAT *)".to_string(),
                delete_after_days: 90,
                move_to_cold_storage_after_days: None,
            },
            BackupRule::Monthly => RuleTemplate {
                schedule_expression: "cron(0 5 1 * ? *)".to_string(),
                delete_after_days: 365,
                move_to_cold_storage_after_days: Some(30),
            },
        }
    }
}

/// Fixed schedule and retention for one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTemplate {
    /// Cron expression, UTC
    pub schedule_expression: String,
    /// Days until recovery points are deleted
    pub delete_after_days: u32,
    /// Days until recovery points move to cold storage, if ever
    pub move_to_cold_storage_after_days: Option<u32>,
}

/// A backup plan: one rule bound to one vault
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupPlan {
    /// Logical id of the plan, e.g. `DailyBackupPlan`
    pub id: String,
    /// The rule the plan runs
    pub rule: BackupRule,
    /// Template the rule expands to
    pub template: RuleTemplate,
    /// Logical id of the vault receiving recovery points
    pub vault_ref: String,
}

impl BackupPlan {
    /// A plan for `rule` targeting the vault with logical id `vault_ref`
    pub fn new(rule: BackupRule, vault_ref: impl Into<String>) -> Self {
        Self {
            id: format!("{}BackupPlan", rule.title()),
            rule,
            template: rule.template(),
            vault_ref: vault_ref.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_keys_match_side_file_keys() {
        assert_eq!(BackupRule::Daily.key(), "daily");
        assert_eq!(BackupRule::Weekly.key(), "weekly");
        assert_eq!(BackupRule::Monthly.key(), "monthly");
    }

    #[test]
    fn test_monthly_template_retains_one_year() {
        let template = BackupRule::Monthly.template();
        assert_eq!(template.delete_after_days, 365);
        assert_eq!(template.move_to_cold_storage_after_days, Some(30));
    }

    #[test]
    fn test_plan_id_from_rule() {
        let plan = BackupPlan::new(BackupRule::Weekly, "MemberAccountBackupVault");
        assert_eq!(plan.id, "WeeklyBackupPlan");
        assert_eq!(plan.vault_ref, "MemberAccountBackupVault");
    }
}
