//! Resource selections: binding protected resources to a plan

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::BackupRule;

/// Errors constructing a resource selection
#[derive(Error, Debug)]
pub enum SelectionError {
    /// A selection must cover at least one resource; empty inputs are the
    /// caller's signal to skip the rule instead.
    #[error("no resources given for {rule} selection '{selection_id}'")]
    EmptyResources {
        /// Rule the selection was meant for
        rule: &'static str,
        /// Requested selection id
        selection_id: String,
    },

    /// A resource identifier that does not look like an ARN
    #[error("invalid resource ARN '{arn}' in {rule} selection")]
    InvalidArn {
        /// Rule the selection was meant for
        rule: &'static str,
        /// The offending identifier
        arn: String,
    },
}

fn arn_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^arn:\S+$").expect("ARN pattern is valid"))
}

/// The binding of a set of protected resources to one backup plan under an
/// execution role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSelection {
    /// Rule whose plan the selection attaches to
    pub rule: BackupRule,
    /// Selection id, unique per (plan, selection)
    pub selection_id: String,
    /// Resources covered, in declaration order
    pub resource_arns: Vec<String>,
    /// Logical id of the execution role
    pub role_ref: String,
}

impl ResourceSelection {
    /// Create a selection over `resource_arns`. Fails on an empty list or a
    /// malformed ARN; skipping empty inputs is the caller's job, never done
    /// silently here.
    pub fn new(
        rule: BackupRule,
        selection_id: impl Into<String>,
        resource_arns: Vec<String>,
        role_ref: impl Into<String>,
    ) -> Result<Self, SelectionError> {
        let selection_id = selection_id.into();
        if resource_arns.is_empty() {
            return Err(SelectionError::EmptyResources {
                rule: rule.key(),
                selection_id,
            });
        }
        for arn in &resource_arns {
            if !arn_pattern().is_match(arn) {
                return Err(SelectionError::InvalidArn {
                    rule: rule.key(),
                    arn: arn.clone(),
                });
            }
        }
        Ok(Self {
            rule,
            selection_id,
            resource_arns,
            role_ref: role_ref.into(),
        })
    }

    /// Logical id of the selection, e.g. `DailyBackupSelection-all`
    pub fn logical_id(&self) -> String {
        format!("{}BackupSelection-{}", self.rule.title(), self.selection_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_resources_rejected() {
        let err = ResourceSelection::new(BackupRule::Daily, "all", Vec::new(), "backup-role")
            .expect_err("empty list must fail");
        assert!(err.to_string().contains("daily"));
    }

    #[test]
    fn test_malformed_arn_rejected() {
        let err = ResourceSelection::new(
            BackupRule::Weekly,
            "all",
            vec!["not-an-arn".to_string()],
            "backup-role",
        )
        .expect_err("malformed ARN must fail");
        assert!(err.to_string().contains("not-an-arn"));
    }

    #[test]
    fn test_logical_id_shape() {
        let selection = ResourceSelection::new(
            BackupRule::Daily,
            "all",
            vec!["arn:aws:s3:::bucket".to_string()],
            "backup-role",
        )
        .expect("valid selection");
        assert_eq!(selection.logical_id(), "DailyBackupSelection-all");
    }
}
