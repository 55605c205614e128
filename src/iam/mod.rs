//! Declarative IAM primitives
//!
//! Policy documents and statements as plain data. Nothing here evaluates a
//! policy; these types only describe what gets submitted to the provisioning
//! service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub mod key;
pub mod role;

pub use key::{EncryptionKeySpec, RemovalPolicy};
pub use role::BackupRoleSpec;

/// A policy document attached to a vault or role
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyDocument {
    /// Statements in declaration order
    pub statements: Vec<PolicyStatement>,
}

impl PolicyDocument {
    /// Create an empty policy document
    pub fn new() -> Self {
        Self {
            statements: Vec::new(),
        }
    }

    /// Add a statement, consuming self
    pub fn with_statement(mut self, statement: PolicyStatement) -> Self {
        self.statements.push(statement);
        self
    }

    /// Append a statement in place
    pub fn push(&mut self, statement: PolicyStatement) {
        self.statements.push(statement);
    }

    /// Whether the document already carries an equal statement
    pub fn contains(&self, statement: &PolicyStatement) -> bool {
        self.statements.iter().any(|s| s == statement)
    }

    /// Number of statements
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the document has no statements
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// A single policy statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStatement {
    /// Allow or deny
    pub effect: Effect,
    /// Actions the statement covers
    pub actions: Vec<String>,
    /// Resources the statement covers
    pub resources: Vec<String>,
    /// Principals the statement applies to, absent for identity policies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    /// Optional condition block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

/// Statement effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// Grant the listed actions
    Allow,
    /// Deny the listed actions
    Deny,
}

/// Statement principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    /// Any principal (scope it down with a condition)
    Any,
    /// A service principal, e.g. `backup.amazonaws.com`
    Service(String),
}

/// Condition block, `StringEquals` only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Key/value pairs that must all match exactly
    pub string_equals: BTreeMap<String, String>,
}

impl Condition {
    /// A single-key `StringEquals` condition
    pub fn string_equals(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(key.into(), value.into());
        Self { string_equals: map }
    }
}

impl PolicyStatement {
    /// An allow statement over the given actions, covering all resources
    pub fn allow<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            effect: Effect::Allow,
            actions: actions.into_iter().map(Into::into).collect(),
            resources: vec!["*".to_string()],
            principal: None,
            condition: None,
        }
    }

    /// Restrict the statement to specific resources
    pub fn on_resources<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resources = resources.into_iter().map(Into::into).collect();
        self
    }

    /// Apply the statement to any principal
    pub fn for_any_principal(mut self) -> Self {
        self.principal = Some(Principal::Any);
        self
    }

    /// Attach a condition block
    pub fn when(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// The vault access statement: any principal in the organization may copy
    /// recovery points into the vault, nobody outside it may.
    pub fn copy_into_vault(organization_id: impl Into<String>) -> Self {
        Self::allow(["backup:CopyIntoBackupVault"])
            .for_any_principal()
            .when(Condition::string_equals(
                "aws:PrincipalOrgID",
                organization_id,
            ))
    }

    /// An `iam:PassRole` statement scoped to one role
    pub fn pass_role(role_ref: impl Into<String>) -> Self {
        Self::allow(["iam:PassRole"]).on_resources([role_ref])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_into_vault_statement() {
        let statement = PolicyStatement::copy_into_vault("o-abc123");
        assert_eq!(statement.effect, Effect::Allow);
        assert_eq!(statement.actions, vec!["backup:CopyIntoBackupVault"]);
        assert_eq!(statement.resources, vec!["*"]);
        assert_eq!(statement.principal, Some(Principal::Any));

        let condition = statement.condition.expect("condition present");
        assert_eq!(
            condition.string_equals.get("aws:PrincipalOrgID"),
            Some(&"o-abc123".to_string())
        );
    }

    #[test]
    fn test_pass_role_statement_has_no_principal() {
        let statement = PolicyStatement::pass_role("arn:aws:iam::111122223333:role/instance");
        assert!(statement.principal.is_none());
        assert_eq!(
            statement.resources,
            vec!["arn:aws:iam::111122223333:role/instance"]
        );
    }

    #[test]
    fn test_document_contains() {
        let doc = PolicyDocument::new().with_statement(PolicyStatement::copy_into_vault("o-1"));
        assert!(doc.contains(&PolicyStatement::copy_into_vault("o-1")));
        assert!(!doc.contains(&PolicyStatement::copy_into_vault("o-2")));
    }
}
