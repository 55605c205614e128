//! The account resource map side-file
//!
//! A JSON document mapping account id → rule name → list of resource ARNs:
//!
//! ```json
//! { "111122223333": { "daily": ["arn:..."], "weekly": [], "monthly": ["arn:..."] } }
//! ```
//!
//! The lookup contract is explicit: an absent account or rule key means "no
//! resources configured" and yields `Ok(None)`; a value of the wrong shape is
//! a structural error naming the account and rule, so synthesis aborts rather
//! than silently producing an incomplete plan.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::plan::BackupRule;

/// Errors reading or interrogating the account resource map
#[derive(Error, Debug)]
pub enum MapError {
    /// The side-file could not be read at all
    #[error("cannot read account resource map at {path}: {source}")]
    Unreadable {
        /// Path that was attempted
        path: PathBuf,
        /// Underlying IO failure
        #[source]
        source: std::io::Error,
    },

    /// The side-file is not valid JSON
    #[error("account resource map is not valid JSON: {source}")]
    Parse {
        /// Underlying JSON failure
        #[source]
        source: serde_json::Error,
    },

    /// The document root is not an object
    #[error("account resource map root must be an object, got {actual}")]
    RootNotObject {
        /// JSON type actually found
        actual: &'static str,
    },

    /// A value somewhere under an account has the wrong shape
    #[error(
        "malformed entry for account '{account_id}' rule '{rule}': expected {expected}, got {actual}"
    )]
    InvalidShape {
        /// Account whose entry is malformed
        account_id: String,
        /// Rule being looked up when the malformation was found
        rule: &'static str,
        /// Shape the contract requires
        expected: &'static str,
        /// JSON type actually found
        actual: &'static str,
    },
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The parsed side-file, read once per synthesis and never mutated
#[derive(Debug, Clone)]
pub struct AccountResourceMap {
    entries: HashMap<String, Value>,
}

impl AccountResourceMap {
    /// Read and parse the side-file from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MapError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| MapError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::from_json_str(&raw)?;
        debug!(
            path = %path.display(),
            accounts = map.entries.len(),
            "loaded account resource map"
        );
        Ok(map)
    }

    /// Parse the side-file from a JSON string
    pub fn from_json_str(raw: &str) -> Result<Self, MapError> {
        let value: Value = serde_json::from_str(raw).map_err(|source| MapError::Parse { source })?;
        match value {
            Value::Object(object) => Ok(Self {
                entries: object.into_iter().collect(),
            }),
            other => Err(MapError::RootNotObject {
                actual: json_type_name(&other),
            }),
        }
    }

    /// An empty map, for callers with no side-file configured
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Account ids present in the map, in no particular order
    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Look up the ARNs configured for `(account_id, rule)`.
    ///
    /// `Ok(None)` means the account or the rule key is absent: no resources
    /// configured, not an error. A present value of the wrong shape is a
    /// [`MapError::InvalidShape`] carrying the account and rule.
    pub fn resources_for(
        &self,
        account_id: &str,
        rule: BackupRule,
    ) -> Result<Option<Vec<String>>, MapError> {
        let Some(account_entry) = self.entries.get(account_id) else {
            return Ok(None);
        };

        let rules = account_entry
            .as_object()
            .ok_or_else(|| MapError::InvalidShape {
                account_id: account_id.to_string(),
                rule: rule.key(),
                expected: "object of rule name to ARN list",
                actual: json_type_name(account_entry),
            })?;

        let Some(list) = rules.get(rule.key()) else {
            return Ok(None);
        };

        let items = list.as_array().ok_or_else(|| MapError::InvalidShape {
            account_id: account_id.to_string(),
            rule: rule.key(),
            expected: "array of ARN strings",
            actual: json_type_name(list),
        })?;

        let mut arns = Vec::with_capacity(items.len());
        for item in items {
            let arn = item.as_str().ok_or_else(|| MapError::InvalidShape {
                account_id: account_id.to_string(),
                rule: rule.key(),
                expected: "ARN string",
                actual: json_type_name(item),
            })?;
            arns.push(arn.to_string());
        }
        Ok(Some(arns))
    }
}
