//! Node and edge types for the resource graph

use serde::{Deserialize, Serialize};

/// Represents one declared resource in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Logical id, unique within a graph
    pub id: String,

    /// Kind of resource the node declares
    pub kind: ResourceKind,

    /// Declaration body as emitted into the manifest
    pub properties: Option<serde_json::Value>,
}

impl ResourceNode {
    /// A node with no declaration body
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            properties: None,
        }
    }

    /// Attach the declaration body
    pub fn with_properties(mut self, properties: serde_json::Value) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// Kinds of resources a graph can declare
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResourceKind {
    /// A backup vault
    Vault,

    /// A backup plan carrying one rule
    Plan,

    /// A resource selection attached to a plan
    Selection,

    /// An IAM role
    Role,

    /// An encryption key
    Key,

    /// A stack output referencing another node
    Output,

    /// A source repository declaration
    Repository,

    /// A deployment pipeline declaration
    Pipeline,
}

/// Relationship between two declared resources
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResourceEdge {
    /// Parent owns child; the child never outlives the parent
    Owns,

    /// Source refers to target without owning it
    References,
}
