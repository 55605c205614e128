//! Resource graph structures for declarative infrastructure
//!
//! This module provides the typed resource graph the rest of the crate
//! synthesizes into: nodes are declared resources (vaults, plans, selections,
//! roles, keys, outputs), edges are ownership or reference relationships.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use thiserror::Error;

pub mod builder;
pub mod node;

pub use builder::GraphBuilder;
pub use node::{ResourceEdge, ResourceKind, ResourceNode};

/// Errors specific to resource graph operations
#[derive(Error, Debug)]
pub enum GraphError {
    /// Referenced node does not exist
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Logical ids must be unique within a graph
    #[error("Duplicate node id: {0}")]
    DuplicateNode(String),

    /// An edge endpoint is missing
    #[error("Edge endpoint missing: from {from} to {to}")]
    EdgeEndpointMissing {
        /// Source logical id
        from: String,
        /// Target logical id
        to: String,
    },

    /// Ownership invariant broken
    #[error("Ownership violation: {0}")]
    OwnershipViolation(String),

    /// Reference invariant broken
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

/// A validated declarative resource graph
#[derive(Debug, Clone)]
pub struct ResourceGraph {
    /// Name of the graph, typically the stack name
    pub name: String,
    graph: DiGraph<ResourceNode, ResourceEdge>,
    node_map: HashMap<String, NodeIndex>,
}

impl ResourceGraph {
    /// Create an empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a node. Logical ids are unique; re-declaring one is an error.
    pub fn add_node(&mut self, node: ResourceNode) -> Result<(), GraphError> {
        if self.node_map.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_map.insert(id, index);
        Ok(())
    }

    /// Add an edge between two declared nodes
    pub fn add_edge(&mut self, from: &str, to: &str, edge: ResourceEdge) -> Result<(), GraphError> {
        let from_idx = *self
            .node_map
            .get(from)
            .ok_or_else(|| GraphError::EdgeEndpointMissing {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        let to_idx = *self
            .node_map
            .get(to)
            .ok_or_else(|| GraphError::EdgeEndpointMissing {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        self.graph.add_edge(from_idx, to_idx, edge);
        Ok(())
    }

    /// Get a node by logical id
    pub fn get_node(&self, id: &str) -> Option<&ResourceNode> {
        self.node_map.get(id).map(|idx| &self.graph[*idx])
    }

    /// All nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.graph.node_weights()
    }

    /// Nodes of one kind
    pub fn nodes_of_kind(&self, kind: &ResourceKind) -> Vec<&ResourceNode> {
        self.nodes().filter(|n| &n.kind == kind).collect()
    }

    /// Number of declared nodes
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of declared edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The node that owns `id`, if any
    pub fn owner_of(&self, id: &str) -> Option<&ResourceNode> {
        let idx = *self.node_map.get(id)?;
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .find(|e| *e.weight() == ResourceEdge::Owns)
            .map(|e| &self.graph[e.source()])
    }

    /// Ids of nodes `id` references (non-owning edges)
    pub fn references_of(&self, id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_map.get(id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| *e.weight() == ResourceEdge::References)
            .map(|e| self.graph[e.target()].id.as_str())
            .collect()
    }

    /// Check the structural invariants of a backup declaration:
    ///
    /// - every `Selection` is owned by exactly one `Plan` and references a
    ///   `Role`
    /// - every `Plan` references a `Vault`
    /// - every `Output` references exactly one node
    pub fn validate(&self) -> Result<(), GraphError> {
        for node in self.nodes() {
            match node.kind {
                ResourceKind::Selection => {
                    match self.owner_of(&node.id) {
                        Some(owner) if owner.kind == ResourceKind::Plan => {}
                        Some(owner) => {
                            return Err(GraphError::OwnershipViolation(format!(
                                "selection '{}' is owned by '{}', expected a plan",
                                node.id, owner.id
                            )))
                        }
                        None => {
                            return Err(GraphError::OwnershipViolation(format!(
                                "selection '{}' has no owning plan",
                                node.id
                            )))
                        }
                    }
                    let references_role = self
                        .references_of(&node.id)
                        .iter()
                        .any(|&id| {
                            self.get_node(id)
                                .is_some_and(|n| n.kind == ResourceKind::Role)
                        });
                    if !references_role {
                        return Err(GraphError::InvalidReference(format!(
                            "selection '{}' references no execution role",
                            node.id
                        )));
                    }
                }
                ResourceKind::Plan => {
                    let references_vault = self
                        .references_of(&node.id)
                        .iter()
                        .any(|&id| {
                            self.get_node(id)
                                .is_some_and(|n| n.kind == ResourceKind::Vault)
                        });
                    if !references_vault {
                        return Err(GraphError::InvalidReference(format!(
                            "plan '{}' targets no vault",
                            node.id
                        )));
                    }
                }
                ResourceKind::Output => {
                    if self.references_of(&node.id).len() != 1 {
                        return Err(GraphError::InvalidReference(format!(
                            "output '{}' must reference exactly one node",
                            node.id
                        )));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Serialize the graph into a deterministic manifest fragment: nodes and
    /// edges sorted by logical id.
    pub fn to_manifest_value(&self) -> serde_json::Value {
        #[derive(Serialize)]
        struct EdgeEntry<'a> {
            from: &'a str,
            to: &'a str,
            edge: &'a ResourceEdge,
        }

        let mut nodes: Vec<&ResourceNode> = self.nodes().collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges: Vec<EdgeEntry<'_>> = self
            .graph
            .edge_references()
            .map(|e| EdgeEntry {
                from: self.graph[e.source()].id.as_str(),
                to: self.graph[e.target()].id.as_str(),
                edge: e.weight(),
            })
            .collect();
        edges.sort_by(|a, b| (a.from, a.to).cmp(&(b.from, b.to)));

        serde_json::json!({
            "name": self.name,
            "nodes": nodes,
            "edges": edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_node_rejected() {
        let mut graph = ResourceGraph::new("test");
        graph
            .add_node(ResourceNode::new("vault", ResourceKind::Vault))
            .expect("first insert");
        let err = graph
            .add_node(ResourceNode::new("vault", ResourceKind::Vault))
            .expect_err("duplicate id");
        assert!(matches!(err, GraphError::DuplicateNode(_)));
    }

    #[test]
    fn test_edge_requires_endpoints() {
        let mut graph = ResourceGraph::new("test");
        graph
            .add_node(ResourceNode::new("vault", ResourceKind::Vault))
            .expect("insert");
        let err = graph
            .add_edge("vault", "missing", ResourceEdge::References)
            .expect_err("missing endpoint");
        assert!(matches!(err, GraphError::EdgeEndpointMissing { .. }));
    }

    #[test]
    fn test_owner_lookup() {
        let mut graph = ResourceGraph::new("test");
        graph
            .add_node(ResourceNode::new("plan", ResourceKind::Plan))
            .expect("insert");
        graph
            .add_node(ResourceNode::new("selection", ResourceKind::Selection))
            .expect("insert");
        graph
            .add_edge("plan", "selection", ResourceEdge::Owns)
            .expect("edge");
        let owner = graph.owner_of("selection").expect("owned");
        assert_eq!(owner.id, "plan");
    }

    #[test]
    fn test_validate_rejects_orphan_selection() {
        let mut graph = ResourceGraph::new("test");
        graph
            .add_node(ResourceNode::new("selection", ResourceKind::Selection))
            .expect("insert");
        let err = graph.validate().expect_err("orphan selection");
        assert!(matches!(err, GraphError::OwnershipViolation(_)));
    }

    #[test]
    fn test_manifest_is_deterministic() {
        let mut graph = ResourceGraph::new("test");
        graph
            .add_node(ResourceNode::new("b", ResourceKind::Role))
            .expect("insert");
        graph
            .add_node(ResourceNode::new("a", ResourceKind::Key))
            .expect("insert");
        let first = graph.to_manifest_value();
        let second = graph.to_manifest_value();
        assert_eq!(first, second);
        assert_eq!(first["nodes"][0]["id"], "a");
    }
}
