//! Builder pattern for constructing resource graphs

use tracing::debug;

use crate::graph::{GraphError, ResourceEdge, ResourceGraph, ResourceKind, ResourceNode};

/// Builder for constructing a ResourceGraph
///
/// Nodes and edges are collected and resolved at `build()`, so declaration
/// order does not matter and the fluent chain never fails midway.
pub struct GraphBuilder {
    name: String,
    pending_nodes: Vec<ResourceNode>,
    pending_edges: Vec<PendingEdge>,
}

/// Represents an edge to be added
struct PendingEdge {
    from: String,
    to: String,
    edge: ResourceEdge,
}

impl GraphBuilder {
    /// Create a new graph builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pending_nodes: Vec::new(),
            pending_edges: Vec::new(),
        }
    }

    /// Add a node to the graph
    pub fn add_node(mut self, node: ResourceNode) -> Self {
        self.pending_nodes.push(node);
        self
    }

    /// Add a node with its declaration body
    pub fn add_resource(
        self,
        id: impl Into<String>,
        kind: ResourceKind,
        properties: serde_json::Value,
    ) -> Self {
        self.add_node(ResourceNode::new(id, kind).with_properties(properties))
    }

    /// Declare that `parent` owns `child`
    pub fn owns(mut self, parent: impl Into<String>, child: impl Into<String>) -> Self {
        self.pending_edges.push(PendingEdge {
            from: parent.into(),
            to: child.into(),
            edge: ResourceEdge::Owns,
        });
        self
    }

    /// Declare that `from` references `to`
    pub fn references(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.pending_edges.push(PendingEdge {
            from: from.into(),
            to: to.into(),
            edge: ResourceEdge::References,
        });
        self
    }

    /// Resolve pending nodes and edges, validate the invariants, and return
    /// the graph
    pub fn build(self) -> Result<ResourceGraph, GraphError> {
        let mut graph = ResourceGraph::new(self.name);
        for node in self.pending_nodes {
            graph.add_node(node)?;
        }
        for pending in self.pending_edges {
            graph.add_edge(&pending.from, &pending.to, pending.edge)?;
        }
        graph.validate()?;
        debug!(
            graph = %graph.name,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "resource graph built"
        );
        Ok(graph)
    }
}
