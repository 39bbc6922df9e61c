//! Composition graph
//!
//! Directed graph over module ids backed by adjacency lists. Nodes and edges
//! keep insertion order so that traversal and export are deterministic.
//! At most one edge exists per ordered `(from, to)` pair.

use crate::edge::TypedEdge;
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
struct Adjacency {
    successors: IndexSet<String>,
    predecessors: IndexSet<String>,
}

/// Topological sort failed; the listed nodes sit on or behind a cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    /// Nodes left with non-zero in-degree after Kahn's algorithm
    pub unresolved: Vec<String>,
}

/// Working graph of a composition
#[derive(Debug, Clone, Default)]
pub struct CompositionGraph {
    nodes: IndexMap<String, Adjacency>,
    edges: IndexMap<(String, String), TypedEdge>,
}

impl CompositionGraph {
    /// Create empty graph
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; returns false if it already existed
    pub fn add_node(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.nodes.contains_key(&id) {
            return false;
        }
        self.nodes.insert(id, Adjacency::default());
        true
    }

    /// Insert an edge, adding missing endpoints as nodes
    ///
    /// An existing `(from, to)` pair keeps its position but its metadata is
    /// replaced; the previous edge is returned.
    pub fn add_edge(&mut self, edge: TypedEdge) -> Option<TypedEdge> {
        let from = edge.from_node.clone();
        let to = edge.to_node.clone();
        self.add_node(from.clone());
        self.add_node(to.clone());

        if let Some(adj) = self.nodes.get_mut(&from) {
            adj.successors.insert(to.clone());
        }
        if let Some(adj) = self.nodes.get_mut(&to) {
            adj.predecessors.insert(from.clone());
        }
        self.edges.insert((from, to), edge)
    }

    /// Whether the node exists
    #[inline]
    #[must_use]
    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Edge between an ordered pair
    #[must_use]
    pub fn edge(&self, from: &str, to: &str) -> Option<&TypedEdge> {
        self.edges.get(&(from.to_string(), to.to_string()))
    }

    /// Node ids in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &TypedEdge> {
        self.edges.values()
    }

    /// `(from, to)` pairs in insertion order
    pub fn edge_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.keys().map(|(f, t)| (f.as_str(), t.as_str()))
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// In-degree of a node (0 if absent)
    #[must_use]
    pub fn in_degree(&self, id: &str) -> usize {
        self.nodes.get(id).map_or(0, |adj| adj.predecessors.len())
    }

    /// Out-degree of a node (0 if absent)
    #[must_use]
    pub fn out_degree(&self, id: &str) -> usize {
        self.nodes.get(id).map_or(0, |adj| adj.successors.len())
    }

    /// Successors of a node in insertion order
    pub fn successors(&self, id: &str) -> impl Iterator<Item = &str> {
        self.nodes
            .get(id)
            .into_iter()
            .flat_map(|adj| adj.successors.iter().map(String::as_str))
    }

    /// Nodes with neither incoming nor outgoing edges
    #[must_use]
    pub fn isolates(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, adj)| adj.successors.is_empty() && adj.predecessors.is_empty())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Nodes with in-degree 0
    #[must_use]
    pub fn entry_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, adj)| adj.predecessors.is_empty())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Nodes with out-degree 0
    #[must_use]
    pub fn exit_nodes(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|(_, adj)| adj.successors.is_empty())
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Kahn's algorithm
    ///
    /// Ready nodes are taken in insertion order, so the result is
    /// deterministic for a given construction sequence. A self-loop counts
    /// as a cycle.
    ///
    /// # Errors
    /// Returns [`CycleError`] if not every node can be ordered
    pub fn topological_order(&self) -> Result<Vec<String>, CycleError> {
        let mut in_degree: IndexMap<&str, usize> = self
            .nodes
            .iter()
            .map(|(id, adj)| (id.as_str(), adj.predecessors.len()))
            .collect();

        let mut ready: VecDeque<&str> = in_degree
            .iter()
            .filter(|(_, &d)| d == 0)
            .map(|(&id, _)| id)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.pop_front() {
            order.push(id.to_string());
            for succ in self.successors(id) {
                if let Some(d) = in_degree.get_mut(succ) {
                    *d -= 1;
                    if *d == 0 {
                        ready.push_back(succ);
                    }
                }
            }
        }

        if order.len() == self.nodes.len() {
            Ok(order)
        } else {
            Err(CycleError {
                unresolved: in_degree
                    .into_iter()
                    .filter(|(_, d)| *d > 0)
                    .map(|(id, _)| id.to_string())
                    .collect(),
            })
        }
    }

    /// Whether a topological order exists
    #[inline]
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        self.topological_order().is_ok()
    }
}
