//! In-memory property graph for scholarship recommendations.
//!
//! Two structures back the graph:
//!
//! - `node_key → EntityKind`, kept in insertion order
//! - `source → RelationKind → targets`, each target list ordered by insertion
//!   and free of duplicates
//!
//! Every query is a lookup into the adjacency index plus a walk over the
//! matches, never a scan of the full edge list.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::schema::{EntityKind, RelationKind};

/// A node: unique key plus its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub key: String,
    pub kind: EntityKind,
}

/// A directed, typed edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub relation: RelationKind,
}

impl Edge {
    pub fn new(source: &str, target: &str, relation: RelationKind) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            relation,
        }
    }
}

/// Append-only labeled directed graph.
#[derive(Debug, Clone, Default)]
pub struct ScholarshipGraph {
    nodes: Vec<Node>,
    node_map: HashMap<String, usize>,
    edges: Vec<Edge>,
    adjacency: HashMap<String, BTreeMap<RelationKind, Vec<String>>>,
    edge_set: HashSet<(String, String, RelationKind)>,
}

impl ScholarshipGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Returns `false` if the key already existed, in which
    /// case the original kind is kept.
    pub fn add_node(&mut self, key: &str, kind: EntityKind) -> bool {
        if self.node_map.contains_key(key) {
            return false;
        }
        self.node_map.insert(key.to_string(), self.nodes.len());
        self.nodes.push(Node {
            key: key.to_string(),
            kind,
        });
        true
    }

    /// Insert an edge. Returns `false` if the same (source, target, relation)
    /// triple already existed.
    pub fn add_edge(&mut self, source: &str, target: &str, relation: RelationKind) -> bool {
        let triple = (source.to_string(), target.to_string(), relation);
        if !self.edge_set.insert(triple) {
            return false;
        }
        self.adjacency
            .entry(source.to_string())
            .or_default()
            .entry(relation)
            .or_default()
            .push(target.to_string());
        self.edges.push(Edge::new(source, target, relation));
        true
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if a node exists.
    pub fn has_node(&self, key: &str) -> bool {
        self.node_map.contains_key(key)
    }

    pub fn has_edge(&self, source: &str, target: &str, relation: RelationKind) -> bool {
        self.targets(source, relation).iter().any(|t| t == target)
    }

    /// Kind of the node with this key, if present.
    pub fn kind_of(&self, key: &str) -> Option<EntityKind> {
        self.node_map.get(key).map(|&i| self.nodes[i].kind)
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Keys of every node of `kind`, in insertion order.
    pub fn nodes_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &str> + '_ {
        self.nodes
            .iter()
            .filter(move |n| n.kind == kind)
            .map(|n| n.key.as_str())
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Targets of `source`'s outgoing edges of `relation`, in insertion order.
    pub fn targets(&self, source: &str, relation: RelationKind) -> &[String] {
        self.adjacency
            .get(source)
            .and_then(|by_rel| by_rel.get(&relation))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All outgoing edges of `source` grouped by relation.
    pub fn outgoing(&self, source: &str) -> Option<&BTreeMap<RelationKind, Vec<String>>> {
        self.adjacency.get(source)
    }

    /// Same node set (with kinds) and same edge set, ignoring insertion order.
    pub fn same_shape(&self, other: &ScholarshipGraph) -> bool {
        if self.node_count() != other.node_count() || self.edge_count() != other.edge_count() {
            return false;
        }
        let nodes_match = self
            .nodes
            .iter()
            .all(|n| other.kind_of(&n.key) == Some(n.kind));
        nodes_match && self.edge_set == other.edge_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_graph() -> ScholarshipGraph {
        let mut graph = ScholarshipGraph::new();
        graph.add_node("SISWA_0", EntityKind::Student);
        graph.add_node("BEASISWA_a", EntityKind::Scholarship);
        graph.add_node("Canada", EntityKind::Location);
        graph.add_edge("SISWA_0", "BEASISWA_a", RelationKind::RecommendedTo);
        graph.add_edge("BEASISWA_a", "Canada", RelationKind::InCountry);
        graph
    }

    #[test]
    fn test_node_insert_is_idempotent() {
        let mut graph = create_test_graph();
        assert!(!graph.add_node("SISWA_0", EntityKind::Scholarship));
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.kind_of("SISWA_0"), Some(EntityKind::Student));
    }

    #[test]
    fn test_edge_insert_is_idempotent() {
        let mut graph = create_test_graph();
        assert!(!graph.add_edge("BEASISWA_a", "Canada", RelationKind::InCountry));
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.targets("BEASISWA_a", RelationKind::InCountry), ["Canada"]);
    }

    #[test]
    fn test_parallel_edges_need_distinct_relations() {
        let mut graph = create_test_graph();
        assert!(graph.add_edge("BEASISWA_a", "Canada", RelationKind::HasFundType));
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.has_edge("BEASISWA_a", "Canada", RelationKind::HasFundType));
        assert!(graph.has_edge("BEASISWA_a", "Canada", RelationKind::InCountry));
    }

    #[test]
    fn test_targets_of_unknown_source() {
        let graph = create_test_graph();
        assert!(graph.targets("nope", RelationKind::InCountry).is_empty());
        assert!(graph.outgoing("nope").is_none());
        assert!(!graph.has_node("nope"));
    }

    #[test]
    fn test_nodes_of_kind_preserves_order() {
        let mut graph = create_test_graph();
        graph.add_node("SISWA_9", EntityKind::Student);
        graph.add_node("SISWA_1", EntityKind::Student);
        let students: Vec<&str> = graph.nodes_of_kind(EntityKind::Student).collect();
        assert_eq!(students, vec!["SISWA_0", "SISWA_9", "SISWA_1"]);
    }

    #[test]
    fn test_same_shape_ignores_order() {
        let a = create_test_graph();

        let mut b = ScholarshipGraph::new();
        b.add_node("Canada", EntityKind::Location);
        b.add_node("BEASISWA_a", EntityKind::Scholarship);
        b.add_node("SISWA_0", EntityKind::Student);
        b.add_edge("BEASISWA_a", "Canada", RelationKind::InCountry);
        b.add_edge("SISWA_0", "BEASISWA_a", RelationKind::RecommendedTo);

        assert!(a.same_shape(&b));

        b.add_node("Nigeria", EntityKind::Location);
        assert!(!a.same_shape(&b));
    }
}
