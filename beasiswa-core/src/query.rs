//! Read-only query engine over a built [`ScholarshipGraph`].
//!
//! All operations are total: unknown keys and empty graphs yield empty
//! results, never errors. The engine holds its graph behind an `Arc` and never
//! mutates it, so one engine can be shared across threads without locking.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::graph::ScholarshipGraph;
use crate::schema::{EntityKind, RelationKind};

/// Number of countries returned by `top_countries` when the caller gives none.
pub const DEFAULT_TOP_COUNTRIES: i64 = 5;

/// Optional attribute filters, matched case-insensitively and combined with AND.
///
/// Blank strings count as omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScholarshipFilter {
    #[serde(default)]
    pub fund_type: Option<String>,
    #[serde(default)]
    pub study_level: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl ScholarshipFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fund_type(mut self, value: &str) -> Self {
        self.fund_type = Some(value.to_string());
        self
    }

    pub fn study_level(mut self, value: &str) -> Self {
        self.study_level = Some(value.to_string());
        self
    }

    pub fn location(mut self, value: &str) -> Self {
        self.location = Some(value.to_string());
        self
    }

    /// Active (relation, lower-cased value) pairs.
    fn active(&self) -> Vec<(RelationKind, String)> {
        [
            (RelationKind::HasFundType, &self.fund_type),
            (RelationKind::ForLevel, &self.study_level),
            (RelationKind::InCountry, &self.location),
        ]
        .into_iter()
        .filter_map(|(rel, value)| {
            let value = value.as_deref()?.trim();
            (!value.is_empty()).then(|| (rel, value.to_lowercase()))
        })
        .collect()
    }
}

/// One row of `top_countries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
    pub country: String,
    pub count: usize,
}

/// Node and edge counts broken down by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_kind: BTreeMap<EntityKind, usize>,
    pub edges_by_relation: BTreeMap<RelationKind, usize>,
}

/// Answers recommendation queries against one immutable graph.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    graph: Arc<ScholarshipGraph>,
}

impl QueryEngine {
    /// Create an engine over a built graph.
    pub fn new(graph: Arc<ScholarshipGraph>) -> Self {
        Self { graph }
    }

    pub fn from_graph(graph: ScholarshipGraph) -> Self {
        Self::new(Arc::new(graph))
    }

    pub fn graph(&self) -> &ScholarshipGraph {
        &self.graph
    }

    /// Every `STUDENT` node, in insertion order.
    pub fn list_students(&self) -> Vec<String> {
        self.graph
            .nodes_of_kind(EntityKind::Student)
            .map(String::from)
            .collect()
    }

    /// Scholarships recommended to `student_key`; empty if unknown.
    pub fn recommendations_for(&self, student_key: &str) -> Vec<String> {
        self.graph
            .targets(student_key, RelationKind::RecommendedTo)
            .to_vec()
    }

    /// Outgoing edges of `scholarship_key` grouped by relation, values in
    /// edge-insertion order; empty if unknown.
    pub fn describe(&self, scholarship_key: &str) -> BTreeMap<RelationKind, Vec<String>> {
        self.graph
            .outgoing(scholarship_key)
            .cloned()
            .unwrap_or_default()
    }

    /// The `n` most common `IN_COUNTRY` targets, descending by count.
    ///
    /// Ties keep the order in which countries were first encountered.
    /// `n <= 0` yields nothing.
    pub fn top_countries(&self, n: i64) -> Vec<CountryCount> {
        if n <= 0 {
            return Vec::new();
        }

        let mut counts: Vec<CountryCount> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for edge in self.graph.edges() {
            if edge.relation != RelationKind::InCountry {
                continue;
            }
            match index.get(edge.target.as_str()) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(edge.target.as_str(), counts.len());
                    counts.push(CountryCount {
                        country: edge.target.clone(),
                        count: 1,
                    });
                }
            }
        }

        // stable sort keeps first-encountered order among equal counts
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        counts.truncate(usize::try_from(n).unwrap_or(usize::MAX));
        counts
    }

    /// Scholarships matching every provided filter.
    ///
    /// A scholarship with no edge of a filtered relation never matches that
    /// filter. With no filters, returns every `SCHOLARSHIP` node.
    pub fn filter_scholarships(&self, filter: &ScholarshipFilter) -> Vec<String> {
        let active = filter.active();

        self.graph
            .nodes_of_kind(EntityKind::Scholarship)
            .filter(|key| {
                active.iter().all(|(relation, wanted)| {
                    self.graph
                        .targets(key, *relation)
                        .iter()
                        .any(|label| label.to_lowercase() == *wanted)
                })
            })
            .map(String::from)
            .collect()
    }

    /// Counts per node kind and per relation.
    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            ..Default::default()
        };
        for node in self.graph.nodes() {
            *stats.nodes_by_kind.entry(node.kind).or_default() += 1;
        }
        for edge in self.graph.edges() {
            *stats.edges_by_relation.entry(edge.relation).or_default() += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::record::ScholarshipRecord;

    fn engine(records: Vec<ScholarshipRecord>) -> QueryEngine {
        QueryEngine::from_graph(GraphBuilder::default().build_validated(records).graph)
    }

    fn merit() -> ScholarshipRecord {
        ScholarshipRecord::new(0, "Global Merit Award", "full", "Undergraduate", "Canada", 0.42)
    }

    #[test]
    fn test_single_record_scenario() {
        let engine = engine(vec![merit()]);

        assert_eq!(engine.list_students(), vec!["SISWA_0"]);
        assert_eq!(
            engine.recommendations_for("SISWA_0"),
            vec!["BEASISWA_Global_Merit_Award"]
        );

        let info = engine.describe("BEASISWA_Global_Merit_Award");
        assert_eq!(info.len(), 4);
        assert_eq!(info[&RelationKind::HasFundType], vec!["Full"]);
        assert_eq!(info[&RelationKind::ForLevel], vec!["Undergraduate"]);
        assert_eq!(info[&RelationKind::InCountry], vec!["Canada"]);
        assert_eq!(info[&RelationKind::HasSentiment], vec!["Sentiment_0.42"]);

        assert_eq!(
            engine.filter_scholarships(&ScholarshipFilter::new().location("canada")),
            vec!["BEASISWA_Global_Merit_Award"]
        );
        assert!(engine
            .filter_scholarships(&ScholarshipFilter::new().location("nigeria"))
            .is_empty());
    }

    #[test]
    fn test_unknown_keys_yield_empty() {
        let engine = engine(vec![merit()]);
        assert!(engine.recommendations_for("SISWA_99").is_empty());
        assert!(engine.recommendations_for("BEASISWA_Global_Merit_Award").is_empty());
        assert!(engine.describe("BEASISWA_Missing").is_empty());
    }

    #[test]
    fn test_empty_graph() {
        let engine = QueryEngine::default();
        assert!(engine.list_students().is_empty());
        assert!(engine.top_countries(DEFAULT_TOP_COUNTRIES).is_empty());
        assert!(engine.filter_scholarships(&ScholarshipFilter::new()).is_empty());
        assert_eq!(engine.stats().node_count, 0);
    }

    #[test]
    fn test_top_countries_tie_break() {
        let engine = engine(vec![
            ScholarshipRecord::new(0, "A", "full", "Undergraduate", "canada", 0.1),
            ScholarshipRecord::new(1, "B", "full", "Undergraduate", "nigeria", 0.1),
        ]);
        assert_eq!(
            engine.top_countries(1),
            vec![CountryCount {
                country: "Canada".to_string(),
                count: 1
            }]
        );
        assert!(engine.top_countries(0).is_empty());
        assert!(engine.top_countries(-3).is_empty());
    }

    #[test]
    fn test_top_countries_orders_by_count() {
        let engine = engine(vec![
            ScholarshipRecord::new(0, "A", "full", "Undergraduate", "canada", 0.1),
            ScholarshipRecord::new(1, "B", "full", "Undergraduate", "nigeria", 0.1),
            ScholarshipRecord::new(2, "C", "full", "Undergraduate", "nigeria", 0.1),
            // same scholarship again: no new IN_COUNTRY edge
            ScholarshipRecord::new(3, "A", "full", "Undergraduate", "canada", 0.1),
        ]);
        let top = engine.top_countries(5);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].country, "Nigeria");
        assert_eq!(top[0].count, 2);
        assert_eq!(top[1].country, "Canada");
        assert_eq!(top[1].count, 1);
    }

    #[test]
    fn test_filter_combines_with_and() {
        let engine = engine(vec![
            ScholarshipRecord::new(0, "A", "full", "Undergraduate", "canada", 0.1),
            ScholarshipRecord::new(1, "B", "partial", "Undergraduate", "canada", 0.1),
            ScholarshipRecord::new(2, "C", "full", "Doctoral", "canada", 0.1),
        ]);

        let filter = ScholarshipFilter::new().fund_type("FULL").study_level("undergraduate");
        assert_eq!(engine.filter_scholarships(&filter), vec!["BEASISWA_A"]);

        let filter = ScholarshipFilter::new().location("Canada");
        assert_eq!(engine.filter_scholarships(&filter).len(), 3);

        let filter = ScholarshipFilter::new().fund_type("tuition only");
        assert!(engine.filter_scholarships(&filter).is_empty());
    }

    #[test]
    fn test_blank_filter_is_omitted() {
        let engine = engine(vec![merit()]);
        let filter = ScholarshipFilter {
            fund_type: Some("  ".to_string()),
            study_level: Some(String::new()),
            location: None,
        };
        assert_eq!(engine.filter_scholarships(&filter).len(), 1);
    }

    #[test]
    fn test_stats() {
        let engine = engine(vec![merit()]);
        let stats = engine.stats();
        assert_eq!(stats.node_count, 6);
        assert_eq!(stats.edge_count, 5);
        assert_eq!(stats.nodes_by_kind[&EntityKind::Student], 1);
        assert_eq!(stats.edges_by_relation[&RelationKind::InCountry], 1);
    }
}
