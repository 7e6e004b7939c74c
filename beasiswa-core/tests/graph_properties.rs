//! Structural properties of built graphs and the queries over them.

use beasiswa_core::{
    EntityKind, GraphBuilder, QueryEngine, RelationKind, ScholarshipFilter, ScholarshipRecord,
};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

fn sample_records() -> Vec<ScholarshipRecord> {
    let r = ScholarshipRecord::new;
    vec![
        r(0, "global merit award", "full", "Undergraduate", "canada", 0.42),
        r(1, "global merit award", "full", "Undergraduate", "canada", 0.42),
        r(1, "women in stem grant", "partial", "Postgraduate", "united-states", 0.1),
        r(2, "african leaders fund", "tuition only", "Doctoral", "nigeria", -0.2),
        r(3, "african leaders fund", "tuition only", "Doctoral", "nigeria", -0.2),
        r(3, "future engineers", "full", "Undergraduate", "nigeria", 0.0),
        r(4, "europe exchange", "other", "Other", "europe", 0.333),
    ]
}

fn engine(records: Vec<ScholarshipRecord>) -> QueryEngine {
    QueryEngine::from_graph(GraphBuilder::default().build_validated(records).graph)
}

#[test]
fn test_building_twice_is_idempotent() {
    let once = GraphBuilder::default().build_validated(sample_records());

    let mut doubled = sample_records();
    doubled.extend(sample_records());
    let twice = GraphBuilder::default().build_validated(doubled);

    assert_eq!(once.graph.node_count(), twice.graph.node_count());
    assert_eq!(once.graph.edge_count(), twice.graph.edge_count());
    assert!(once.graph.same_shape(&twice.graph));
}

#[test]
fn test_order_independence() {
    let forward = GraphBuilder::default().build_validated(sample_records());

    let mut reversed = sample_records();
    reversed.reverse();
    let backward = GraphBuilder::default().build_validated(reversed);

    let mut rotated = sample_records();
    rotated.rotate_left(3);
    let rotated = GraphBuilder::default().build_validated(rotated);

    assert!(forward.graph.same_shape(&backward.graph));
    assert!(forward.graph.same_shape(&rotated.graph));
}

#[test]
fn test_unfiltered_returns_every_scholarship() {
    let engine = engine(sample_records());
    let all: HashSet<String> = engine
        .filter_scholarships(&ScholarshipFilter::new())
        .into_iter()
        .collect();
    let scholarships: HashSet<String> = engine
        .graph()
        .nodes_of_kind(EntityKind::Scholarship)
        .map(String::from)
        .collect();

    assert_eq!(all, scholarships);
    assert_eq!(all.len(), 5);
}

#[test]
fn test_recommendations_are_scholarships() {
    let engine = engine(sample_records());
    let students = engine.list_students();
    assert_eq!(students.len(), 5);

    for student in students {
        let recs = engine.recommendations_for(&student);
        assert!(!recs.is_empty(), "{} should have recommendations", student);
        for rec in recs {
            assert_eq!(engine.graph().kind_of(&rec), Some(EntityKind::Scholarship));
        }
    }

    assert_eq!(engine.recommendations_for("SISWA_1").len(), 2);
}

#[test]
fn test_country_counts_cover_all_edges() {
    let engine = engine(sample_records());
    let in_country = engine
        .graph()
        .edges()
        .iter()
        .filter(|e| e.relation == RelationKind::InCountry)
        .count();

    let top = engine.top_countries(1000);
    let total: usize = top.iter().map(|c| c.count).sum();
    assert_eq!(total, in_country);

    assert_eq!(top[0].country, "Nigeria");
    assert_eq!(top[0].count, 2);
    let rest: Vec<&str> = top[1..].iter().map(|c| c.country.as_str()).collect();
    assert_eq!(rest, vec!["Canada", "United-States", "Europe"]);
}

#[test]
fn test_describe_preserves_labels() {
    let engine = engine(sample_records());
    let info = engine.describe("BEASISWA_women_in_stem_grant");
    assert_eq!(info[&RelationKind::HasFundType], vec!["Partial"]);
    assert_eq!(info[&RelationKind::ForLevel], vec!["Postgraduate"]);
    assert_eq!(info[&RelationKind::InCountry], vec!["United-States"]);
    assert_eq!(info[&RelationKind::HasSentiment], vec!["Sentiment_0.1"]);
    assert!(!info.contains_key(&RelationKind::RecommendedTo));
}

#[test]
fn test_filter_matches_dashboard_values() {
    let engine = engine(sample_records());
    let filter = ScholarshipFilter::new()
        .fund_type("Tuition only")
        .location("Nigeria");
    assert_eq!(
        engine.filter_scholarships(&filter),
        vec!["BEASISWA_african_leaders_fund"]
    );

    let filter = ScholarshipFilter::new().location("United-States");
    assert_eq!(
        engine.filter_scholarships(&filter),
        vec!["BEASISWA_women_in_stem_grant"]
    );
}

/// Many readers query one engine concurrently without synchronization.
#[test]
fn test_concurrent_readers() {
    let engine = Arc::new(engine(sample_records()));
    let barrier = Arc::new(Barrier::new(4));
    let expected = engine.top_countries(3);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..100 {
                    assert_eq!(engine.list_students().len(), 5, "reader {}", i);
                    assert_eq!(
                        engine
                            .filter_scholarships(&ScholarshipFilter::new().location("nigeria"))
                            .len(),
                        2
                    );
                }
                engine.top_countries(3)
            })
        })
        .collect();

    for handle in handles {
        let top = handle.join().expect("reader thread panicked");
        assert_eq!(top, expected);
    }
}
