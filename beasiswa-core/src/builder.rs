//! Graph builder: turns a batch of records into a [`ScholarshipGraph`].
//!
//! Each accepted record contributes six nodes and five edges:
//!
//! ```text
//! SISWA_<i> -RECOMMENDED_TO-> BEASISWA_<title> -HAS_FUND_TYPE-> Full
//!                                              -FOR_LEVEL-----> Undergraduate
//!                                              -IN_COUNTRY----> Canada
//!                                              -HAS_SENTIMENT-> Sentiment_0.42
//! ```
//!
//! Insertion is idempotent, so record order and duplicate records do not
//! change the resulting graph shape.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{BuildError, RecordError};
use crate::graph::ScholarshipGraph;
use crate::record::{RawRecord, RecordRow, ScholarshipRecord};
use crate::schema::{EntityKind, RelationKind};

/// Where the eligibility flag is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EligibilityPolicy {
    /// Records arrive already filtered; every record gets a `RECOMMENDED_TO` edge.
    #[default]
    Upstream,
    /// Only records with `is_recommended == true` get a student node and a
    /// `RECOMMENDED_TO` edge. Scholarship attributes are recorded either way.
    GateOnFlag,
}

/// What to do with a record that fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedPolicy {
    /// Log, count and continue.
    #[default]
    Skip,
    /// Fail the whole build on the first rejected record.
    Abort,
}

/// Builder configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    #[serde(default)]
    pub eligibility: EligibilityPolicy,
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

/// A record the builder refused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    /// Zero-based position in the input batch.
    pub position: usize,
    #[serde(serialize_with = "serialize_display")]
    pub error: RecordError,
}

fn serialize_display<S: serde::Serializer>(err: &RecordError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(err)
}

/// Summary of one build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub records_seen: usize,
    pub records_accepted: usize,
    pub records_rejected: usize,
    /// Accepted records whose recommendation edge was withheld by
    /// [`EligibilityPolicy::GateOnFlag`].
    pub recommendations_gated: usize,
    pub node_count: usize,
    pub edge_count: usize,
    #[serde(skip)]
    pub duration: Duration,
    pub rejections: Vec<Rejection>,
}

/// A built graph together with its build report.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub graph: ScholarshipGraph,
    pub report: BuildReport,
}

/// Builds recommendation graphs from record batches.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    options: BuildOptions,
}

impl GraphBuilder {
    /// Create a new builder.
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Build from unvalidated records.
    pub fn build<I>(&self, records: I) -> Result<BuildOutput, BuildError>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        self.build_rows(records.into_iter().map(Ok))
    }

    /// Build from already validated records. Cannot fail.
    pub fn build_validated<I>(&self, records: I) -> BuildOutput
    where
        I: IntoIterator<Item = ScholarshipRecord>,
    {
        let start = Instant::now();
        let mut graph = ScholarshipGraph::new();
        let mut report = BuildReport::default();

        for record in records {
            report.records_seen += 1;
            self.accept(&mut graph, &mut report, &record);
        }

        self.finish(graph, report, start)
    }

    /// Build from decoded rows, applying the malformed-record policy to rows
    /// that failed decoding or validation.
    pub fn build_rows<I>(&self, rows: I) -> Result<BuildOutput, BuildError>
    where
        I: IntoIterator<Item = RecordRow>,
    {
        let start = Instant::now();
        let mut graph = ScholarshipGraph::new();
        let mut report = BuildReport::default();

        for (position, row) in rows.into_iter().enumerate() {
            report.records_seen += 1;

            match row.and_then(|raw| raw.validate()) {
                Ok(record) => self.accept(&mut graph, &mut report, &record),
                Err(error) => {
                    if self.options.on_malformed == MalformedPolicy::Abort {
                        return Err(BuildError::Malformed {
                            position,
                            source: error,
                        });
                    }
                    warn!("Skipping record {}: {}", position, error);
                    report.records_rejected += 1;
                    report.rejections.push(Rejection { position, error });
                }
            }
        }

        Ok(self.finish(graph, report, start))
    }

    fn accept(
        &self,
        graph: &mut ScholarshipGraph,
        report: &mut BuildReport,
        record: &ScholarshipRecord,
    ) {
        insert_scholarship(graph, record);

        let gated =
            self.options.eligibility == EligibilityPolicy::GateOnFlag && !record.is_recommended;
        if gated {
            debug!(
                "Withholding recommendation for record {} (not eligible)",
                record.record_index
            );
            report.recommendations_gated += 1;
        } else {
            let student = record.student_key();
            graph.add_node(&student, EntityKind::Student);
            graph.add_edge(&student, &record.scholarship_key(), RelationKind::RecommendedTo);
        }

        report.records_accepted += 1;
    }

    fn finish(
        &self,
        graph: ScholarshipGraph,
        mut report: BuildReport,
        start: Instant,
    ) -> BuildOutput {
        report.node_count = graph.node_count();
        report.edge_count = graph.edge_count();
        report.duration = start.elapsed();

        info!(
            "Built graph: {} nodes, {} edges from {} records ({} rejected, {} gated) in {:?}",
            report.node_count,
            report.edge_count,
            report.records_seen,
            report.records_rejected,
            report.recommendations_gated,
            report.duration
        );

        BuildOutput { graph, report }
    }
}

/// Scholarship node, its four attribute nodes and the edges to them.
fn insert_scholarship(graph: &mut ScholarshipGraph, record: &ScholarshipRecord) {
    let scholarship = record.scholarship_key();
    graph.add_node(&scholarship, EntityKind::Scholarship);

    let attributes = [
        (record.fund_label(), EntityKind::FundType, RelationKind::HasFundType),
        (record.level_label(), EntityKind::StudyLevel, RelationKind::ForLevel),
        (record.location_label(), EntityKind::Location, RelationKind::InCountry),
        (record.sentiment_label(), EntityKind::Sentiment, RelationKind::HasSentiment),
    ];

    for (label, kind, relation) in attributes {
        graph.add_node(&label, kind);
        graph.add_edge(&scholarship, &label, relation);
    }
}
