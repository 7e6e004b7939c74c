//! Beasiswa Core - scholarship recommendation graph.
//!
//! Models students, scholarships and scholarship attributes as a labeled
//! directed graph and answers recommendation queries against it.
//!
//! # Architecture
//!
//! ```text
//! records (json/jsonl/csv) -> GraphBuilder -> ScholarshipGraph -> QueryEngine
//!                                                   |
//!                                                snapshot
//! ```
//!
//! # Usage
//!
//! ```
//! use beasiswa_core::{GraphBuilder, QueryEngine, ScholarshipFilter, ScholarshipRecord};
//!
//! let record =
//!     ScholarshipRecord::new(0, "Global Merit Award", "full", "Undergraduate", "Canada", 0.42);
//! let output = GraphBuilder::default().build_validated(vec![record]);
//! let engine = QueryEngine::from_graph(output.graph);
//!
//! assert_eq!(engine.recommendations_for("SISWA_0"), vec!["BEASISWA_Global_Merit_Award"]);
//! assert_eq!(engine.filter_scholarships(&ScholarshipFilter::new().location("canada")).len(), 1);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod prepare;
pub mod query;
pub mod record;
pub mod schema;
pub mod snapshot;

pub use builder::{
    BuildOptions, BuildOutput, BuildReport, EligibilityPolicy, GraphBuilder, MalformedPolicy,
    Rejection,
};
pub use error::{BuildError, RecordError, RecordSourceError, SnapshotError};
pub use graph::{Edge, Node, ScholarshipGraph};
pub use query::{CountryCount, GraphStats, QueryEngine, ScholarshipFilter, DEFAULT_TOP_COUNTRIES};
pub use record::{read_records, RawRecord, RecordRow, ScholarshipRecord};
pub use schema::{EntityKind, RelationKind};

/// Get the version of beasiswa-core.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
