//! Build pipeline for constructing the recommendation graph.
//!
//! Orchestrates:
//! 1. Reading the record file (json, jsonl or csv)
//! 2. Building the graph (beasiswa-core builder)
//! 3. Saving the snapshot, when configured
//! 4. Swapping the new graph into the server state

mod pipeline;

pub use pipeline::{build_from_file, initial_graph, BuildPipeline, BuildResult};
