//! Flat JSON snapshots of a built graph.
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "built_at": "2025-01-01T00:00:00Z",
//!   "nodes": [{"key": "SISWA_0", "kind": "STUDENT"}],
//!   "edges": [{"source": "SISWA_0", "target": "BEASISWA_x", "relation": "RECOMMENDED_TO"}]
//! }
//! ```
//!
//! Nodes and edges are written in insertion order, so loading a snapshot
//! reproduces the original graph including its tie-break order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{SnapshotError, SnapshotResult};
use crate::graph::{Edge, Node, ScholarshipGraph};

/// Snapshot layout version understood by this build.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    format_version: u32,
    built_at: DateTime<Utc>,
    nodes: &'a [Node],
    edges: &'a [Edge],
}

#[derive(Deserialize)]
struct SnapshotOwned {
    format_version: u32,
    #[serde(default)]
    built_at: Option<DateTime<Utc>>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

/// A graph loaded from a snapshot along with its build timestamp.
#[derive(Debug, Clone)]
pub struct LoadedSnapshot {
    pub graph: ScholarshipGraph,
    pub built_at: Option<DateTime<Utc>>,
}

/// Serialize `graph` to any writer.
pub fn to_writer<W: Write>(graph: &ScholarshipGraph, writer: W) -> SnapshotResult<()> {
    let snapshot = SnapshotRef {
        format_version: FORMAT_VERSION,
        built_at: Utc::now(),
        nodes: graph.nodes(),
        edges: graph.edges(),
    };
    serde_json::to_writer(writer, &snapshot)?;
    Ok(())
}

/// Rebuild a graph from any reader.
pub fn from_reader<R: Read>(reader: R) -> SnapshotResult<LoadedSnapshot> {
    let snapshot: SnapshotOwned = serde_json::from_reader(reader)?;

    if snapshot.format_version != FORMAT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: snapshot.format_version,
            expected: FORMAT_VERSION,
        });
    }

    let mut graph = ScholarshipGraph::new();
    for node in &snapshot.nodes {
        graph.add_node(&node.key, node.kind);
    }
    for edge in &snapshot.edges {
        if !graph.has_node(&edge.source) || !graph.has_node(&edge.target) {
            return Err(SnapshotError::DanglingEdge {
                source_key: edge.source.clone(),
                target_key: edge.target.clone(),
                relation: edge.relation.to_string(),
            });
        }
        let expected = edge.relation.target_kind();
        match graph.kind_of(&edge.target) {
            Some(found) if found != expected => {
                return Err(SnapshotError::KindMismatch {
                    source_key: edge.source.clone(),
                    target_key: edge.target.clone(),
                    relation: edge.relation.to_string(),
                    expected: expected.to_string(),
                    found: found.to_string(),
                });
            }
            _ => {}
        }
        graph.add_edge(&edge.source, &edge.target, edge.relation);
    }

    Ok(LoadedSnapshot {
        graph,
        built_at: snapshot.built_at,
    })
}

/// Write a snapshot to `path`.
///
/// Writes to a sibling temporary file first and renames it into place.
pub fn save(graph: &ScholarshipGraph, path: &Path) -> SnapshotResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let written = write_file(graph, &tmp_path)
        .and_then(|()| fs::rename(&tmp_path, path).map_err(SnapshotError::from));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    info!(
        "Saved snapshot {:?}: {} nodes, {} edges",
        path,
        graph.node_count(),
        graph.edge_count()
    );
    Ok(())
}

fn write_file(graph: &ScholarshipGraph, path: &Path) -> SnapshotResult<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    to_writer(graph, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Load a snapshot from `path`.
pub fn load(path: &Path) -> SnapshotResult<LoadedSnapshot> {
    let loaded = from_reader(BufReader::new(File::open(path)?))?;
    info!(
        "Loaded snapshot {:?}: {} nodes, {} edges",
        path,
        loaded.graph.node_count(),
        loaded.graph.edge_count()
    );
    Ok(loaded)
}
