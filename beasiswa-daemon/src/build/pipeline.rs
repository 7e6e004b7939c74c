//! Build pipeline implementation.

use anyhow::{anyhow, Context, Result};
use beasiswa_core::{
    read_records, snapshot, BuildOptions, BuildReport, GraphBuilder, QueryEngine,
};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::config::DaemonConfig;
use crate::server::state::{GraphInfo, GraphSource};
use crate::server::AppState;

/// Result of a build operation.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub node_count: usize,
    pub edge_count: usize,
    pub report: BuildReport,
    pub snapshot: Option<PathBuf>,
    pub duration: Duration,
}

/// Read records, build the graph and optionally save a snapshot.
///
/// Blocking; callers on the async runtime go through [`BuildPipeline`].
pub fn build_from_file(
    records: &Path,
    options: BuildOptions,
    snapshot_path: Option<&Path>,
) -> Result<(QueryEngine, BuildResult)> {
    let start = Instant::now();
    info!("Building graph from {:?}", records);

    let rows = read_records(records)
        .with_context(|| format!("Failed to read records from {}", records.display()))?;
    info!("Read {} records", rows.len());

    let output = GraphBuilder::new(options)
        .build_rows(rows)
        .context("Graph build aborted")?;

    if let Some(path) = snapshot_path {
        snapshot::save(&output.graph, path)
            .with_context(|| format!("Failed to save snapshot to {}", path.display()))?;
    }

    let result = BuildResult {
        node_count: output.graph.node_count(),
        edge_count: output.graph.edge_count(),
        report: output.report,
        snapshot: snapshot_path.map(Path::to_path_buf),
        duration: start.elapsed(),
    };

    Ok((QueryEngine::from_graph(output.graph), result))
}

/// Decide the startup graph: records if configured, else snapshot if present,
/// else an empty graph.
pub fn initial_graph(config: &DaemonConfig) -> Result<(QueryEngine, GraphInfo)> {
    let build = &config.build;

    if let Some(records) = &build.records {
        let (engine, result) =
            build_from_file(records, build.options(), build.snapshot.as_deref())?;
        let info = GraphInfo {
            source: GraphSource::Records {
                path: records.clone(),
                report: result.report,
            },
            built_at: Some(Utc::now()),
        };
        return Ok((engine, info));
    }

    if let Some(path) = &build.snapshot {
        if path.exists() {
            let loaded = snapshot::load(path)
                .with_context(|| format!("Failed to load snapshot {}", path.display()))?;
            let info = GraphInfo {
                source: GraphSource::Snapshot { path: path.clone() },
                built_at: loaded.built_at,
            };
            return Ok((QueryEngine::from_graph(loaded.graph), info));
        }
        warn!("Snapshot {:?} not found", path);
    }

    warn!("No records or snapshot configured; serving an empty graph");
    Ok((QueryEngine::default(), GraphInfo::empty()))
}

/// Pipeline for rebuilding the served graph.
#[derive(Clone)]
pub struct BuildPipeline {
    state: AppState,
}

impl BuildPipeline {
    /// Create a new build pipeline.
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Rebuild from the configured record file and swap the new graph in
    /// once it is complete.
    pub async fn rebuild(&self) -> Result<BuildResult> {
        let _guard = self.state.build_lock().lock().await;

        let config = &self.state.config.build;
        let records = config
            .records
            .clone()
            .ok_or_else(|| anyhow!("No records file configured"))?;
        let options = config.options();
        let snapshot_path = config.snapshot.clone();

        let path = records.clone();
        let (engine, result) = tokio::task::spawn_blocking(move || {
            build_from_file(&path, options, snapshot_path.as_deref())
        })
        .await
        .context("Build task panicked")??;

        let info = GraphInfo {
            source: GraphSource::Records {
                path: records,
                report: result.report.clone(),
            },
            built_at: Some(Utc::now()),
        };
        self.state.replace(engine, info).await;

        info!(
            "Rebuild complete: {} nodes, {} edges in {:?}",
            result.node_count, result.edge_count, result.duration
        );
        Ok(result)
    }
}
