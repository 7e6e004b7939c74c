//! Shared application state for the server.

use beasiswa_core::{BuildReport, QueryEngine};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

use crate::config::DaemonConfig;

/// Where the current graph came from.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GraphSource {
    /// Nothing loaded yet; every query is empty.
    Empty,
    /// Built from a record file.
    Records { path: PathBuf, report: BuildReport },
    /// Loaded from a snapshot file.
    Snapshot { path: PathBuf },
}

/// The graph currently served, with provenance.
#[derive(Debug, Clone, Serialize)]
pub struct GraphInfo {
    pub source: GraphSource,
    pub built_at: Option<DateTime<Utc>>,
}

impl GraphInfo {
    pub fn empty() -> Self {
        Self {
            source: GraphSource::Empty,
            built_at: None,
        }
    }
}

/// Engine and provenance, always swapped together.
struct Served {
    engine: Arc<QueryEngine>,
    info: GraphInfo,
}

/// Shared application state.
///
/// The engine and its [`GraphInfo`] sit behind one `RwLock`: handlers clone
/// what they need and drop the lock before querying, and a rebuild swaps in
/// both at once, so a request sees either the old graph or the new one.
#[derive(Clone)]
pub struct AppState {
    served: Arc<RwLock<Served>>,
    /// Serializes rebuilds.
    build_lock: Arc<Mutex<()>>,
    pub config: Arc<DaemonConfig>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: DaemonConfig, engine: QueryEngine, info: GraphInfo) -> Self {
        Self {
            served: Arc::new(RwLock::new(Served {
                engine: Arc::new(engine),
                info,
            })),
            build_lock: Arc::new(Mutex::new(())),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Current engine. Cheap; holds no lock after returning.
    pub async fn engine(&self) -> Arc<QueryEngine> {
        self.served.read().await.engine.clone()
    }

    /// Engine and provenance from the same snapshot of the state.
    pub async fn current(&self) -> (Arc<QueryEngine>, GraphInfo) {
        let served = self.served.read().await;
        (served.engine.clone(), served.info.clone())
    }

    /// Swap in a freshly built engine.
    pub async fn replace(&self, engine: QueryEngine, info: GraphInfo) {
        let mut served = self.served.write().await;
        *served = Served {
            engine: Arc::new(engine),
            info,
        };
    }

    pub(crate) fn build_lock(&self) -> &Mutex<()> {
        &self.build_lock
    }

    pub fn uptime_seconds(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beasiswa_core::{GraphBuilder, ScholarshipRecord};

    fn engine_with(index: u64) -> QueryEngine {
        let record = ScholarshipRecord::new(index, "A", "full", "Undergraduate", "canada", 0.1);
        QueryEngine::from_graph(GraphBuilder::default().build_validated(vec![record]).graph)
    }

    fn records_info(path: &str) -> GraphInfo {
        GraphInfo {
            source: GraphSource::Records {
                path: PathBuf::from(path),
                report: BuildReport::default(),
            },
            built_at: Some(Utc::now()),
        }
    }

    fn source_path(info: &GraphInfo) -> Option<&PathBuf> {
        match &info.source {
            GraphSource::Records { path, .. } => Some(path),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_current_pairs_engine_with_info() {
        let state = AppState::new(DaemonConfig::default(), engine_with(0), GraphInfo::empty());

        let (engine, info) = state.current().await;
        assert_eq!(engine.list_students(), vec!["SISWA_0"]);
        assert!(matches!(info.source, GraphSource::Empty));

        state.replace(engine_with(1), records_info("one.json")).await;
        let (engine, info) = state.current().await;
        assert_eq!(engine.list_students(), vec!["SISWA_1"]);
        assert_eq!(source_path(&info), Some(&PathBuf::from("one.json")));
    }

    #[tokio::test]
    async fn test_current_never_mixes_generations() {
        let state = AppState::new(DaemonConfig::default(), engine_with(0), records_info("0"));

        let writer = {
            let state = state.clone();
            tokio::spawn(async move {
                for i in 1..50u64 {
                    state.replace(engine_with(i), records_info(&i.to_string())).await;
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..200 {
            let (engine, info) = state.current().await;
            let expected = format!("SISWA_{}", source_path(&info).unwrap().display());
            assert_eq!(engine.list_students(), vec![expected]);
            tokio::task::yield_now().await;
        }
        writer.await.unwrap();
    }
}
