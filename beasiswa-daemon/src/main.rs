//! Beasiswa daemon - scholarship recommendation server.
//!
//! A single Rust binary that:
//! - Builds the recommendation graph from a record file, or loads a snapshot
//! - Saves a snapshot after each build when configured
//! - Serves the query engine over HTTP

use anyhow::{Context, Result};
use beasiswa_core::{EligibilityPolicy, MalformedPolicy};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use beasiswa_daemon::build::initial_graph;
use beasiswa_daemon::config::{DaemonConfig, DEFAULT_CONFIG_FILE};
use beasiswa_daemon::server::{create_router, AppState};

/// Scholarship recommendation daemon
#[derive(Parser, Debug)]
#[command(name = "beasiswa-daemon")]
#[command(about = "Scholarship recommendation graph server")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Record file to build the graph from (json, jsonl or csv)
    #[arg(long, env = "BEASISWA_RECORDS")]
    records: Option<PathBuf>,

    /// Snapshot file to save after building, or to load when no records are given
    #[arg(long, env = "BEASISWA_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// HTTP port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Only recommend scholarships to records flagged as eligible
    #[arg(long)]
    gate_on_eligibility: bool,

    /// Abort the build on the first malformed record instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Build and save the snapshot, then exit without serving
    #[arg(long)]
    no_serve: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Command-line flags override file configuration.
    fn apply(&self, config: &mut DaemonConfig) {
        if let Some(records) = &self.records {
            config.build.records = Some(records.clone());
        }
        if let Some(snapshot) = &self.snapshot {
            config.build.snapshot = Some(snapshot.clone());
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.gate_on_eligibility {
            config.build.eligibility = EligibilityPolicy::GateOnFlag;
        }
        if self.strict {
            config.build.on_malformed = MalformedPolicy::Abort;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let mut config = DaemonConfig::load(&cli.config);
    cli.apply(&mut config);

    info!(
        "Eligibility policy: {:?}, malformed records: {:?}",
        config.build.eligibility, config.build.on_malformed
    );

    let startup_config = config.clone();
    let (engine, graph_info) = tokio::task::spawn_blocking(move || initial_graph(&startup_config))
        .await
        .context("Startup build task panicked")??;
    info!(
        "Graph ready: {} nodes, {} edges",
        engine.graph().node_count(),
        engine.graph().edge_count()
    );

    if cli.no_serve {
        return Ok(());
    }

    let addr = config.listen_addr();
    let state = AppState::new(config, engine, graph_info);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("beasiswa daemon listening on http://{}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}
