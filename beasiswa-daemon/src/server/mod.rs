//! HTTP server for the beasiswa daemon.
//!
//! Provides REST API for:
//! - Status and health checks
//! - Student recommendations and scholarship descriptions
//! - Attribute filtering and country rankings
//! - Rebuild and snapshot export

mod http;
pub mod state;

pub use http::{create_router, ApiResponse};
pub use state::{AppState, GraphInfo, GraphSource};
