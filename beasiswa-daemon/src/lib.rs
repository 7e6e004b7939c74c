//! Beasiswa daemon library - everything the binary wires together.
//!
//! This library provides:
//! - Configuration loading (`beasiswa.toml`)
//! - Build pipeline (records → graph → snapshot → served engine)
//! - HTTP router over the query engine

pub mod build;
pub mod config;
pub mod server;
