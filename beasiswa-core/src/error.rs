//! Error types for beasiswa-core.
//!
//! Query operations never fail; these cover the build, record loading and
//! snapshot boundaries only.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single input record was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// A required field was absent or blank.
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// The sentiment score could not be read as a finite number.
    #[error("Invalid sentiment score: {value:?}")]
    InvalidSentiment {
        /// Raw value as it appeared in the input.
        value: String,
    },

    /// The sentiment score is a number but not within [-1, 1].
    #[error("Sentiment score {value} outside [-1, 1]")]
    SentimentOutOfRange {
        /// Parsed score.
        value: f64,
    },

    /// The row could not be decoded into a record at all.
    #[error("Undecodable row: {message}")]
    Undecodable {
        /// Decoder message.
        message: String,
    },
}

/// Errors that abort a graph build.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A record was rejected while the builder runs with the abort policy.
    #[error("Record {position} rejected: {source}")]
    Malformed {
        /// Zero-based position of the record in the input batch.
        position: usize,
        /// Underlying validation failure.
        #[source]
        source: RecordError,
    },
}

/// Errors reading a batch of records from disk.
#[derive(Error, Debug)]
pub enum RecordSourceError {
    /// The file extension does not name a supported format.
    #[error("Unsupported record format: {path}")]
    UnsupportedFormat {
        /// Offending path.
        path: PathBuf,
    },

    /// IO error reading the record file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The JSON document as a whole could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The CSV header could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors saving or loading a graph snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// IO error reading or writing the snapshot file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot JSON could not be encoded or decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The snapshot was written by an incompatible format version.
    #[error("Unsupported snapshot format version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Version this build understands.
        expected: u32,
    },

    /// An edge refers to a node the snapshot does not contain.
    #[error("Edge {source_key} -[{relation}]-> {target_key} references a missing node")]
    DanglingEdge {
        source_key: String,
        target_key: String,
        relation: String,
    },

    /// An edge points at a node of the wrong kind for its relation.
    #[error("Edge {source_key} -[{relation}]-> {target_key}: expected {expected}, found {found}")]
    KindMismatch {
        source_key: String,
        target_key: String,
        relation: String,
        expected: String,
        found: String,
    },
}

/// Result alias for snapshot operations.
pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;
