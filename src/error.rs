//! Domain error type shared by every stage of the pipeline.
//!
//! Each stage validates its own preconditions on entry and surfaces a
//! [`Error`] up to the caller rather than panicking. Numeric degeneracies
//! (zero-length edge segments, empty polylines where an angle is wanted)
//! are not represented here: they are skipped and logged at the call site,
//! per the propagation policy in the specification.

use std::path::PathBuf;

use thiserror::Error;

use crate::graph::{EdgeId, VertexId};

/// Errors produced by the spatial-graph pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// A precondition of the called stage was violated, e.g. merging a
    /// graph that still has degree-2 vertices, or a mismatch between a
    /// graph's coordinate domain and a reference image.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A serialized or tabular input was structurally malformed.
    #[error("malformed data in {path}: {reason}")]
    MalformedData { path: PathBuf, reason: String },

    /// A user-supplied identifier (e.g. in a fixed-generation map) does not
    /// exist in the graph it is applied to.
    #[error("vertex {0:?} not found in graph")]
    VertexNotFound(VertexId),

    /// As above, for edges.
    #[error("edge {0:?} not found in graph")]
    EdgeNotFound(EdgeId),

    /// Wraps an I/O failure from a collaborator (file system, CSV reader).
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Wraps a CSV parsing failure.
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// A non-fatal diagnostic produced by a stage that continues processing
/// regardless. Unlike [`Error`], these are returned as ordinary data
/// (typically `Vec<Anomaly>`) alongside a stage's normal output, per the
/// specification's "reported, not fatal" error category.
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    /// Two or more points at (near-)identical positions were found where
    /// the algorithm expects uniqueness, e.g. duplicate insertions into a
    /// single graph's slot of the point locator.
    DuplicatedPosition { point_id: usize, count: usize },
    /// A short degree-1 branch whose radius did not decrease away from its
    /// parent, flagged by the tree-generation labeler as likely noise.
    NonDecreasingBranch { vertex: VertexId, radius_ratio: f64 },
}
