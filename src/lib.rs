//! **spatial_graph** turns a labeled voxel mask into a topologically
//! cleaned, geometrically annotated spatial graph: one vertex per branch
//! point or endpoint, one polyline edge per branch between them, ready for
//! morphometric analysis (degree, length, angle) or for labeling a tree's
//! branch generations outward from a root.
//!
//! The pipeline runs, roughly, in the order its modules are listed below:
//! lift a voxel mask into a dense one-vertex-per-voxel graph
//! ([`lift`]), strip 26-connectivity diagonal shortcuts ([`extra_edges`]),
//! collapse degree-2 chains into single edges ([`reduce`]), fold leftover
//! rasterization cliques into single junctions and drop redundant parallel
//! edges ([`merge`]), then measure ([`metrics`]), transform into physical
//! space ([`transform`]), cross-reference against other graphs
//! ([`locator`], [`compare`]), and emit back out as a voxel grid
//! ([`voxelize`]) or a mesh ([`mesh`]).

pub mod compare;
pub mod edge;
pub mod error;
pub mod extra_edges;
pub mod geometry;
pub mod graph;
pub mod image;
pub mod io;
pub mod lift;
pub mod locator;
pub mod merge;
pub mod mesh;
pub mod metrics;
pub mod node;
pub mod reduce;
pub mod transform;
pub mod tree;
pub mod voxelize;

pub use edge::SpatialEdge;
pub use error::{Anomaly, Error, Result};
pub use graph::{EdgeId, Graph, SpatialGraph, VertexId};
pub use node::SpatialNode;
