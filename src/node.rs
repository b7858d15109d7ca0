//! [`SpatialNode`], the vertex payload of a [`crate::graph::SpatialGraph`].

use crate::geometry::Point3;

/// A vertex's payload: a user-assigned identifier (defaulting to `0`,
/// independent of the structural [`crate::graph::VertexId`] the graph
/// assigns) and its position.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialNode {
    /// User-assigned id, e.g. a generation label or an id to preserve across
    /// export/import. Not touched by any algorithm in this crate except the
    /// tree-generation labeler, which writes generations into a separate
    /// map rather than this field (callers that want them on the node copy
    /// the map's values in afterwards).
    pub id: i64,
    pub pos: Point3,
}

impl SpatialNode {
    pub fn new(pos: Point3) -> Self {
        SpatialNode { id: 0, pos }
    }

    pub fn with_id(id: i64, pos: Point3) -> Self {
        SpatialNode { id, pos }
    }
}
