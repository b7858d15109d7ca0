//! The affine map between a graph's index space (voxel coordinates, as
//! produced by [`crate::lift::lift`]) and physical space (the coordinate
//! system of the originating image, accounting for its origin, voxel
//! spacing, and axis directions).
//!
//! `physical = origin + direction * (spacing ⊙ index)`

use nalgebra::{Matrix3, Vector3};

use crate::geometry::Point3;
use crate::graph::SpatialGraph;

/// An affine index-to-physical transform, matching the convention used by
/// image formats that carry an origin, per-axis spacing, and a direction
/// cosine matrix (identity for an axis-aligned image).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexToPhysicalTransform {
    pub origin: Point3,
    pub spacing: Vector3<f64>,
    pub direction: Matrix3<f64>,
}

impl IndexToPhysicalTransform {
    /// The identity transform: physical space equals index space.
    pub fn identity() -> Self {
        IndexToPhysicalTransform {
            origin: Point3::origin(),
            spacing: Vector3::new(1.0, 1.0, 1.0),
            direction: Matrix3::identity(),
        }
    }

    pub fn new(origin: Point3, spacing: Vector3<f64>, direction: Matrix3<f64>) -> Self {
        IndexToPhysicalTransform { origin, spacing, direction }
    }

    /// Map an index-space point into physical space.
    pub fn to_physical(&self, index: &Point3) -> Point3 {
        let scaled = Vector3::new(index.x * self.spacing.x, index.y * self.spacing.y, index.z * self.spacing.z);
        self.origin + self.direction * scaled
    }

    /// Map a physical-space point back into index space. Exact inverse of
    /// [`to_physical`][Self::to_physical] for an orthonormal `direction`
    /// (true of every axis-aligned or rotated-but-not-sheared image), since
    /// then `direction.transpose() == direction.try_inverse()`.
    pub fn to_index(&self, physical: &Point3) -> Point3 {
        let delta = physical - self.origin;
        let unrotated = self.direction.transpose() * delta;
        Point3::new(unrotated.x / self.spacing.x, unrotated.y / self.spacing.y, unrotated.z / self.spacing.z)
    }
}

/// Apply `transform` to every vertex position and every edge polyline point
/// of `graph`, in place, mapping the whole graph from index space into
/// physical space. Run [`IndexToPhysicalTransform::to_index`] over the same
/// graph to invert it.
pub fn apply_to_graph(graph: &mut SpatialGraph, transform: &IndexToPhysicalTransform, to_physical: bool) {
    let map = |p: &Point3| -> Point3 {
        if to_physical {
            transform.to_physical(p)
        } else {
            transform.to_index(p)
        }
    };

    for v in graph.vertex_ids() {
        let new_pos = map(&graph.vertex_weight(v).unwrap().pos);
        graph.vertex_weight_mut(v).unwrap().pos = new_pos;
    }
    for e in graph.edge_ids() {
        let new_points: Vec<Point3> = graph.edge_weight(e).unwrap().edge_points.iter().map(map).collect();
        graph.edge_weight_mut(e).unwrap().edge_points = new_points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::SpatialEdge;
    use crate::node::SpatialNode;

    #[test]
    fn identity_transform_is_a_no_op() {
        let t = IndexToPhysicalTransform::identity();
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(t.to_physical(&p), p);
        assert_eq!(t.to_index(&p), p);
    }

    #[test]
    fn to_index_inverts_to_physical() {
        let t = IndexToPhysicalTransform::new(Point3::new(10.0, -5.0, 0.0), Vector3::new(0.5, 0.5, 2.0), Matrix3::identity());
        let index = Point3::new(4.0, 6.0, 1.0);
        let physical = t.to_physical(&index);
        let back = t.to_index(&physical);
        assert!((back - index).norm() < 1e-9);
    }

    #[test]
    fn apply_to_graph_moves_vertices_and_edge_points() {
        let mut g = SpatialGraph::new();
        let a = g.add_vertex(SpatialNode::new(Point3::new(0.0, 0.0, 0.0)));
        let b = g.add_vertex(SpatialNode::new(Point3::new(1.0, 0.0, 0.0)));
        g.add_edge(a, b, SpatialEdge::new(vec![Point3::new(0.5, 0.0, 0.0)]));

        let t = IndexToPhysicalTransform::new(Point3::new(100.0, 0.0, 0.0), Vector3::new(2.0, 2.0, 2.0), Matrix3::identity());
        apply_to_graph(&mut g, &t, true);

        assert_eq!(g.vertex_weight(a).unwrap().pos, Point3::new(100.0, 0.0, 0.0));
        assert_eq!(g.vertex_weight(b).unwrap().pos, Point3::new(102.0, 0.0, 0.0));
        let e = g.find_edge(a, b).unwrap();
        assert_eq!(g.edge_weight(e).unwrap().edge_points[0], Point3::new(101.0, 0.0, 0.0));
    }
}
