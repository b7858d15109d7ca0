//! [`SpatialEdge`], the edge payload of a [`crate::graph::SpatialGraph`].

use crate::geometry::{distance, Point3};

/// An edge's payload: the ordered polyline of points strictly between its
/// two endpoints. Direction along the polyline is not semantically
/// meaningful (the graph is undirected); a consumer that cares orients it
/// by comparing each endpoint's distance to `edge_points[0]`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialEdge {
    pub edge_points: Vec<Point3>,
}

impl SpatialEdge {
    pub fn new(edge_points: Vec<Point3>) -> Self {
        SpatialEdge { edge_points }
    }

    pub fn empty() -> Self {
        SpatialEdge::default()
    }

    /// Sum of consecutive Euclidean distances along
    /// `[source, edge_points.., target]`, oriented so the polyline begins at
    /// whichever endpoint is closer to `edge_points[0]`. Equal to the
    /// end-to-end distance when `edge_points` is empty.
    pub fn contour_length(&self, source: &Point3, target: &Point3) -> f64 {
        let (first, last) = self.oriented_endpoints(source, target);
        let mut total = 0.0;
        let mut prev = first;
        for p in &self.edge_points {
            total += distance(&prev, p);
            prev = *p;
        }
        total += distance(&prev, &last);
        total
    }

    /// Returns `(near, far)`: `source`/`target` reordered so that `near` is
    /// whichever one is closer to `edge_points[0]` (ties favor `source`).
    /// With an empty polyline the order is irrelevant and `(source, target)`
    /// is returned unchanged.
    fn oriented_endpoints(&self, source: &Point3, target: &Point3) -> (Point3, Point3) {
        match self.edge_points.first() {
            None => (*source, *target),
            Some(first) => {
                if distance(source, first) <= distance(target, first) {
                    (*source, *target)
                } else {
                    (*target, *source)
                }
            }
        }
    }

    /// The point of this edge's polyline closest to `from` (one of its two
    /// endpoint positions), used by the angle metric to find the direction
    /// an edge leaves a vertex in. Falls back to the *other* endpoint's
    /// position when the polyline is empty.
    pub fn first_point_from(&self, from: &Point3, other_end: &Point3) -> Point3 {
        match self.edge_points.first() {
            None => *other_end,
            Some(first) => {
                if let Some(last) = self.edge_points.last() {
                    if distance(from, last) < distance(from, first) {
                        return *last;
                    }
                }
                *first
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contour_length_of_empty_polyline_is_end_to_end_distance() {
        let s = Point3::new(0.0, 0.0, 0.0);
        let t = Point3::new(3.0, 4.0, 0.0);
        let e = SpatialEdge::empty();
        assert!((e.contour_length(&s, &t) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn contour_length_is_at_least_end_to_end_distance() {
        let s = Point3::new(0.0, 0.0, 0.0);
        let t = Point3::new(2.0, 0.0, 0.0);
        let e = SpatialEdge::new(vec![Point3::new(1.0, 1.0, 0.0)]);
        assert!(e.contour_length(&s, &t) >= distance(&s, &t));
    }
}
