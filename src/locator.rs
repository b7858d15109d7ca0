//! Cross-graph point correspondence: given several graphs built over the
//! same physical space (e.g. per-timepoint or per-channel reconstructions
//! of the same sample), find which vertices across those graphs refer to
//! the same physical point so downstream comparison/extension can treat
//! them as one.
//!
//! Every inserted point is assigned a single global [`PointId`]; points
//! within `merging_radius` of an already-known point are folded onto its
//! existing id rather than minted a new one, with the collision reported
//! as an [`Anomaly::DuplicatedPosition`] rather than silently dropped.

use std::collections::HashMap;

use kdtree::distance::squared_euclidean;
use kdtree::KdTree;

use crate::error::Anomaly;
use crate::geometry::Point3;
use crate::graph::VertexId;

/// Global identifier for a physical point, shared across every graph the
/// locator has seen it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(pub usize);

/// Identifies a vertex within one of several graphs the locator tracks,
/// e.g. `graph: 0` for a baseline reconstruction and `graph: 1` for a
/// follow-up one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphDescriptor {
    pub graph: usize,
    pub vertex: VertexId,
}

/// Maps [`PointId`]s to the set of graph-local vertices known to sit at
/// that physical point.
#[derive(Debug, Clone, Default)]
pub struct PointIdMap {
    by_point: HashMap<PointId, Vec<GraphDescriptor>>,
}

impl PointIdMap {
    pub fn descriptors(&self, id: PointId) -> &[GraphDescriptor] {
        self.by_point.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn point_ids(&self) -> impl Iterator<Item = PointId> + '_ {
        self.by_point.keys().copied()
    }
}

/// A kd-tree-backed index of physical points across multiple graphs, used
/// to answer "which known point is this position", "what's within radius
/// r", and to merge near-duplicate insertions within `merging_radius`.
pub struct MultiGraphPointLocator {
    tree: KdTree<f64, PointId, [f64; 3]>,
    positions: HashMap<PointId, Point3>,
    map: PointIdMap,
    merging_radius: f64,
    next_id: usize,
}

impl MultiGraphPointLocator {
    pub fn new(merging_radius: f64) -> Self {
        MultiGraphPointLocator {
            tree: KdTree::new(3),
            positions: HashMap::new(),
            map: PointIdMap::default(),
            merging_radius,
            next_id: 0,
        }
    }

    /// Insert a vertex at `pos`, folding it onto an existing point id if
    /// one lies within `merging_radius`; otherwise mints a new id. Returns
    /// the id assigned (new or reused) and, when a merge happened, an
    /// [`Anomaly::DuplicatedPosition`] describing the collision.
    pub fn insert(&mut self, pos: Point3, descriptor: GraphDescriptor) -> (PointId, Option<Anomaly>) {
        if let Some((id, anomaly)) = self.find_within(&pos) {
            self.map.by_point.entry(id).or_default().push(descriptor);
            return (id, anomaly);
        }
        let id = PointId(self.next_id);
        self.next_id += 1;
        self.tree.add([pos.x, pos.y, pos.z], id).expect("kd-tree insertion");
        self.positions.insert(id, pos);
        self.map.by_point.entry(id).or_default().push(descriptor);
        (id, None)
    }

    fn find_within(&self, pos: &Point3) -> Option<(PointId, Option<Anomaly>)> {
        if self.tree.size() == 0 {
            return None;
        }
        let nearest = self.tree.nearest(&[pos.x, pos.y, pos.z], 1, &squared_euclidean).ok()?;
        let (sq_dist, &id) = *nearest.first()?;
        if sq_dist.sqrt() <= self.merging_radius {
            let count = self.map.by_point.get(&id).map(|v| v.len()).unwrap_or(0) + 1;
            Some((id, Some(Anomaly::DuplicatedPosition { point_id: id.0, count })))
        } else {
            None
        }
    }

    /// The single closest known point to `pos`, if any point has been
    /// inserted.
    pub fn find_closest(&self, pos: &Point3) -> Option<PointId> {
        let nearest = self.tree.nearest(&[pos.x, pos.y, pos.z], 1, &squared_euclidean).ok()?;
        nearest.first().map(|&(_, &id)| id)
    }

    /// The closest known point to `pos` within `radius`, if any.
    pub fn find_closest_within_radius(&self, pos: &Point3, radius: f64) -> Option<PointId> {
        self.find_closest(pos).filter(|&id| {
            let p = self.positions[&id];
            crate::geometry::distance(&p, pos) <= radius
        })
    }

    /// The `n` closest points' descriptors to `pos`, nearest first.
    pub fn closest_n_descriptors(&self, pos: &Point3, n: usize) -> Vec<GraphDescriptor> {
        let Ok(nearest) = self.tree.nearest(&[pos.x, pos.y, pos.z], n, &squared_euclidean) else {
            return Vec::new();
        };
        nearest.into_iter().flat_map(|(_, &id)| self.map.descriptors(id).to_vec()).collect()
    }

    /// Every known point's descriptors within `radius` of `pos`.
    pub fn closest_descriptors_by_radius(&self, pos: &Point3, radius: f64) -> Vec<GraphDescriptor> {
        let Ok(within) = self.tree.within(&[pos.x, pos.y, pos.z], radius * radius, &squared_euclidean) else {
            return Vec::new();
        };
        within.into_iter().flat_map(|(_, &id)| self.map.descriptors(id).to_vec()).collect()
    }

    pub fn point_id_map(&self) -> &PointIdMap {
        &self.map
    }

    pub fn position_of(&self, id: PointId) -> Option<Point3> {
        self.positions.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_points_get_distinct_ids() {
        let mut loc = MultiGraphPointLocator::new(0.1);
        let (id1, a1) = loc.insert(Point3::new(0.0, 0.0, 0.0), GraphDescriptor { graph: 0, vertex: VertexId::new(0) });
        let (id2, a2) = loc.insert(Point3::new(5.0, 0.0, 0.0), GraphDescriptor { graph: 0, vertex: VertexId::new(1) });
        assert_ne!(id1, id2);
        assert!(a1.is_none());
        assert!(a2.is_none());
    }

    #[test]
    fn near_duplicate_points_merge_onto_one_id() {
        let mut loc = MultiGraphPointLocator::new(0.5);
        let (id1, _) = loc.insert(Point3::new(0.0, 0.0, 0.0), GraphDescriptor { graph: 0, vertex: VertexId::new(0) });
        let (id2, anomaly) = loc.insert(Point3::new(0.1, 0.0, 0.0), GraphDescriptor { graph: 1, vertex: VertexId::new(0) });
        assert_eq!(id1, id2);
        assert!(matches!(anomaly, Some(Anomaly::DuplicatedPosition { .. })));
        assert_eq!(loc.point_id_map().descriptors(id1).len(), 2);
    }

    #[test]
    fn closest_n_descriptors_returns_nearest_first_group() {
        let mut loc = MultiGraphPointLocator::new(0.01);
        loc.insert(Point3::new(0.0, 0.0, 0.0), GraphDescriptor { graph: 0, vertex: VertexId::new(0) });
        loc.insert(Point3::new(10.0, 0.0, 0.0), GraphDescriptor { graph: 0, vertex: VertexId::new(1) });
        let closest = loc.closest_n_descriptors(&Point3::new(0.2, 0.0, 0.0), 1);
        assert_eq!(closest.len(), 1);
        assert_eq!(closest[0].vertex, VertexId::new(0));
    }
}
