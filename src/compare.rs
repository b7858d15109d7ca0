//! Comparing two graphs built over the same physical space via a shared
//! [`MultiGraphPointLocator`], and extending one graph's geometry with
//! branches found in the other but missing from it.

use std::collections::HashSet;

use crate::edge::SpatialEdge;
use crate::graph::{SpatialGraph, VertexId};
use crate::locator::{GraphDescriptor, MultiGraphPointLocator};
use crate::node::SpatialNode;

/// A vertex present in one graph with no corresponding point (within the
/// locator's merging radius) in the other — a branch unique to one
/// reconstruction, named for the common case of comparing two
/// segmentations of the same vascular/neural tree where one sees an extra
/// "peninsula" the other missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peninsula {
    pub graph: usize,
    pub vertex: VertexId,
}

/// Vertices of `graph_index` with no matching point in any other graph
/// tracked by `locator`.
pub fn find_peninsulas(locator: &MultiGraphPointLocator, graph_index: usize) -> Vec<Peninsula> {
    let mut out = Vec::new();
    for id in locator.point_id_map().point_ids() {
        let descriptors = locator.point_id_map().descriptors(id);
        let here: Vec<&GraphDescriptor> = descriptors.iter().filter(|d| d.graph == graph_index).collect();
        if here.is_empty() {
            continue;
        }
        let elsewhere = descriptors.iter().any(|d| d.graph != graph_index);
        if !elsewhere {
            for d in here {
                out.push(Peninsula { graph: graph_index, vertex: d.vertex });
            }
        }
    }
    out
}

/// The result of comparing `a` against `b`: vertices of `a` with no
/// counterpart point in `b`, vertices of `b` with no counterpart in `a`,
/// and edges of `a` whose endpoints both have counterparts in `b` but which
/// aren't themselves connected there.
#[derive(Debug, Clone, Default)]
pub struct GraphDiff {
    pub only_in_a: Vec<VertexId>,
    pub only_in_b: Vec<VertexId>,
    pub disconnected_in_b: Vec<(VertexId, VertexId)>,
}

/// Diff graph `a` (index 0 in `locator`) against graph `b` (index 1),
/// assuming both were inserted into `locator` under those indices.
pub fn diff(locator: &MultiGraphPointLocator, a: &SpatialGraph, b: &SpatialGraph) -> GraphDiff {
    let mut result = GraphDiff::default();
    for p in find_peninsulas(locator, 0) {
        result.only_in_a.push(p.vertex);
    }
    for p in find_peninsulas(locator, 1) {
        result.only_in_b.push(p.vertex);
    }

    for e in a.edge_ids() {
        let (u, v) = a.endpoints(e).unwrap();
        let Some(bu) = corresponding_vertex(locator, 0, u, 1) else { continue };
        let Some(bv) = corresponding_vertex(locator, 0, v, 1) else { continue };
        if b.find_edge(bu, bv).is_none() {
            result.disconnected_in_b.push((bu, bv));
        }
    }
    result
}

fn corresponding_vertex(locator: &MultiGraphPointLocator, from_graph: usize, from_vertex: VertexId, to_graph: usize) -> Option<VertexId> {
    for id in locator.point_id_map().point_ids() {
        let descriptors = locator.point_id_map().descriptors(id);
        if descriptors.iter().any(|d| d.graph == from_graph && d.vertex == from_vertex) {
            return descriptors.iter().find(|d| d.graph == to_graph).map(|d| d.vertex);
        }
    }
    None
}

/// Extend `target` with geometry from `source` by copying in, via a
/// breadth-first walk starting from each of `source`'s peninsula vertices
/// (per [`find_peninsulas`] against `locator`, treated as graph index 1),
/// every vertex and edge reachable before the walk first re-touches a point
/// already known in `target`. This grows `target`'s tree outward using
/// `source`'s extra branch rather than grafting the whole of `source` on.
pub fn extend(locator: &MultiGraphPointLocator, target: &mut SpatialGraph, source: &SpatialGraph, source_graph_index: usize) {
    let peninsulas = find_peninsulas(locator, source_graph_index);
    let mut visited: HashSet<VertexId> = HashSet::new();
    let mut added: std::collections::HashMap<VertexId, VertexId> = std::collections::HashMap::new();

    for p in peninsulas {
        if visited.contains(&p.vertex) {
            continue;
        }
        let mut queue = std::collections::VecDeque::new();
        queue.push_back(p.vertex);
        visited.insert(p.vertex);

        while let Some(v) = queue.pop_front() {
            let v_target = *added.entry(v).or_insert_with(|| target.add_vertex(*source.vertex_weight(v).unwrap()));

            for e in source.edges_of(v) {
                let other = source.other_endpoint(e, v);
                if other == v {
                    continue;
                }
                let already_known = is_known_point(locator, source_graph_index, other);
                let other_target = if let Some(&existing) = added.get(&other) {
                    Some(existing)
                } else if already_known && !visited.contains(&other) {
                    corresponding_vertex(locator, source_graph_index, other, opposite(source_graph_index))
                } else {
                    None
                };

                let other_target = match other_target {
                    Some(t) => t,
                    None => *added.entry(other).or_insert_with(|| target.add_vertex(*source.vertex_weight(other).unwrap())),
                };

                if target.find_edge(v_target, other_target).is_none() {
                    target.add_edge(v_target, other_target, SpatialEdge::new(source.edge_weight(e).unwrap().edge_points.clone()));
                }

                if !visited.contains(&other) && !already_known {
                    visited.insert(other);
                    queue.push_back(other);
                }
            }
        }
    }
}

fn opposite(graph_index: usize) -> usize {
    if graph_index == 0 {
        1
    } else {
        0
    }
}

fn is_known_point(locator: &MultiGraphPointLocator, graph_index: usize, v: VertexId) -> bool {
    locator.point_id_map().point_ids().any(|id| {
        let descriptors = locator.point_id_map().descriptors(id);
        descriptors.iter().any(|d| d.graph == graph_index && d.vertex == v) && descriptors.iter().any(|d| d.graph != graph_index)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;

    fn star(center_id: i64) -> (SpatialGraph, VertexId) {
        let mut g = SpatialGraph::new();
        let c = g.add_vertex(SpatialNode::with_id(center_id, Point3::new(0.0, 0.0, 0.0)));
        (g, c)
    }

    #[test]
    fn vertex_unique_to_one_graph_is_a_peninsula() {
        let (mut a, ca) = star(1);
        let leaf_a = a.add_vertex(SpatialNode::new(Point3::new(1.0, 0.0, 0.0)));
        a.add_edge(ca, leaf_a, SpatialEdge::empty());

        let (b, cb) = star(1);

        let mut loc = MultiGraphPointLocator::new(0.01);
        loc.insert(Point3::new(0.0, 0.0, 0.0), GraphDescriptor { graph: 0, vertex: ca });
        loc.insert(Point3::new(0.0, 0.0, 0.0), GraphDescriptor { graph: 1, vertex: cb });
        loc.insert(Point3::new(1.0, 0.0, 0.0), GraphDescriptor { graph: 0, vertex: leaf_a });

        let peninsulas = find_peninsulas(&loc, 0);
        assert_eq!(peninsulas.len(), 1);
        assert_eq!(peninsulas[0].vertex, leaf_a);
    }
}
