//! Lifting a foreground voxel set into a [`SpatialGraph`]: one vertex per
//! foreground voxel, one edge per unordered pair of 26-connected foreground
//! voxels. This is the graph's only constructor that doesn't take an
//! existing graph as input — everything downstream (extra-edge removal,
//! reduction, merging) operates on what this stage produces.

use crate::edge::SpatialEdge;
use crate::geometry::Point3;
use crate::graph::{SpatialGraph, VertexId};
use crate::image::ImageDomain;

/// The 26 integer offsets of full-connectivity voxel neighbors, excluding
/// the zero offset.
fn neighbor_offsets() -> impl Iterator<Item = (i64, i64, i64)> {
    (-1..=1).flat_map(|dx| {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| (dx, dy, dz))).filter(move |&(dx, dy, dz)| !(dx == 0 && dy == 0 && dz == 0))
    })
}

/// Lift every foreground voxel of `image` into a graph vertex positioned at
/// the voxel's index-space coordinate, connecting 26-adjacent foreground
/// voxels with an edge. Edges carry no interior polyline points: a lifted
/// graph's edges are direct index-space segments, the raw material the
/// [extra-edge remover][crate::extra_edges] and [chain reducer][crate::reduce]
/// consume.
///
/// Each unordered adjacent pair produces exactly one edge regardless of
/// which voxel is visited first, via [`SpatialGraph::add_edge_unless_exists`].
pub fn lift<I: ImageDomain>(image: &I) -> SpatialGraph {
    lift_verbose(image, false)
}

/// As [`lift`], but also emits `log::debug!` progress tracing when `verbose`
/// is set. Verbosity is an explicit per-call argument rather than an
/// ambient logger switch: nothing about the lift's output depends on
/// whether tracing is on.
pub fn lift_verbose<I: ImageDomain>(image: &I, verbose: bool) -> SpatialGraph {
    let mut graph = SpatialGraph::new();
    let mut index_of = std::collections::HashMap::new();

    for voxel in image.foreground_voxels() {
        let pos = Point3::new(voxel.0 as f64, voxel.1 as f64, voxel.2 as f64);
        let v = graph.add_vertex(crate::node::SpatialNode::new(pos));
        index_of.insert(voxel, v);
    }
    if verbose {
        log::debug!("lift: added {} vertices from foreground voxels", graph.vertex_count());
    }

    for (&voxel, &v) in index_of.iter() {
        for (dx, dy, dz) in neighbor_offsets() {
            let neighbor = (voxel.0 + dx, voxel.1 + dy, voxel.2 + dz);
            if let Some(&nv) = index_of.get(&neighbor) {
                link(&mut graph, v, nv);
            }
        }
    }
    if verbose {
        log::debug!("lift: connected {} edges under 26-connectivity", graph.edge_count());
    }

    graph
}

fn link(graph: &mut SpatialGraph, a: VertexId, b: VertexId) {
    graph.add_edge_unless_exists(a, b, SpatialEdge::empty());
}
