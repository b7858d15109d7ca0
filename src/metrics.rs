//! Per-edge and per-graph descriptive metrics: degree sequences,
//! end-to-end/contour length, and the angles an edge's polyline makes at
//! each of its endpoints with its neighboring edges.

use crate::geometry::{angle, distance};
use crate::graph::{EdgeId, SpatialGraph, VertexId};

/// The degree of every vertex, in vertex-id order.
pub fn degree_sequence(graph: &SpatialGraph) -> Vec<usize> {
    graph.vertex_ids().map(|v| graph.degree(v)).collect()
}

/// Straight-line distance between an edge's two endpoint positions,
/// ignoring its polyline.
pub fn end_to_end_distance(graph: &SpatialGraph, e: EdgeId) -> f64 {
    let (a, b) = graph.endpoints(e).unwrap();
    distance(&graph.vertex_weight(a).unwrap().pos, &graph.vertex_weight(b).unwrap().pos)
}

/// Sum of consecutive distances along the edge's full polyline (endpoints
/// included); always >= [`end_to_end_distance`].
pub fn contour_length(graph: &SpatialGraph, e: EdgeId) -> f64 {
    let (a, b) = graph.endpoints(e).unwrap();
    let pa = graph.vertex_weight(a).unwrap().pos;
    let pb = graph.vertex_weight(b).unwrap().pos;
    graph.edge_weight(e).unwrap().contour_length(&pa, &pb)
}

/// End-to-end distance over every edge satisfying the given filters:
/// `min_edge_points` skips edges whose polyline has fewer interior points
/// (short edges close to a single rasterized voxel are often noise);
/// `ignore_end_nodes`, when non-empty, skips any edge touching one of those
/// vertices (e.g. graph boundary vertices whose true extent is unknown).
pub fn end_to_end_distances<'a>(graph: &'a SpatialGraph, min_edge_points: usize, ignore_end_nodes: &'a [VertexId]) -> impl Iterator<Item = (EdgeId, f64)> + 'a {
    graph.edge_ids().filter(move |&e| passes_filters(graph, e, min_edge_points, ignore_end_nodes)).map(move |e| (e, end_to_end_distance(graph, e)))
}

/// As [`end_to_end_distances`] but reporting contour length.
pub fn contour_lengths<'a>(graph: &'a SpatialGraph, min_edge_points: usize, ignore_end_nodes: &'a [VertexId]) -> impl Iterator<Item = (EdgeId, f64)> + 'a {
    graph.edge_ids().filter(move |&e| passes_filters(graph, e, min_edge_points, ignore_end_nodes)).map(move |e| (e, contour_length(graph, e)))
}

fn passes_filters(graph: &SpatialGraph, e: EdgeId, min_edge_points: usize, ignore_end_nodes: &[VertexId]) -> bool {
    if graph.edge_weight(e).unwrap().edge_points.len() < min_edge_points {
        return false;
    }
    if ignore_end_nodes.is_empty() {
        return true;
    }
    let (a, b) = graph.endpoints(e).unwrap();
    !ignore_end_nodes.contains(&a) && !ignore_end_nodes.contains(&b)
}

/// The angle (radians, in `[0, pi]`) between two edges incident to the same
/// vertex `v`, measured between the direction each edge leaves `v` in
/// (its polyline's near end, or its far endpoint if the polyline is empty).
pub fn edge_angle(graph: &SpatialGraph, v: VertexId, e1: EdgeId, e2: EdgeId) -> f64 {
    let pv = graph.vertex_weight(v).unwrap().pos;
    let dir = |e: EdgeId| -> nalgebra::Vector3<f64> {
        let other = graph.other_endpoint(e, v);
        let p_other = graph.vertex_weight(other).unwrap().pos;
        let near = graph.edge_weight(e).unwrap().first_point_from(&pv, &p_other);
        near - pv
    };
    angle(&dir(e1), &dir(e2))
}

/// All pairwise angles between edges incident to `v`, as `((e1, e2), angle)`
/// for each unordered pair. When `ignore_parallel_edges` is true, pairs
/// that share both endpoints (geometric duplicates of each other from `v`'s
/// perspective) are skipped, since their angle is undefined/degenerate
/// rather than informative.
pub fn incident_edge_angles(graph: &SpatialGraph, v: VertexId, ignore_parallel_edges: bool) -> Vec<((EdgeId, EdgeId), f64)> {
    let incident: Vec<EdgeId> = graph.edges_of(v).collect();
    let mut out = Vec::new();
    for i in 0..incident.len() {
        for j in (i + 1)..incident.len() {
            let (e1, e2) = (incident[i], incident[j]);
            if ignore_parallel_edges && graph.other_endpoint(e1, v) == graph.other_endpoint(e2, v) {
                continue;
            }
            out.push(((e1, e2), edge_angle(graph, v, e1, e2)));
        }
    }
    out
}

/// `cos(angle)` for every pair returned by [`incident_edge_angles`],
/// convenient for callers that want a linear rather than angular measure
/// (e.g. averaging branch collinearity across many junctions).
pub fn incident_edge_cosines(graph: &SpatialGraph, v: VertexId, ignore_parallel_edges: bool) -> Vec<((EdgeId, EdgeId), f64)> {
    incident_edge_angles(graph, v, ignore_parallel_edges)
        .into_iter()
        .map(|(pair, a)| (pair, a.cos()))
        .collect()
}
