//! Collapsing maximal chains of degree-2 vertices into single polyline
//! edges. After [`crate::extra_edges::remove_extra_edges_until_stable`] has
//! run, every vertex of degree other than 2 is a "real" graph vertex
//! (an endpoint, junction, or isolated point); everything of degree 2 is
//! just a point along some edge's path and can be folded into its
//! neighbors' polyline.
//!
//! Mirroring the original `reduce_spatial_graph_via_dfs`/
//! `reduce_dfs_visitor.hpp`, this walks a read-only *input* graph and
//! writes the collapsed result into a fresh *output* graph, rather than
//! mutating the graph being walked: a chain's replacement edge must never
//! itself become a candidate the walk revisits.

use std::collections::HashMap;

use crate::edge::SpatialEdge;
use crate::geometry::{distance, Point3};
use crate::graph::{EdgeId, SpatialGraph, VertexId};

/// Collapse every maximal run of degree-2 vertices into a single edge whose
/// polyline carries the positions of the vertices it absorbed. Degree-0 and
/// degree-1 vertices are carried over untouched (they have no chain to be
/// part of); a vertex of degree other than 2 is never absorbed, only ever
/// an endpoint of a reduced edge.
///
/// A connected component that is a single cycle entirely of degree-2
/// vertices (no junction to serve as a chain endpoint) reduces to one
/// self-loop, split afterwards by [`split_self_loop`] so no edge begins and
/// ends at the same vertex.
pub fn reduce(graph: &mut SpatialGraph) {
    reduce_verbose(graph, false)
}

/// As [`reduce`], but also emits `log::debug!` progress tracing when
/// `verbose` is set — an explicit per-call argument rather than an ambient
/// logger switch, matching [`crate::lift::lift_verbose`].
pub fn reduce_verbose(graph: &mut SpatialGraph, verbose: bool) {
    let input = graph.clone();
    let mut output = SpatialGraph::new();
    let mut id_map: HashMap<VertexId, VertexId> = HashMap::new();
    let mut visited_edge = vec![false; input.edge_count()];

    // Every non-degree-2 vertex of the input survives into the output
    // unconditionally, as either an endpoint of a reduced edge or an
    // isolated point.
    let junctions: Vec<VertexId> = input.vertex_ids().filter(|&v| input.degree(v) != 2).collect();
    for &v in &junctions {
        let nv = output.add_vertex(*input.vertex_weight(v).unwrap());
        id_map.insert(v, nv);
    }

    for v in &junctions {
        for e in input.edges_of(*v).collect::<Vec<_>>() {
            if visited_edge[e.index()] {
                continue;
            }
            collapse_chain(&input, &mut output, &mut id_map, *v, e, &mut visited_edge);
        }
    }

    // Anything left with unvisited incident edges is an isolated cycle of
    // degree-2 vertices with no junction to start from.
    for v in input.vertex_ids() {
        if input.degree(v) != 2 {
            continue;
        }
        let Some(e) = input.edges_of(v).find(|e| !visited_edge[e.index()]) else {
            continue;
        };
        id_map.entry(v).or_insert_with(|| output.add_vertex(*input.vertex_weight(v).unwrap()));
        collapse_chain(&input, &mut output, &mut id_map, v, e, &mut visited_edge);
    }

    if verbose {
        log::debug!(
            "reduce: {} input vertices collapsed into {} output vertices",
            input.vertex_count(),
            output.vertex_count()
        );
    }

    *graph = output;

    let loops = self_loops(graph);
    if verbose && !loops.is_empty() {
        log::debug!("reduce: splitting {} isolated self-loop(s)", loops.len());
    }
    for e in loops {
        split_self_loop(graph, e);
    }
}

/// Walk the chain of degree-2 vertices in `input` starting along
/// `first_edge` from `start`, adding one replacement edge to `output` from
/// `start`'s image to wherever the chain ends (another junction, or back to
/// `start` for an isolated cycle). Every edge walked is marked visited in
/// `input`'s index space so the caller doesn't retrace the same chain from
/// its far end; `id_map` records, for every input vertex that survives into
/// `output`, its image there.
fn collapse_chain(input: &SpatialGraph, output: &mut SpatialGraph, id_map: &mut HashMap<VertexId, VertexId>, start: VertexId, first_edge: EdgeId, visited_edge: &mut [bool]) {
    let mut points = Vec::new();
    let mut prev = start;
    let mut cur_edge = first_edge;
    let mut cur = input.other_endpoint(cur_edge, prev);

    loop {
        visited_edge[cur_edge.index()] = true;
        append_oriented(&mut points, input, prev, cur_edge, cur);

        if input.degree(cur) != 2 || cur == start {
            let start_out = *id_map.get(&start).expect("start vertex must already have an output image");
            let end_out = *id_map.entry(cur).or_insert_with(|| output.add_vertex(*input.vertex_weight(cur).unwrap()));
            output.add_edge(start_out, end_out, SpatialEdge::new(points));
            return;
        }

        points.push(input.vertex_weight(cur).unwrap().pos);

        let next_edge = input
            .edges_of(cur)
            .find(|&e| e != cur_edge)
            .expect("degree-2 vertex must have a second incident edge");
        prev = cur;
        cur_edge = next_edge;
        cur = input.other_endpoint(cur_edge, prev);
    }
}

/// Append `cur_edge`'s polyline to `points`, oriented so it runs from
/// `from`'s side towards `to`'s side.
fn append_oriented(points: &mut Vec<Point3>, graph: &SpatialGraph, from: VertexId, cur_edge: EdgeId, to: VertexId) {
    let edge_points = &graph.edge_weight(cur_edge).unwrap().edge_points;
    let Some(first) = edge_points.first() else { return };
    let pf = graph.vertex_weight(from).unwrap().pos;
    let pt = graph.vertex_weight(to).unwrap().pos;
    if distance(&pf, first) <= distance(&pt, first) {
        points.extend_from_slice(edge_points);
    } else {
        points.extend(edge_points.iter().rev().copied());
    }
}

fn self_loops(graph: &SpatialGraph) -> Vec<EdgeId> {
    graph
        .edge_ids()
        .filter(|&e| {
            let (a, b) = graph.endpoints(e).unwrap();
            a == b
        })
        .collect()
}

/// Split a self-loop edge by inserting a new vertex at the median point of
/// its polyline (or, for an empty polyline, at the loop vertex's own
/// position) and replacing the loop with two parallel edges from the
/// original vertex to the new one. No edge in the reduced graph should
/// begin and end at the same vertex; this is the isolated-cycle case from
/// [`reduce`] resolved into something every downstream stage can treat
/// uniformly as two ordinary edges.
pub fn split_self_loop(graph: &mut SpatialGraph, e: EdgeId) {
    let (v, _) = graph.endpoints(e).unwrap();
    let points = graph.edge_weight(e).unwrap().edge_points.clone();
    graph.remove_edge(e);

    let mid_pos = if points.is_empty() {
        graph.vertex_weight(v).unwrap().pos
    } else {
        points[points.len() / 2]
    };
    let mid = graph.add_vertex(crate::node::SpatialNode::new(mid_pos));

    // The median point becomes `mid` itself, not an edge-point of either
    // half: each half runs from its endpoint up to (but excluding) the
    // midpoint.
    let (first_half, second_half) = if points.is_empty() {
        (&points[..], &points[..])
    } else {
        let split = points.len() / 2;
        (&points[..split], &points[split + 1..])
    };
    graph.add_edge(v, mid, SpatialEdge::new(first_half.to_vec()));
    graph.add_edge(mid, v, SpatialEdge::new(second_half.to_vec()));
}
