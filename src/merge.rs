//! Node merging (collapsing small vertex cliques left over after reduction
//! into a single junction) and parallel-edge analysis/removal.
//!
//! A freshly [reduced][crate::reduce::reduce] graph can still contain
//! small cliques of adjacent degree-3 vertices where the original skeleton
//! was thicker than one voxel at a junction: a "Y" that actually rasterized
//! as a little triangle of three mutually-adjacent degree-3 vertices, or a
//! "X" as four. The mergers below scan the whole graph for such cliques and
//! collapse every one they find into one vertex each, splicing the cut-open
//! incident edges' polylines onto the surviving vertex so no geometry is
//! lost.

use crate::edge::SpatialEdge;
use crate::geometry::Point3;
use crate::graph::{EdgeId, SpatialGraph, VertexId};
use crate::node::SpatialNode;

/// Find and merge every 3-clique of the graph: triples of mutually adjacent
/// vertices, each pair joined by an edge with empty `edge_points`, each
/// vertex of degree exactly 3. A candidate triple is skipped (left
/// unmerged) if it has any parallel edge among its three members beyond the
/// three pairwise edges, since the merge can't decide which parallel
/// edge's geometry the new vertex should carry.
///
/// Returns the number of triples merged. With `in_place` true the surviving
/// vertex reuses one member of each triple (the other two are removed);
/// with `in_place` false the survivor is a new vertex at the triple's
/// centroid and all three original vertices are left behind as isolated
/// degree-0 vertices.
pub fn merge_three_connected_nodes(graph: &mut SpatialGraph, in_place: bool) -> usize {
    let mut count = 0;
    while let Some(triple) = find_clique(graph, 3, 3) {
        merge_clique(graph, &triple, in_place);
        count += 1;
    }
    count
}

/// As [`merge_three_connected_nodes`], for 4-cliques of degree-4 vertices
/// (six pairwise edges).
pub fn merge_four_connected_nodes(graph: &mut SpatialGraph, in_place: bool) -> usize {
    let mut count = 0;
    while let Some(clique) = find_clique(graph, 4, 4) {
        merge_clique(graph, &clique, in_place);
        count += 1;
    }
    count
}

/// Find and merge every pair of degree-3 junctions directly connected by a
/// single edge with empty `edge_points`, combining their remaining 2+2
/// external edges onto the surviving vertex. Returns the number of pairs
/// merged; `in_place` has the same meaning as in
/// [`merge_three_connected_nodes`].
pub fn merge_two_three_connected_nodes(graph: &mut SpatialGraph, in_place: bool) -> usize {
    let mut count = 0;
    while let Some(pair) = find_clique(graph, 2, 3) {
        merge_clique(graph, &pair, in_place);
        count += 1;
    }
    count
}

/// Search for a clique of `size` mutually adjacent vertices, each of degree
/// exactly `expected_degree`, joined pairwise by edges with empty
/// `edge_points`, with no extra parallel edge among its members. Returns
/// the first one found in vertex-id order, or `None` if the graph has none.
fn find_clique(graph: &SpatialGraph, size: usize, expected_degree: usize) -> Option<Vec<VertexId>> {
    for v in graph.vertex_ids() {
        if graph.degree(v) != expected_degree {
            continue;
        }
        let neighbors = direct_neighbors_with_empty_edge(graph, v);
        if let Some(rest) = find_mutual_subset(graph, &neighbors, size - 1, expected_degree) {
            let mut clique = vec![v];
            clique.extend(rest);
            if !clique_has_extra_parallel_edge(graph, &clique) {
                return Some(clique);
            }
        }
    }
    None
}

/// `v`'s neighbors reached by a direct edge with an empty polyline (the
/// "junction voxel" edges a clique can be built from; a neighbor reached
/// only through a polyline with interior points was never an adjacent
/// voxel in the original rasterization).
fn direct_neighbors_with_empty_edge(graph: &SpatialGraph, v: VertexId) -> Vec<VertexId> {
    graph
        .edges_of(v)
        .filter(|&e| graph.edge_weight(e).unwrap().edge_points.is_empty())
        .map(|e| graph.other_endpoint(e, v))
        .collect()
}

/// Within `candidates`, find a subset of `needed` vertices that are pairwise
/// mutually adjacent (direct empty-polyline edge) and each of degree
/// exactly `expected_degree`. Tries subsets in `candidates`' order and
/// returns the first that works.
fn find_mutual_subset(graph: &SpatialGraph, candidates: &[VertexId], needed: usize, expected_degree: usize) -> Option<Vec<VertexId>> {
    if needed == 0 {
        return Some(Vec::new());
    }
    let mut chosen = Vec::new();
    find_mutual_subset_rec(graph, candidates, needed, expected_degree, &mut chosen)
}

fn find_mutual_subset_rec(graph: &SpatialGraph, candidates: &[VertexId], needed: usize, expected_degree: usize, chosen: &mut Vec<VertexId>) -> Option<Vec<VertexId>> {
    if chosen.len() == needed {
        return Some(chosen.clone());
    }
    for (i, &c) in candidates.iter().enumerate() {
        if graph.degree(c) != expected_degree {
            continue;
        }
        if chosen.iter().any(|&x| x == c) {
            continue;
        }
        if !chosen.iter().all(|&x| has_empty_edge_between(graph, x, c)) {
            continue;
        }
        chosen.push(c);
        if let Some(found) = find_mutual_subset_rec(graph, &candidates[i + 1..], needed, expected_degree, chosen) {
            return Some(found);
        }
        chosen.pop();
    }
    None
}

fn has_empty_edge_between(graph: &SpatialGraph, a: VertexId, b: VertexId) -> bool {
    match graph.find_edge(a, b) {
        Some(e) => graph.edge_weight(e).unwrap().edge_points.is_empty(),
        None => false,
    }
}

/// Whether any pair among `vertices` is joined by more than one edge —
/// an extra parallel edge the merge has no principled way to fold in.
fn clique_has_extra_parallel_edge(graph: &SpatialGraph, vertices: &[VertexId]) -> bool {
    for i in 0..vertices.len() {
        for j in (i + 1)..vertices.len() {
            let count = graph.edges_of(vertices[i]).filter(|&e| graph.other_endpoint(e, vertices[i]) == vertices[j]).count();
            if count > 1 {
                return true;
            }
        }
    }
    false
}

/// Merge a clique (vertices pairwise adjacent via the edges being removed)
/// into a single vertex at the centroid. `in_place` selects which surviving
/// vertex carries the merged position: `true` reuses `vertices[0]`'s vertex
/// id (removing the other members); `false` adds a fresh vertex at the
/// centroid and leaves every original member as an isolated degree-0
/// vertex rather than removing it, since the new vertex is additive, not a
/// replacement of any one original. Every edge that had a clique member as
/// an endpoint is rewired to the surviving vertex, keeping its polyline
/// unchanged (the merge only moves where the polyline now terminates, it
/// doesn't resample it).
fn merge_clique(graph: &mut SpatialGraph, vertices: &[VertexId], in_place: bool) -> VertexId {
    assert!(vertices.len() >= 2, "merge_clique: need at least two vertices");
    for i in 0..vertices.len() {
        for j in (i + 1)..vertices.len() {
            if let Some(e) = graph.find_edge(vertices[i], vertices[j]) {
                graph.remove_edge(e);
            }
        }
    }

    let centroid = centroid_of(graph, vertices);
    let survivor = if in_place {
        vertices[0]
    } else {
        graph.add_vertex(SpatialNode::new(centroid))
    };
    graph.vertex_weight_mut(survivor).unwrap().pos = centroid;

    if in_place {
        for &v in &vertices[1..] {
            rewire_incident_edges(graph, v, survivor);
        }
        // Remove highest-index first so swap-remove never invalidates an
        // id still pending removal.
        let mut doomed: Vec<VertexId> = vertices[1..].to_vec();
        doomed.sort_by_key(|id| std::cmp::Reverse(id.index()));
        for v in doomed {
            graph.remove_vertex(v);
        }
    } else {
        for &v in vertices {
            rewire_incident_edges(graph, v, survivor);
        }
    }

    survivor
}

fn centroid_of(graph: &SpatialGraph, vertices: &[VertexId]) -> Point3 {
    let sum = vertices.iter().fold(Point3::origin().coords, |acc, &v| acc + graph.vertex_weight(v).unwrap().pos.coords);
    Point3::from(sum / vertices.len() as f64)
}

/// Move every edge incident to `from` (other than ones already removed as
/// clique-internal) so it's incident to `to` instead, preserving the
/// edge's polyline and its other endpoint untouched.
fn rewire_incident_edges(graph: &mut SpatialGraph, from: VertexId, to: VertexId) {
    let incident: Vec<EdgeId> = graph.edges_of(from).collect();
    for e in incident {
        let other = graph.other_endpoint(e, from);
        let points = graph.edge_weight(e).unwrap().edge_points.clone();
        graph.remove_edge(e);
        if other == from {
            // a self-loop on the merged vertex becomes a self-loop on the survivor
            graph.add_edge(to, to, SpatialEdge::new(points));
        } else {
            graph.add_edge(to, other, SpatialEdge::new(points));
        }
    }
}

/// Two edges are parallel when they share both endpoints (in either
/// order). `get_parallel_edges` groups every edge of `graph` by its
/// unordered endpoint pair and returns only the groups with more than one
/// member — the candidate sets [`remove_parallel_edges`] chooses among.
pub fn get_parallel_edges(graph: &SpatialGraph) -> Vec<Vec<EdgeId>> {
    use std::collections::HashMap;
    let mut groups: HashMap<(VertexId, VertexId), Vec<EdgeId>> = HashMap::new();
    for e in graph.edge_ids() {
        let (a, b) = graph.endpoints(e).unwrap();
        let key = if a <= b { (a, b) } else { (b, a) };
        groups.entry(key).or_default().push(e);
    }
    groups.into_values().filter(|g| g.len() > 1).collect()
}

/// Among a group of parallel edges, those whose polylines are equal as
/// point sets (lexicographically sorted, so direction doesn't matter) --
/// true geometric duplicates rather than merely edges that happen to share
/// endpoints.
pub fn get_equal_parallel_edges(graph: &SpatialGraph, group: &[EdgeId]) -> Vec<(EdgeId, EdgeId)> {
    let mut equal = Vec::new();
    for i in 0..group.len() {
        for j in (i + 1)..group.len() {
            let mut a = graph.edge_weight(group[i]).unwrap().edge_points.clone();
            let mut b = graph.edge_weight(group[j]).unwrap().edge_points.clone();
            crate::geometry::sort_lex(&mut a);
            crate::geometry::sort_lex(&mut b);
            if a.len() == b.len() && a.iter().zip(b.iter()).all(|(p, q)| (p - q).norm() < 1e-9) {
                equal.push((group[i], group[j]));
            }
        }
    }
    equal
}

/// Which member of a parallel-edge group [`remove_parallel_edges`] keeps
/// when they aren't geometric duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallelEdgeKeep {
    /// Keep the edge with the greatest contour length, discarding the rest
    /// (the default: a short parallel edge is usually a rasterization
    /// artifact alongside a longer, more faithful path).
    Longer,
    /// Keep the edge with the least contour length.
    Shorter,
}

/// Reduce every group of parallel edges down to one, per `keep`. Equal
/// parallel edges (per [`get_equal_parallel_edges`]) are always collapsed
/// to a single copy first, regardless of `keep`, since there's no length
/// difference to decide by.
pub fn remove_parallel_edges(graph: &mut SpatialGraph, keep: ParallelEdgeKeep) {
    for group in get_parallel_edges(graph) {
        let group: Vec<EdgeId> = group.into_iter().filter(|e| graph.edge_weight(*e).is_some()).collect();
        if group.len() < 2 {
            continue;
        }
        let (a, b) = graph.endpoints(group[0]).unwrap();
        let pa = graph.vertex_weight(a).unwrap().pos;
        let pb = graph.vertex_weight(b).unwrap().pos;
        let best = group
            .iter()
            .copied()
            .max_by(|&x, &y| {
                let lx = graph.edge_weight(x).unwrap().contour_length(&pa, &pb);
                let ly = graph.edge_weight(y).unwrap().contour_length(&pa, &pb);
                let (lx, ly) = match keep {
                    ParallelEdgeKeep::Longer => (lx, ly),
                    ParallelEdgeKeep::Shorter => (ly, lx),
                };
                lx.partial_cmp(&ly).unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap();
        for e in group {
            if e != best {
                graph.remove_edge(e);
            }
        }
    }
}
