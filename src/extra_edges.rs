//! Removing 26-connectivity "extra edges": a junction voxel with more than
//! two neighbors that are themselves mutually connected carries a redundant
//! diagonal spoke. Run once, right after [`crate::lift::lift`], before the
//! chain reducer: an uncollapsed corner like
//!
//! ```text
//! o                  o
//! |\                 |
//! o-o      ----->    o-o
//! |/                 |
//! o
//! ```
//!
//! has its center kept as the only 3-degree node by cutting the
//! center-to-neighbor spoke that's farther away, leaving the
//! already-connected pair of neighbors linked directly.

use crate::geometry::distance;
use crate::graph::{SpatialGraph, VertexId};

const TIE_EPSILON: f64 = 1e-9;

/// Every pair of `center`'s neighbors that are themselves directly
/// connected, read off the graph as it currently stands.
fn connected_neighbor_pairs(graph: &SpatialGraph, center: VertexId) -> Vec<(VertexId, VertexId)> {
    let mut neighbors: Vec<VertexId> = graph.neighbors(center).filter(|&w| w != center).collect();
    neighbors.sort_by_key(|v| v.index());
    neighbors.dedup();

    let mut pairs = Vec::new();
    for i in 0..neighbors.len() {
        for j in (i + 1)..neighbors.len() {
            if graph.find_edge(neighbors[i], neighbors[j]).is_some() {
                pairs.push((neighbors[i], neighbors[j]));
            }
        }
    }
    pairs
}

/// Remove every extra edge from `graph` in place, returning whether any
/// edge was removed.
///
/// Every junction (degree > 2) is inspected against one consistent snapshot
/// of the graph, and every doomed spoke is collected before any of them are
/// actually removed. For a genuine diagonal corner, the center's spoke to
/// the farther of the two connected neighbors is strictly longer than its
/// spoke to the nearer one, so the choice is unambiguous. When a junction's
/// own geometry makes the two spokes exactly tied (every side of a unit
/// voxel square lifted whole is equidistant from any of its corners), the
/// pair is left untouched rather than cut by an arbitrary rule: removing
/// one of two equally-valid spokes can sever a real cycle instead of a
/// redundant diagonal, and which of the tied pair gets cut would otherwise
/// depend on incidental vertex ids. Collecting against a snapshot rather
/// than mutating mid-walk keeps the result independent of what order the
/// junctions happen to be visited in.
pub fn remove_extra_edges(graph: &mut SpatialGraph) -> bool {
    let junctions: Vec<VertexId> = graph.vertex_ids().filter(|&v| graph.degree(v) > 2).collect();

    let mut doomed_spokes = Vec::new();
    for center in junctions {
        let pc = graph.vertex_weight(center).unwrap().pos;
        for (a, b) in connected_neighbor_pairs(graph, center) {
            let pa = graph.vertex_weight(a).unwrap().pos;
            let pb = graph.vertex_weight(b).unwrap().pos;
            let da = distance(&pc, &pa);
            let db = distance(&pc, &pb);
            if (da - db).abs() < TIE_EPSILON {
                continue;
            }
            let farther = if da > db { a } else { b };
            doomed_spokes.push((center, farther));
        }
    }

    let mut removed_any = false;
    for (center, farther) in doomed_spokes {
        if let Some(e) = graph.find_edge(center, farther) {
            graph.remove_edge(e);
            removed_any = true;
        }
    }
    removed_any
}

/// Run [`remove_extra_edges`] to a fixed point: removing one extra edge can
/// expose another (a vertex that had two redundant diagonals loses its
/// shortest path once the first is cut), so repeat until a pass removes
/// nothing.
pub fn remove_extra_edges_until_stable(graph: &mut SpatialGraph) {
    while remove_extra_edges(graph) {}
}
