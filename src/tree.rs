//! Assigning a tree "generation" (branch order from a root) to every vertex
//! of a graph via breadth-first traversal, following the originating
//! analysis' radius-driven rule: a child's generation increases by one past
//! its parent's when either its own radius (read from a distance-map image)
//! drops enough, or it's a short, radius-flat degree-1 tip; a genuinely
//! collinear continuation is kept at the parent's generation regardless,
//! and a second pass forces an increase onto whichever of several
//! same-generation siblings turns away from the branch most sharply.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::Anomaly;
use crate::geometry::{distance, Point3};
use crate::graph::{EdgeId, SpatialGraph, VertexId};
use crate::image::ScalarField;

/// Tunables for [`label_generations`]. The defaults reproduce the
/// originating analysis' thresholds and should only be overridden
/// deliberately.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    /// A branch whose radius shrinks by at least this fraction of its
    /// parent's local radius gets its generation increased.
    pub decrease_radius_ratio: f64,
    /// Below this angle (degrees) from the edge nearest the root, a child
    /// keeps the parent's generation instead of incrementing, overriding
    /// whatever the radius tests decided.
    pub keep_generation_if_angle_less_than: f64,
    /// In the forced-increase sibling pass, above this angle (degrees)
    /// from the edge nearest the root, a sibling tied at the lowest shared
    /// generation gets bumped.
    pub increase_generation_if_angle_greater_than: f64,
    /// How many of an edge's polyline points (from its near end) to use
    /// when estimating the direction it leaves a vertex in.
    pub num_of_edge_points_to_compute_angle: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        GenerationParams {
            decrease_radius_ratio: 0.1,
            keep_generation_if_angle_less_than: 10.0,
            increase_generation_if_angle_greater_than: 40.0,
            num_of_edge_points_to_compute_angle: 5,
        }
    }
}

/// A short degree-1 branch whose radius doesn't decrease away from its
/// parent as expected — flagged, not excluded, from the labeling.
pub type VertexAnomalies = HashMap<VertexId, Anomaly>;

const MIN_EDGE_POINTS_FOR_RADIUS_TEST: usize = 5;
const EDGE_RADIUS_DIFFERENCE_RATIO: f64 = 2.0;
const MAX_EDGE_POINTS_FOR_SHORT_BRANCH: usize = 20;

/// BFS-label every vertex reachable from `root` with a generation number,
/// starting at generation 1 (or an override from `fixed`). `fixed` lets a
/// caller pin specific vertices (e.g. known truncation points) to an exact
/// generation regardless of what the radius/angle rules would otherwise
/// assign; those values are used as-is and also propagated to their
/// children as the new baseline.
///
/// `distance_map` supplies the local radius at any index-space position,
/// sampled at the nearest voxel; a position outside its domain reads as
/// radius 0.
///
/// Returns the generation of every visited vertex plus any anomalies
/// detected along the way. Vertices unreachable from `root` are absent from
/// the result.
pub fn label_generations(
    graph: &SpatialGraph,
    root: VertexId,
    fixed: &HashMap<VertexId, i64>,
    distance_map: &dyn ScalarField,
    params: &GenerationParams,
) -> (HashMap<VertexId, i64>, VertexAnomalies) {
    let mut generation: HashMap<VertexId, i64> = HashMap::new();
    let mut distance_from_root: HashMap<VertexId, usize> = HashMap::new();
    let mut already_increased: HashSet<VertexId> = HashSet::new();
    let mut anomalies = VertexAnomalies::new();
    let mut visited = HashSet::new();

    let root_gen = fixed.get(&root).copied().unwrap_or(1);
    generation.insert(root, root_gen);
    distance_from_root.insert(root, 0);
    visited.insert(root);

    let mut queue: VecDeque<VertexId> = VecDeque::new();
    queue.push_back(root);

    while let Some(source) = queue.pop_front() {
        for e in graph.edges_of(source).collect::<Vec<_>>() {
            let target = graph.other_endpoint(e, source);
            if target == source || visited.contains(&target) {
                continue;
            }
            visited.insert(target);

            let source_distance = distance_from_root[&source];
            distance_from_root.insert(target, source_distance + 1);

            if let Some(&forced) = fixed.get(&target) {
                generation.insert(target, forced);
                already_increased.insert(target);
                queue.push_back(target);
                continue;
            }

            let (target_generation, increased) =
                tree_edge_generation(graph, distance_map, params, source, e, target, &generation, &distance_from_root, &mut anomalies);
            generation.insert(target, target_generation);
            if increased {
                already_increased.insert(target);
            }

            force_increase_by_angle(graph, params, source, e, target, &mut generation, &distance_from_root, &mut already_increased);

            queue.push_back(target);
        }
    }

    (generation, anomalies)
}

/// The generation and radius-driven "was bumped" decision for a freshly
/// discovered `target`, per the originating visitor's `tree_edge` step.
#[allow(clippy::too_many_arguments)]
fn tree_edge_generation(
    graph: &SpatialGraph,
    distance_map: &dyn ScalarField,
    params: &GenerationParams,
    source: VertexId,
    edge: EdgeId,
    target: VertexId,
    generation: &HashMap<VertexId, i64>,
    distance_from_root: &HashMap<VertexId, usize>,
    anomalies: &mut VertexAnomalies,
) -> (i64, bool) {
    let source_radius = radius_at(distance_map, graph.vertex_weight(source).unwrap().pos);
    let target_radius = radius_at(distance_map, graph.vertex_weight(target).unwrap().pos);
    let radius_ratio = target_radius / source_radius;
    let decrease_ratio = 1.0 - radius_ratio;

    let edge_points_len = graph.edge_weight(edge).unwrap().edge_points.len();
    let target_is_end_point = graph.degree(target) == 1;
    if decrease_ratio <= params.decrease_radius_ratio && edge_points_len < MAX_EDGE_POINTS_FOR_SHORT_BRANCH && target_is_end_point {
        anomalies.insert(target, Anomaly::NonDecreasingBranch { vertex: target, radius_ratio });
    }

    let increase_because_nodes = decrease_ratio >= params.decrease_radius_ratio;
    let increase_because_edge = radius_along_edge(graph, distance_map, edge, source_radius, target_radius);
    // Be more willing to bump a branch that dead-ends: a degree-1 target
    // increases unless its radius actually grew past its parent's.
    let increase_because_end_point = target_is_end_point && decrease_ratio >= 0.0;

    let siblings = sibling_edges(graph, source, edge, target);
    let mut candidates = siblings;
    candidates.push(edge);
    let angle_vs_root_side = root_side_edge(&candidates, graph, source, distance_from_root).and_then(|root_side| {
        if root_side == edge {
            None
        } else {
            Some(turn_angle_degrees(graph, source, root_side, edge, params.num_of_edge_points_to_compute_angle))
        }
    });
    let small_angle = angle_vs_root_side.map(|a| a.abs() < params.keep_generation_if_angle_less_than).unwrap_or(false);

    let do_not_increase = increase_because_edge == Some(false) && small_angle;
    let keep_same_generation = if do_not_increase { true } else { !(increase_because_nodes || increase_because_end_point) };

    let source_generation = generation[&source];
    let mut target_generation = if keep_same_generation { source_generation } else { source_generation + 1 };
    if small_angle && !keep_same_generation {
        // The angle rule overrides a radius-driven bump: a collinear
        // continuation isn't a fresh branch even if its radius test said so.
        target_generation -= 1;
    }

    (target_generation, !keep_same_generation)
}

/// Every pair of `source`'s edges that are, each, either `source`'s link
/// back up the tree or a genuine sibling branch of `edge` — i.e. every
/// out-edge of `source` except `edge` itself and any whose target is
/// already directly connected to `target` (a parallel/cycle edge that
/// shouldn't be compared against as if it were a distinct branch).
fn sibling_edges(graph: &SpatialGraph, source: VertexId, edge: EdgeId, target: VertexId) -> Vec<EdgeId> {
    graph
        .edges_of(source)
        .filter(|&e| e != edge)
        .filter(|&e| {
            let other_target = graph.other_endpoint(e, source);
            graph.find_edge(target, other_target).is_none()
        })
        .collect()
}

/// Among `candidates` (all out-edges of `source` under consideration),
/// the one whose far endpoint has the strictly smallest `distance_from_root`
/// — the edge that leads back towards the root. `None` if no edge is
/// present, or two or more are tied for smallest (an ambiguous diamond
/// the angle analysis can't make sense of).
fn root_side_edge(candidates: &[EdgeId], graph: &SpatialGraph, source: VertexId, distance_from_root: &HashMap<VertexId, usize>) -> Option<EdgeId> {
    let mut best: Option<(usize, EdgeId)> = None;
    let mut tied = false;
    for &e in candidates {
        let t = graph.other_endpoint(e, source);
        let d = distance_from_root.get(&t).copied().unwrap_or(usize::MAX);
        match best {
            None => best = Some((d, e)),
            Some((bd, _)) if d < bd => {
                best = Some((d, e));
                tied = false;
            }
            Some((bd, _)) if d == bd => tied = true,
            _ => {}
        }
    }
    if tied {
        None
    } else {
        best.map(|(_, e)| e)
    }
}

/// The second, separate pass run after every tree edge: if `edge`'s
/// siblings (plus `edge` itself) settle into a tie at the lowest generation
/// shared by more than one of them, whichever of those tied branches turns
/// away most sharply from the root-side edge gets its generation bumped —
/// unless it was already bumped by [`tree_edge_generation`]'s own radius
/// rule. A vertex with only one branch, or whose siblings haven't all been
/// visited yet, is left alone.
#[allow(clippy::too_many_arguments)]
fn force_increase_by_angle(
    graph: &SpatialGraph,
    params: &GenerationParams,
    source: VertexId,
    edge: EdgeId,
    target: VertexId,
    generation: &mut HashMap<VertexId, i64>,
    distance_from_root: &HashMap<VertexId, usize>,
    already_increased: &mut HashSet<VertexId>,
) {
    let siblings = sibling_edges(graph, source, edge, target);
    if siblings.is_empty() {
        return;
    }
    let all_populated = siblings.iter().all(|&e| {
        let t = graph.other_endpoint(e, source);
        generation.contains_key(&t) && distance_from_root.contains_key(&t)
    });
    if !all_populated {
        return;
    }

    let mut all_out_edges = siblings;
    all_out_edges.push(edge);
    let Some(root_side) = root_side_edge(&all_out_edges, graph, source, distance_from_root) else {
        return;
    };
    if root_side == edge {
        return;
    }

    let grouping_candidates: Vec<EdgeId> = all_out_edges.into_iter().filter(|&e| e != root_side).collect();
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for &e in &grouping_candidates {
        let t = graph.other_endpoint(e, source);
        *counts.entry(generation[&t]).or_insert(0) += 1;
    }
    let Some(lowest_shared) = counts.iter().filter(|&(_, &count)| count > 1).map(|(&gen, _)| gen).min() else {
        return;
    };
    let tied: Vec<EdgeId> = grouping_candidates.into_iter().filter(|&e| generation[&graph.other_endpoint(e, source)] == lowest_shared).collect();
    if tied.len() < 2 {
        return;
    }

    for sib in tied {
        let sib_target = graph.other_endpoint(sib, source);
        let angle = turn_angle_degrees(graph, source, root_side, sib, params.num_of_edge_points_to_compute_angle);
        if angle > params.increase_generation_if_angle_greater_than && !already_increased.contains(&sib_target) {
            *generation.get_mut(&sib_target).unwrap() += 1;
            already_increased.insert(sib_target);
        }
    }
}

/// The local radius at `pos`, sampled from `distance_map` at the nearest
/// voxel. Out-of-domain positions read as radius 0.
fn radius_at(distance_map: &dyn ScalarField, pos: Point3) -> f64 {
    let voxel = (pos.x.round() as i64, pos.y.round() as i64, pos.z.round() as i64);
    distance_map.sample(voxel).unwrap_or(0.0)
}

/// Whether `edge`'s own radius profile looks like a fresh, narrower branch
/// rather than a continuation of its parent's taper: `true`/`false` when
/// there are enough polyline points to sample a midpoint radius and compare
/// it against both ends, `None` (indeterminate) otherwise.
fn radius_along_edge(graph: &SpatialGraph, distance_map: &dyn ScalarField, edge: EdgeId, source_radius: f64, target_radius: f64) -> Option<bool> {
    let edge_points = &graph.edge_weight(edge).unwrap().edge_points;
    if edge_points.len() < MIN_EDGE_POINTS_FOR_RADIUS_TEST {
        return None;
    }
    let mid_radius = radius_at(distance_map, edge_points[edge_points.len() / 2]);
    let target_mid_diff = (target_radius - mid_radius).abs();
    let source_mid_diff = (source_radius - mid_radius).abs();
    let (lo, hi) = if target_mid_diff < source_mid_diff { (target_mid_diff, source_mid_diff) } else { (source_mid_diff, target_mid_diff) };
    Some(hi / lo > EDGE_RADIUS_DIFFERENCE_RATIO)
}

/// The angle (degrees) between the direction `parent_edge` arrives at `v`
/// from and the direction `child_edge` leaves `v` in, i.e. how sharply the
/// path turns at `v`. Both directions are estimated from up to
/// `num_points` of each edge's polyline nearest `v`, falling back to the
/// straight line to the far endpoint when the polyline is empty.
fn turn_angle_degrees(graph: &SpatialGraph, v: VertexId, parent_edge: EdgeId, child_edge: EdgeId, num_points: usize) -> f64 {
    let incoming_dir = direction_near(graph, parent_edge, v, num_points) * -1.0;
    let outgoing_dir = direction_near(graph, child_edge, v, num_points);
    crate::geometry::angle(&incoming_dir, &outgoing_dir).to_degrees()
}

/// An approximate direction the polyline of `e` runs, near endpoint `v`,
/// pointing away from `v`, averaged over up to `num_points` of the nearest
/// polyline samples (or the straight segment to the far endpoint if none).
fn direction_near(graph: &SpatialGraph, e: EdgeId, v: VertexId, num_points: usize) -> nalgebra::Vector3<f64> {
    let other = graph.other_endpoint(e, v);
    let v_pos = graph.vertex_weight(v).unwrap().pos;
    let other_pos = graph.vertex_weight(other).unwrap().pos;
    let edge_points = &graph.edge_weight(e).unwrap().edge_points;

    if edge_points.is_empty() {
        return other_pos - v_pos;
    }

    let near_first = distance(&v_pos, &edge_points[0]) <= distance(&other_pos, &edge_points[0]);
    let ordered: Vec<Point3> = if near_first { edge_points.clone() } else { edge_points.iter().rev().copied().collect() };

    let take = num_points.min(ordered.len()).max(1);
    let far = ordered[take - 1];
    far - v_pos
}
