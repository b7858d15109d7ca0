//! Rasterizing a labeled graph back onto a reference image's voxel grid:
//! the inverse of [`crate::lift::lift`], used to produce a label image for
//! visualization or for feeding back into a voxel-based pipeline stage.

use std::collections::HashMap;

use crate::graph::{EdgeId, SpatialGraph, VertexId};
use crate::image::{LabelGrid, Voxel};

/// Paint every vertex and every edge polyline point of `graph` onto `grid`,
/// rounding each position to the nearest voxel index. `vertex_label` and
/// `edge_label` assign the label written for a given vertex/edge; a
/// position that rounds outside `grid`'s dimensions is skipped rather than
/// panicking, since a graph transformed into physical space may legitimately
/// extend past its originating image's bounds (e.g. after [`crate::compare::extend`]
/// has grafted in geometry from another graph).
pub fn voxelize<G: LabelGrid>(graph: &SpatialGraph, grid: &mut G, vertex_label: impl Fn(VertexId) -> i64, edge_label: impl Fn(EdgeId) -> i64) {
    let (nx, ny, nz) = grid.dimensions();
    let in_bounds = |v: Voxel| v.0 >= 0 && v.1 >= 0 && v.2 >= 0 && (v.0 as usize) < nx && (v.1 as usize) < ny && (v.2 as usize) < nz;

    for v in graph.vertex_ids() {
        let pos = graph.vertex_weight(v).unwrap().pos;
        let voxel = round_to_voxel(&pos);
        let label = vertex_label(v);
        warn_on_background_label(label);
        if in_bounds(voxel) {
            grid.set_label(voxel, label);
        }
    }

    for e in graph.edge_ids() {
        let label = edge_label(e);
        warn_on_background_label(label);
        for p in &graph.edge_weight(e).unwrap().edge_points {
            let voxel = round_to_voxel(p);
            if in_bounds(voxel) {
                grid.set_label(voxel, label);
            }
        }
    }
}

fn round_to_voxel(p: &crate::geometry::Point3) -> Voxel {
    (p.x.round() as i64, p.y.round() as i64, p.z.round() as i64)
}

fn warn_on_background_label(label: i64) {
    if label == 0 {
        log::warn!("voxelize: writing background label 0 onto the grid, graph element will read as unlabeled");
    }
}

/// Build an edge-label function from a per-vertex label map, per the
/// convention that an edge inherits its label from whichever endpoint has
/// the higher-priority (here: numerically greater) label — the common case
/// being a vertex-labeled tree where edges between same-labeled regions
/// should paint as that region's label, and edges crossing regions paint as
/// the "downstream" one.
pub fn edge_label_from_vertex_label_map(graph: &SpatialGraph, vertex_labels: &HashMap<VertexId, i64>) -> impl Fn(EdgeId) -> i64 + '_ {
    move |e: EdgeId| {
        let (a, b) = graph.endpoints(e).unwrap();
        let la = vertex_labels.get(&a).copied().unwrap_or(0);
        let lb = vertex_labels.get(&b).copied().unwrap_or(0);
        la.max(lb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::SpatialEdge;
    use crate::geometry::Point3;
    use crate::image::LabelImage;
    use crate::node::SpatialNode;

    #[test]
    fn voxelize_paints_vertices_and_edge_points() {
        let mut g = SpatialGraph::new();
        let a = g.add_vertex(SpatialNode::new(Point3::new(0.0, 0.0, 0.0)));
        let b = g.add_vertex(SpatialNode::new(Point3::new(2.0, 0.0, 0.0)));
        g.add_edge(a, b, SpatialEdge::new(vec![Point3::new(1.0, 0.0, 0.0)]));

        let mut grid = LabelImage::new((4, 4, 4));
        voxelize(&g, &mut grid, |_| 7, |_| 7);

        assert_eq!(grid.get_label((0, 0, 0)), 7);
        assert_eq!(grid.get_label((1, 0, 0)), 7);
        assert_eq!(grid.get_label((2, 0, 0)), 7);
        assert_eq!(grid.get_label((3, 3, 3)), 0);
    }

    #[test]
    fn out_of_bounds_positions_are_skipped() {
        let mut g = SpatialGraph::new();
        g.add_vertex(SpatialNode::new(Point3::new(100.0, 0.0, 0.0)));
        let mut grid = LabelImage::new((4, 4, 4));
        voxelize(&g, &mut grid, |_| 1, |_| 1);
        assert_eq!(grid.get_label((100, 0, 0)), 0);
    }

    #[test]
    fn painting_the_background_label_warns_rather_than_panics() {
        // Run with `--nocapture` and `RUST_LOG=warn` to see the warning this
        // exercises; the point of the test is that writing label 0 is a
        // no-op diagnostic, not an error.
        let _ = env_logger::builder().is_test(true).try_init();
        let mut g = SpatialGraph::new();
        g.add_vertex(SpatialNode::new(Point3::new(0.0, 0.0, 0.0)));
        let mut grid = LabelImage::new((4, 4, 4));
        voxelize(&g, &mut grid, |_| 0, |_| 0);
        assert_eq!(grid.get_label((0, 0, 0)), 0);
    }
}
