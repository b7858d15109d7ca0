//! Emitting a graph as an unstructured-grid mesh: a flat point list, a cell
//! list (one polyline/segment list per edge plus one vertex cell per
//! graph vertex), and named scalar attributes sampled per-point or
//! per-cell. The shape mirrors what VTK-style unstructured grid writers
//! expect, without depending on VTK itself.

use std::collections::HashMap;

use crate::geometry::Point3;
use crate::graph::{EdgeId, SpatialGraph, VertexId};

/// A cell: either a single-point vertex cell or a polyline cell threading
/// through an edge's endpoints and interior points in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Vertex { point: usize },
    Polyline { points: Vec<usize> },
}

/// A flattened mesh: every point in `points`, referenced by index from
/// `cells`; `point_attributes`/`cell_attributes` carry named scalar arrays
/// parallel to `points`/`cells` respectively.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub points: Vec<Point3>,
    pub cells: Vec<Cell>,
    pub point_attributes: HashMap<String, Vec<f64>>,
    pub cell_attributes: HashMap<String, Vec<f64>>,
}

/// Build a [`Mesh`] from `graph`: one point per vertex plus one point per
/// edge polyline interior point, one [`Cell::Vertex`] per graph vertex, and
/// one [`Cell::Polyline`] per edge spanning `[source, edge_points.., target]`
/// in an arbitrary but fixed orientation (the polyline direction carries no
/// meaning beyond point ordering, same as [`crate::edge::SpatialEdge`]).
///
/// `point_scalars`/`cell_scalars` are named callbacks used to populate
/// `point_attributes`/`cell_attributes`: each is invoked once per
/// vertex/edge and its result is written at every point index contributed
/// by that vertex/edge (so a per-edge attribute like "generation" reads the
/// same value across all of that edge's interior points).
pub fn build_mesh(graph: &SpatialGraph, point_scalars: &[(&str, &dyn Fn(VertexId) -> f64)], cell_scalars: &[(&str, &dyn Fn(EdgeId) -> f64)]) -> Mesh {
    let mut mesh = Mesh::default();
    let mut vertex_point: HashMap<VertexId, usize> = HashMap::new();

    for (name, _) in point_scalars {
        mesh.point_attributes.insert(name.to_string(), Vec::new());
    }
    for (name, _) in cell_scalars {
        mesh.cell_attributes.insert(name.to_string(), Vec::new());
    }

    for v in graph.vertex_ids() {
        let idx = mesh.points.len();
        mesh.points.push(graph.vertex_weight(v).unwrap().pos);
        vertex_point.insert(v, idx);
        for (name, f) in point_scalars {
            mesh.point_attributes.get_mut(*name).unwrap().push(f(v));
        }
        mesh.cells.push(Cell::Vertex { point: idx });
    }

    for e in graph.edge_ids() {
        let (source, target) = graph.endpoints(e).unwrap();
        let mut point_ids = Vec::new();
        point_ids.push(vertex_point[&source]);
        for p in &graph.edge_weight(e).unwrap().edge_points {
            let idx = mesh.points.len();
            mesh.points.push(*p);
            point_ids.push(idx);
            for (name, f) in point_scalars {
                // interior polyline points have no owning vertex; carry the
                // average of the edge's two endpoints forward instead of a
                // fabricated per-vertex sample.
                let v = f(source);
                let w = f(target);
                mesh.point_attributes.get_mut(*name).unwrap().push((v + w) / 2.0);
            }
        }
        point_ids.push(vertex_point[&target]);

        mesh.cells.push(Cell::Polyline { points: point_ids });
        for (name, f) in cell_scalars {
            mesh.cell_attributes.get_mut(*name).unwrap().push(f(e));
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::SpatialEdge;
    use crate::node::SpatialNode;

    #[test]
    fn mesh_has_one_vertex_cell_per_graph_vertex_and_one_polyline_per_edge() {
        let mut g = SpatialGraph::new();
        let a = g.add_vertex(SpatialNode::new(Point3::new(0.0, 0.0, 0.0)));
        let b = g.add_vertex(SpatialNode::new(Point3::new(2.0, 0.0, 0.0)));
        g.add_edge(a, b, SpatialEdge::new(vec![Point3::new(1.0, 0.0, 0.0)]));

        let mesh = build_mesh(&g, &[], &[]);
        assert_eq!(mesh.points.len(), 3);
        let vertex_cells = mesh.cells.iter().filter(|c| matches!(c, Cell::Vertex { .. })).count();
        let polyline_cells = mesh.cells.iter().filter(|c| matches!(c, Cell::Polyline { .. })).count();
        assert_eq!(vertex_cells, 2);
        assert_eq!(polyline_cells, 1);
    }

    #[test]
    fn cell_scalar_is_sampled_once_per_edge() {
        let mut g = SpatialGraph::new();
        let a = g.add_vertex(SpatialNode::new(Point3::new(0.0, 0.0, 0.0)));
        let b = g.add_vertex(SpatialNode::new(Point3::new(1.0, 0.0, 0.0)));
        g.add_edge(a, b, SpatialEdge::empty());

        let generation = |_: EdgeId| 3.0;
        let cell_scalars: Vec<(&str, &dyn Fn(EdgeId) -> f64)> = vec![("generation", &generation)];
        let mesh = build_mesh(&g, &[], &cell_scalars);
        assert_eq!(mesh.cell_attributes["generation"], vec![3.0]);
    }
}
