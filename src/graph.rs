//! `Graph<N, E>` is an undirected multigraph using an adjacency-list
//! representation, in the spirit of `petgraph::Graph` but specialized to
//! the one edge-type this crate ever needs: undirected, with parallel
//! edges and self-loops permitted. Each vertex stores the head of two
//! intrusive singly-linked lists of incident edges (one list "slot" per
//! edge-endpoint side); for an undirected graph both slots are simply
//! "incident edges", unlike petgraph's `Outgoing`/`Incoming` split.
//!
//! [`SpatialGraph`] is this `Graph` instantiated with [`SpatialNode`] and
//! [`SpatialEdge`] payloads.

use std::fmt;

use crate::edge::SpatialEdge;
use crate::node::SpatialNode;

/// Vertex identifier. Stable across additions; **removing** a vertex or
/// edge may shift other indices (the last element is swapped into the
/// removed slot), exactly as in petgraph's `Graph`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexId(u32);

impl VertexId {
    #[inline]
    pub fn new(x: usize) -> Self {
        VertexId(x as u32)
    }
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
    #[inline]
    fn end() -> Self {
        VertexId(u32::MAX)
    }
}

/// Edge identifier. Same stability caveat as [`VertexId`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeId(u32);

impl EdgeId {
    #[inline]
    pub fn new(x: usize) -> Self {
        EdgeId(x as u32)
    }
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
    #[inline]
    fn end() -> Self {
        EdgeId(u32::MAX)
    }
}

#[derive(Debug, Clone)]
struct Node<N> {
    weight: N,
    /// Head of this vertex's incident-edge list, one per endpoint "slot"
    /// (slot 0 if this vertex is stored as the edge's `node[0]`, slot 1 if
    /// `node[1]`; a self-loop occupies both slots of the same edge).
    next: [EdgeId; 2],
}

#[derive(Debug, Clone)]
struct Edge<E> {
    weight: E,
    node: [VertexId; 2],
    next: [EdgeId; 2],
}

enum Pair<T> {
    Both(T, T),
    One(T),
}

fn index_twice<T>(slc: &mut [T], a: usize, b: usize) -> Option<Pair<&mut T>> {
    if a >= slc.len() || b >= slc.len() {
        return None;
    }
    if a == b {
        return slc.get_mut(a).map(Pair::One);
    }
    // SAFETY: a != b and both are in bounds, so the two mutable borrows
    // don't alias.
    unsafe {
        let ar = &mut *(slc.get_unchecked_mut(a) as *mut T);
        let br = &mut *(slc.get_unchecked_mut(b) as *mut T);
        Some(Pair::Both(ar, br))
    }
}

/// An undirected multigraph with node weight `N` and edge weight `E`.
#[derive(Debug, Clone)]
pub struct Graph<N, E> {
    nodes: Vec<Node<N>>,
    edges: Vec<Edge<E>>,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Graph::new()
    }
}

impl<N, E> Graph<N, E> {
    pub fn new() -> Self {
        Graph {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Graph {
            nodes: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn add_vertex(&mut self, weight: N) -> VertexId {
        let id = VertexId::new(self.nodes.len());
        assert!(id != VertexId::end(), "Graph::add_vertex: too many vertices");
        self.nodes.push(Node {
            weight,
            next: [EdgeId::end(), EdgeId::end()],
        });
        id
    }

    pub fn vertex_weight(&self, v: VertexId) -> Option<&N> {
        self.nodes.get(v.index()).map(|n| &n.weight)
    }

    pub fn vertex_weight_mut(&mut self, v: VertexId) -> Option<&mut N> {
        self.nodes.get_mut(v.index()).map(|n| &mut n.weight)
    }

    /// Add an unordered edge between `a` and `b`. Parallel edges and
    /// self-loops (`a == b`) are always permitted: the graph never
    /// deduplicates on insert.
    ///
    /// Panics if either endpoint doesn't exist.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId, weight: E) -> EdgeId {
        let id = EdgeId::new(self.edges.len());
        assert!(id != EdgeId::end(), "Graph::add_edge: too many edges");
        let mut edge = Edge {
            weight,
            node: [a, b],
            next: [EdgeId::end(), EdgeId::end()],
        };
        match index_twice(&mut self.nodes, a.index(), b.index()) {
            None => panic!("Graph::add_edge: vertex index out of bounds"),
            Some(Pair::One(an)) => {
                // self-loop: splice into the same list at both slots.
                edge.next = an.next;
                an.next[0] = id;
                an.next[1] = id;
            }
            Some(Pair::Both(an, bn)) => {
                edge.next = [an.next[0], bn.next[1]];
                an.next[0] = id;
                bn.next[1] = id;
            }
        }
        self.edges.push(edge);
        id
    }

    /// Add an edge between `a` and `b` unless one already exists (in either
    /// order), per the lifting stage's "checked add" requirement.
    pub fn add_edge_unless_exists(&mut self, a: VertexId, b: VertexId, weight: E) -> Option<EdgeId> {
        if self.find_edge(a, b).is_some() {
            None
        } else {
            Some(self.add_edge(a, b, weight))
        }
    }

    pub fn edge_weight(&self, e: EdgeId) -> Option<&E> {
        self.edges.get(e.index()).map(|ed| &ed.weight)
    }

    pub fn edge_weight_mut(&mut self, e: EdgeId) -> Option<&mut E> {
        self.edges.get_mut(e.index()).map(|ed| &mut ed.weight)
    }

    /// The two (unordered) endpoints of an edge.
    pub fn endpoints(&self, e: EdgeId) -> Option<(VertexId, VertexId)> {
        self.edges.get(e.index()).map(|ed| (ed.node[0], ed.node[1]))
    }

    /// Degree of a vertex, counting a self-loop twice (it contributes two
    /// incidences).
    pub fn degree(&self, v: VertexId) -> usize {
        self.edges_of(v).count()
    }

    /// Iterate over the vertices adjacent to `v` (one entry per incident
    /// edge; a self-loop yields `v` twice).
    pub fn neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.edges_of(v).map(move |e| self.other_endpoint(e, v))
    }

    /// Given an edge incident to `v`, the vertex on its other end (for a
    /// self-loop, returns `v` itself).
    pub fn other_endpoint(&self, e: EdgeId, v: VertexId) -> VertexId {
        let ed = &self.edges[e.index()];
        if ed.node[0] == v {
            ed.node[1]
        } else {
            ed.node[0]
        }
    }

    /// All edges incident to `v`, each yielded once (a self-loop is yielded
    /// once per slot, i.e. twice total, matching `degree`).
    pub fn edges_of(&self, v: VertexId) -> EdgesOf<'_, N, E> {
        let next = match self.nodes.get(v.index()) {
            None => [EdgeId::end(), EdgeId::end()],
            Some(n) => n.next,
        };
        EdgesOf { graph: self, next, slot: 0 }
    }

    /// Find an edge between `a` and `b`, in either order. With parallel
    /// edges present, returns the first one found by list order.
    pub fn find_edge(&self, a: VertexId, b: VertexId) -> Option<EdgeId> {
        self.edges_of(a).find(|&e| self.other_endpoint(e, a) == b)
    }

    /// All vertex ids in order of creation.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> {
        (0..self.nodes.len()).map(VertexId::new)
    }

    /// All edge ids in order of creation.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> {
        (0..self.edges.len()).map(EdgeId::new)
    }

    pub fn vertex_weights(&self) -> impl Iterator<Item = (VertexId, &N)> {
        self.nodes.iter().enumerate().map(|(i, n)| (VertexId::new(i), &n.weight))
    }

    pub fn edge_weights(&self) -> impl Iterator<Item = (EdgeId, &E)> {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId::new(i), &e.weight))
    }

    /// Remove an edge, returning its weight. Shifts the id of the last edge
    /// in the list (swap-remove) into `e`'s old slot; callers relying on
    /// edge ids across a removal must re-derive them.
    ///
    /// Each edge belongs to exactly two intrusive lists: vertex `node[0]`'s
    /// "slot 0" list, threaded via `edge.next[0]`, and vertex `node[1]`'s
    /// "slot 1" list, threaded via `edge.next[1]`. Which physical slot an
    /// edge occupies in a given vertex's view is fixed at insertion time by
    /// whether that vertex was passed as `a` or `b` to `add_edge` — it does
    /// not depend on which endpoint value the walk is currently centered
    /// on, which is why `change_edge_links`-style code (here, `unlink`)
    /// indexes by slot number throughout rather than by endpoint identity.
    pub fn remove_edge(&mut self, e: EdgeId) -> Option<E> {
        let (node, next) = {
            let ed = self.edges.get(e.index())?;
            (ed.node, ed.next)
        };
        self.unlink(node, e, next);
        let removed = self.edges.swap_remove(e.index());
        if let Some(moved) = self.edges.get(e.index()) {
            let moved_node = moved.node;
            let old_id = EdgeId::new(self.edges.len());
            self.relink(moved_node, old_id, e);
        }
        Some(removed.weight)
    }

    /// Remove a vertex and every edge incident to it, returning its weight.
    /// Swap-removes the last vertex into the removed slot, so callers must
    /// not rely on vertex ids surviving a removal.
    pub fn remove_vertex(&mut self, v: VertexId) -> Option<N> {
        self.nodes.get(v.index())?;
        for slot in 0..2 {
            loop {
                let next = self.nodes[v.index()].next[slot];
                if next == EdgeId::end() {
                    break;
                }
                self.remove_edge(next);
            }
        }
        let node = self.nodes.swap_remove(v.index());
        if let Some(moved) = self.nodes.get(v.index()) {
            let new_id = v;
            for slot in 0..2 {
                let mut cur = moved.next[slot];
                while cur != EdgeId::end() {
                    let ed = &mut self.edges[cur.index()];
                    ed.node[slot] = new_id;
                    cur = ed.next[slot];
                }
            }
        }
        Some(node.weight)
    }

    /// Splice edge `e` out of the two intrusive lists it belongs to
    /// (`node[0]`'s slot-0 list and `node[1]`'s slot-1 list), replacing its
    /// occurrence with `next[slot]` in each.
    fn unlink(&mut self, node: [VertexId; 2], e: EdgeId, next: [EdgeId; 2]) {
        for slot in 0..2 {
            let v = node[slot];
            let head = self.nodes[v.index()].next[slot];
            if head == e {
                self.nodes[v.index()].next[slot] = next[slot];
                continue;
            }
            let mut cur = head;
            while cur != EdgeId::end() {
                let cur_next = self.edges[cur.index()].next[slot];
                if cur_next == e {
                    self.edges[cur.index()].next[slot] = next[slot];
                    break;
                }
                cur = cur_next;
            }
        }
    }

    /// After a swap-remove moved the last edge from id `old` to id `new`,
    /// fix up the one or two intrusive lists that referenced `old`.
    fn relink(&mut self, node: [VertexId; 2], old: EdgeId, new: EdgeId) {
        for slot in 0..2 {
            let v = node[slot];
            if self.nodes[v.index()].next[slot] == old {
                self.nodes[v.index()].next[slot] = new;
                continue;
            }
            let mut cur = self.nodes[v.index()].next[slot];
            while cur != EdgeId::end() {
                if self.edges[cur.index()].next[slot] == old {
                    self.edges[cur.index()].next[slot] = new;
                    break;
                }
                cur = self.edges[cur.index()].next[slot];
            }
        }
    }
}

impl<N, E> fmt::Display for Graph<N, E>
where
    N: fmt::Debug,
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Graph {{")?;
        for (i, n) in self.nodes.iter().enumerate() {
            writeln!(f, "    {}: {:?}", i, n.weight)?;
        }
        for (i, e) in self.edges.iter().enumerate() {
            writeln!(f, "    edge {}: ({} -- {}) {:?}", i, e.node[0].index(), e.node[1].index(), e.weight)?;
        }
        write!(f, "}}")
    }
}

/// Iterator over the edges incident to a fixed vertex.
pub struct EdgesOf<'a, N, E> {
    graph: &'a Graph<N, E>,
    next: [EdgeId; 2],
    slot: usize,
}

impl<'a, N, E> Iterator for EdgesOf<'a, N, E> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        while self.slot < 2 {
            let cur = self.next[self.slot];
            if cur == EdgeId::end() {
                self.slot += 1;
                continue;
            }
            let ed = &self.graph.edges[cur.index()];
            self.next[self.slot] = ed.next[self.slot];
            return Some(cur);
        }
        None
    }
}

/// `Graph` specialized to the domain's node and edge payloads.
pub type SpatialGraph = Graph<SpatialNode, SpatialEdge>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;

    fn node(x: f64) -> SpatialNode {
        SpatialNode::new(Point3::new(x, 0.0, 0.0))
    }

    #[test]
    fn add_and_query_simple_path() {
        let mut g = SpatialGraph::new();
        let a = g.add_vertex(node(0.0));
        let b = g.add_vertex(node(1.0));
        let c = g.add_vertex(node(2.0));
        g.add_edge(a, b, SpatialEdge::empty());
        g.add_edge(b, c, SpatialEdge::empty());
        assert_eq!(g.degree(a), 1);
        assert_eq!(g.degree(b), 2);
        assert_eq!(g.degree(c), 1);
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn parallel_edges_are_kept() {
        let mut g = SpatialGraph::new();
        let a = g.add_vertex(node(0.0));
        let b = g.add_vertex(node(1.0));
        g.add_edge(a, b, SpatialEdge::empty());
        g.add_edge(a, b, SpatialEdge::new(vec![Point3::new(0.5, 1.0, 0.0)]));
        assert_eq!(g.degree(a), 2);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn self_loop_counts_degree_twice() {
        let mut g = SpatialGraph::new();
        let a = g.add_vertex(node(0.0));
        g.add_edge(a, a, SpatialEdge::empty());
        assert_eq!(g.degree(a), 2);
        assert_eq!(g.neighbors(a).collect::<Vec<_>>(), vec![a, a]);
    }

    #[test]
    fn add_edge_unless_exists_skips_duplicates() {
        let mut g = SpatialGraph::new();
        let a = g.add_vertex(node(0.0));
        let b = g.add_vertex(node(1.0));
        assert!(g.add_edge_unless_exists(a, b, SpatialEdge::empty()).is_some());
        assert!(g.add_edge_unless_exists(b, a, SpatialEdge::empty()).is_none());
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn remove_edge_updates_degrees() {
        let mut g = SpatialGraph::new();
        let a = g.add_vertex(node(0.0));
        let b = g.add_vertex(node(1.0));
        let c = g.add_vertex(node(2.0));
        g.add_edge(a, b, SpatialEdge::empty());
        let e_bc = g.add_edge(b, c, SpatialEdge::empty());
        g.remove_edge(e_bc);
        assert_eq!(g.degree(b), 1);
        assert_eq!(g.degree(c), 0);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn remove_vertex_removes_incident_edges() {
        let mut g = SpatialGraph::new();
        let a = g.add_vertex(node(0.0));
        let b = g.add_vertex(node(1.0));
        let c = g.add_vertex(node(2.0));
        g.add_edge(a, b, SpatialEdge::empty());
        g.add_edge(b, c, SpatialEdge::empty());
        g.remove_vertex(b);
        assert_eq!(g.vertex_count(), 2);
        assert_eq!(g.edge_count(), 0);
    }
}
