//! Tabular and plain-text I/O: per-vertex/per-edge label and generation
//! maps as CSV, and a human-readable text dump of a whole graph for
//! debugging and small-scale interchange.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::geometry::Point3;
use crate::graph::{EdgeId, SpatialGraph, VertexId};

/// Write a `vertex_id,label` CSV to `path` from a vertex-to-label map.
pub fn write_vertex_to_label_map(path: &Path, map: &HashMap<VertexId, i64>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|source| csv_err(path, source))?;
    writer.write_record(["vertex_id", "label"]).map_err(|source| csv_err(path, source))?;
    for (v, label) in map {
        writer
            .write_record([v.index().to_string(), label.to_string()])
            .map_err(|source| csv_err(path, source))?;
    }
    writer.flush().map_err(|source| io_err(path, source))
}

/// Inverse of [`write_vertex_to_label_map`].
pub fn read_vertex_to_label_map(path: &Path) -> Result<HashMap<VertexId, i64>> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| csv_err(path, source))?;
    let mut out = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|source| csv_err(path, source))?;
        let id: usize = record.get(0).ok_or_else(|| malformed(path, "missing vertex_id column"))?.parse().map_err(|_| malformed(path, "vertex_id is not an integer"))?;
        let label: i64 = record.get(1).ok_or_else(|| malformed(path, "missing label column"))?.parse().map_err(|_| malformed(path, "label is not an integer"))?;
        out.insert(VertexId::new(id), label);
    }
    Ok(out)
}

/// As [`write_vertex_to_label_map`], for generation numbers.
pub fn write_vertex_to_generation_map(path: &Path, map: &HashMap<VertexId, i64>) -> Result<()> {
    write_vertex_to_label_map(path, map)
}

/// Inverse of [`write_vertex_to_generation_map`].
pub fn read_vertex_to_generation_map(path: &Path) -> Result<HashMap<VertexId, i64>> {
    read_vertex_to_label_map(path)
}

/// Write an `edge,label` CSV where `edge` is rendered as its two endpoint
/// vertex ids joined with a hyphen (`"3-7"`), headed by a `#` comment line
/// naming the columns — the convention the originating tool used for edge
/// tables, since a plain two-column header can't express an edge key as
/// cleanly as a vertex one.
pub fn write_edge_to_label_map(path: &Path, graph: &SpatialGraph, map: &HashMap<EdgeId, i64>) -> Result<()> {
    let mut file = std::fs::File::create(path).map_err(|source| io_err(path, source))?;
    writeln!(file, "# edge,label").map_err(|source| io_err(path, source))?;
    for (e, label) in map {
        let (a, b) = graph.endpoints(*e).ok_or(Error::EdgeNotFound(*e))?;
        writeln!(file, "{}-{},{}", a.index(), b.index(), label).map_err(|source| io_err(path, source))?;
    }
    Ok(())
}

/// Inverse of [`write_edge_to_label_map`]; resolves each `"a-b"` key back to
/// an [`EdgeId`] by looking it up in `graph`, failing with
/// [`Error::VertexNotFound`]/[`Error::EdgeNotFound`] if the referenced
/// vertices or edge no longer exist.
pub fn read_edge_to_label_map(path: &Path, graph: &SpatialGraph) -> Result<HashMap<EdgeId, i64>> {
    let file = std::fs::File::open(path).map_err(|source| io_err(path, source))?;
    let reader = std::io::BufReader::new(file);
    let mut out = HashMap::new();

    for line in reader.lines() {
        let line = line.map_err(|source| io_err(path, source))?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let (key, label) = line.split_once(',').ok_or_else(|| malformed(path, "expected 'a-b,label'"))?;
        let (a, b) = key.split_once('-').ok_or_else(|| malformed(path, "expected 'a-b' edge key"))?;
        let a: usize = a.parse().map_err(|_| malformed(path, "edge endpoint is not an integer"))?;
        let b: usize = b.parse().map_err(|_| malformed(path, "edge endpoint is not an integer"))?;
        let label: i64 = label.trim().parse().map_err(|_| malformed(path, "label is not an integer"))?;
        let va = VertexId::new(a);
        let vb = VertexId::new(b);
        let e = graph.find_edge(va, vb).ok_or(Error::VertexNotFound(va))?;
        out.insert(e, label);
    }
    Ok(out)
}

/// A compact human-readable dump of a graph: one `v <id> <x> <y> <z>` line
/// per vertex followed by one `e <a> <b> <x> <y> <z> ...` line per edge
/// (endpoint indices then its polyline points flattened), suitable for
/// diffing in a text editor or pasting into a bug report.
pub fn to_text(graph: &SpatialGraph) -> String {
    let mut out = String::new();
    for v in graph.vertex_ids() {
        let p = graph.vertex_weight(v).unwrap().pos;
        out.push_str(&format!("v {} {} {} {}\n", v.index(), p.x, p.y, p.z));
    }
    for e in graph.edge_ids() {
        let (a, b) = graph.endpoints(e).unwrap();
        out.push_str(&format!("e {} {}", a.index(), b.index()));
        for p in &graph.edge_weight(e).unwrap().edge_points {
            out.push_str(&format!(" {} {} {}", p.x, p.y, p.z));
        }
        out.push('\n');
    }
    out
}

/// Inverse of [`to_text`]. Vertex lines must appear before any edge
/// referencing them; `v` lines are expected in increasing id order
/// starting at 0 (the order [`to_text`] writes them in), so the parsed
/// graph's vertex ids match the original.
pub fn from_text(text: &str) -> Result<SpatialGraph> {
    let mut graph = SpatialGraph::new();
    for (line_no, line) in text.lines().enumerate() {
        let mut fields = line.split_whitespace();
        match fields.next() {
            None => continue,
            Some("v") => {
                let coords = parse_point(&mut fields, line_no)?;
                graph.add_vertex(crate::node::SpatialNode::new(coords));
            }
            Some("e") => {
                let a: usize = fields.next().and_then(|s| s.parse().ok()).ok_or_else(|| text_malformed(line_no, "missing edge source"))?;
                let b: usize = fields.next().and_then(|s| s.parse().ok()).ok_or_else(|| text_malformed(line_no, "missing edge target"))?;
                let mut points = Vec::new();
                loop {
                    let rest: Vec<&str> = fields.clone().collect();
                    if rest.is_empty() {
                        break;
                    }
                    points.push(parse_point(&mut fields, line_no)?);
                }
                graph.add_edge(VertexId::new(a), VertexId::new(b), crate::edge::SpatialEdge::new(points));
            }
            Some(other) => return Err(text_malformed(line_no, &format!("unrecognized line kind '{other}'"))),
        }
    }
    Ok(graph)
}

fn parse_point<'a>(fields: &mut impl Iterator<Item = &'a str>, line_no: usize) -> Result<Point3> {
    let x: f64 = fields.next().and_then(|s| s.parse().ok()).ok_or_else(|| text_malformed(line_no, "expected x coordinate"))?;
    let y: f64 = fields.next().and_then(|s| s.parse().ok()).ok_or_else(|| text_malformed(line_no, "expected y coordinate"))?;
    let z: f64 = fields.next().and_then(|s| s.parse().ok()).ok_or_else(|| text_malformed(line_no, "expected z coordinate"))?;
    Ok(Point3::new(x, y, z))
}

fn csv_err(path: &Path, source: csv::Error) -> Error {
    Error::Csv { path: path.to_path_buf(), source }
}

fn io_err(path: &Path, source: std::io::Error) -> Error {
    Error::Io { path: path.to_path_buf(), source }
}

fn malformed(path: &Path, reason: &str) -> Error {
    Error::MalformedData { path: path.to_path_buf(), reason: reason.to_string() }
}

fn text_malformed(line_no: usize, reason: &str) -> Error {
    Error::MalformedData { path: Path::new("<text>").to_path_buf(), reason: format!("line {}: {}", line_no + 1, reason) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::SpatialEdge;
    use crate::node::SpatialNode;

    #[test]
    fn text_round_trip_preserves_topology_and_points() {
        let mut g = SpatialGraph::new();
        let a = g.add_vertex(SpatialNode::new(Point3::new(0.0, 0.0, 0.0)));
        let b = g.add_vertex(SpatialNode::new(Point3::new(1.0, 0.0, 0.0)));
        g.add_edge(a, b, SpatialEdge::new(vec![Point3::new(0.5, 1.0, 0.0)]));

        let text = to_text(&g);
        let parsed = from_text(&text).unwrap();
        assert_eq!(parsed.vertex_count(), g.vertex_count());
        assert_eq!(parsed.edge_count(), g.edge_count());
        let e = parsed.edge_ids().next().unwrap();
        assert_eq!(parsed.edge_weight(e).unwrap().edge_points.len(), 1);
    }

    #[test]
    fn malformed_text_line_reports_line_number() {
        let err = from_text("v 0 0 0\nbogus line").unwrap_err();
        assert!(matches!(err, Error::MalformedData { .. }));
    }
}
