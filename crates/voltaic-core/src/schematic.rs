//! Editor-form circuit: a labeled multigraph of vertices and edges.

use indexmap::IndexMap;

use crate::id::{Uid, UidGen};

/// A vertex of the editor-form circuit.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: Uid,
    pub label: Option<String>,
    /// Canvas position. Irrelevant to analysis.
    pub x: f64,
    pub y: f64,
}

/// What an edge is, with its electrical parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeKind {
    /// Ideal connection; contracts its endpoints into one node.
    Wire,
    /// Ohms must be finite and strictly positive.
    Resistor { ohms: f64 },
    /// Ideal 0-ohm meter; the reported current flows a -> b.
    Ammeter,
    /// Endpoint `a` is +, `b` is -.
    VoltageSource { volts: f64 },
    /// Injects current a -> b.
    CurrentSource { amps: f64 },
}

impl EdgeKind {
    pub fn is_wire(self) -> bool {
        matches!(self, EdgeKind::Wire)
    }

    /// Whether this edge is an independent source.
    pub fn is_source(self) -> bool {
        matches!(
            self,
            EdgeKind::VoltageSource { .. } | EdgeKind::CurrentSource { .. }
        )
    }
}

/// An edge of the editor-form circuit, between vertices `a` and `b`.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: Uid,
    pub label: Option<String>,
    pub a: Uid,
    pub b: Uid,
    pub kind: EdgeKind,
}

/// The mutable editor document. Everything the analysis produces is an
/// immutable value re-derived from this on demand.
#[derive(Debug, Clone, Default)]
pub struct Schematic {
    vertices: IndexMap<Uid, Vertex>,
    edges: IndexMap<Uid, Edge>,
    plus: Option<Uid>,
    minus: Option<Uid>,
    ids: UidGen,
}

impl Schematic {
    /// Create an empty schematic.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unlabeled vertex at the given position, returning its id.
    pub fn add_vertex(&mut self, x: f64, y: f64) -> Uid {
        let id = self.ids.fresh();
        self.vertices.insert(
            id,
            Vertex {
                id,
                label: None,
                x,
                y,
            },
        );
        id
    }

    /// Add a labeled vertex, returning its id.
    pub fn add_labeled_vertex(&mut self, label: impl Into<String>, x: f64, y: f64) -> Uid {
        let id = self.add_vertex(x, y);
        self.vertices[&id].label = Some(label.into());
        id
    }

    /// Add an edge between two vertices, returning its id.
    ///
    /// The endpoints are not checked here; dangling references are
    /// reported by canonicalization.
    pub fn add_edge(&mut self, a: Uid, b: Uid, kind: EdgeKind) -> Uid {
        let id = self.ids.fresh();
        self.edges.insert(
            id,
            Edge {
                id,
                label: None,
                a,
                b,
                kind,
            },
        );
        id
    }

    /// Add a labeled edge, returning its id.
    pub fn add_labeled_edge(
        &mut self,
        label: impl Into<String>,
        a: Uid,
        b: Uid,
        kind: EdgeKind,
    ) -> Uid {
        let id = self.add_edge(a, b, kind);
        self.edges[&id].label = Some(label.into());
        id
    }

    /// Name the "+" and "-" reference vertices.
    pub fn set_terminals(&mut self, plus: Uid, minus: Uid) {
        self.plus = Some(plus);
        self.minus = Some(minus);
    }

    /// Drop explicit terminal references, falling back to the defaults.
    pub fn clear_terminals(&mut self) {
        self.plus = None;
        self.minus = None;
    }

    /// Explicit "+" reference vertex, if any.
    pub fn plus(&self) -> Option<Uid> {
        self.plus
    }

    /// Explicit "-" reference vertex, if any.
    pub fn minus(&self) -> Option<Uid> {
        self.minus
    }

    /// Get a vertex by id.
    pub fn vertex(&self, id: Uid) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Get an edge by id.
    pub fn edge(&self, id: Uid) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Iterate vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Iterate edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// A generator for ids that will not collide with this document.
    pub fn fresh_uids(&self) -> UidGen {
        self.ids.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_vertices_and_edges() {
        let mut sch = Schematic::new();
        let a = sch.add_vertex(0.0, 0.0);
        let b = sch.add_vertex(2.0, 0.0);
        let r = sch.add_edge(a, b, EdgeKind::Resistor { ohms: 100.0 });

        assert_eq!(sch.vertex_count(), 2);
        assert_eq!(sch.edge_count(), 1);
        assert_eq!(sch.edge(r).unwrap().a, a);
        assert_eq!(sch.edge(r).unwrap().b, b);
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut sch = Schematic::new();
        let v0 = sch.add_vertex(0.0, 0.0);
        let v1 = sch.add_labeled_vertex("out", 1.0, 0.0);
        let v2 = sch.add_vertex(2.0, 0.0);

        let order: Vec<Uid> = sch.vertices().map(|v| v.id).collect();
        assert_eq!(order, vec![v0, v1, v2]);
        assert_eq!(sch.vertex(v1).unwrap().label.as_deref(), Some("out"));
    }

    #[test]
    fn test_terminals() {
        let mut sch = Schematic::new();
        let a = sch.add_vertex(0.0, 0.0);
        let b = sch.add_vertex(1.0, 0.0);
        assert_eq!(sch.plus(), None);

        sch.set_terminals(a, b);
        assert_eq!(sch.plus(), Some(a));
        assert_eq!(sch.minus(), Some(b));

        sch.clear_terminals();
        assert_eq!(sch.minus(), None);
    }

    #[test]
    fn test_fresh_uids_do_not_collide() {
        let mut sch = Schematic::new();
        let a = sch.add_vertex(0.0, 0.0);
        let b = sch.add_vertex(1.0, 0.0);
        sch.add_edge(a, b, EdgeKind::Wire);

        let mut ids = sch.fresh_uids();
        let fresh = ids.fresh();
        assert!(sch.vertex(fresh).is_none());
        assert!(sch.edge(fresh).is_none());
    }
}
