//! Wire contraction and terminal resolution.
//!
//! Canonicalization turns the editor-form multigraph into a list of
//! non-wire elements over compact super-node indices: every group of
//! vertices connected by wires becomes one super-node, and the "+"/"-"
//! reference terminals are resolved to super-nodes.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::id::Uid;
use crate::schematic::{EdgeKind, Schematic};
use crate::tree::Device;

/// Union-find over vertex slots, with path halving.
#[derive(Debug)]
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// A non-wire element over super-node indices. Orientation is the
/// original edge's a -> b.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonElement {
    pub id: Uid,
    pub label: Option<String>,
    pub a: usize,
    pub b: usize,
    pub device: Device,
}

/// The canonical circuit: non-wire elements over compact super-node
/// indices, with resolved reference terminals.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonCircuit {
    /// Number of super-nodes (indices are 0..node_count).
    pub node_count: usize,
    /// Elements in edge insertion order.
    pub elements: Vec<CanonElement>,
    /// "+" reference super-node.
    pub plus: usize,
    /// "-" reference super-node.
    pub minus: usize,
}

impl CanonCircuit {
    /// A generator for ids that will not collide with any element id.
    pub fn fresh_uids(&self) -> crate::id::UidGen {
        let mut ids = crate::id::UidGen::new();
        for el in &self.elements {
            ids.reserve(el.id);
        }
        ids
    }
}

/// Contract wires and resolve terminals.
///
/// Super-node indices are assigned in first-seen representative order,
/// scanning vertices in insertion order, so equal inputs always produce
/// the same partition.
pub fn canonicalize(schematic: &Schematic) -> Result<CanonCircuit> {
    let slots: IndexMap<Uid, usize> = schematic
        .vertices()
        .enumerate()
        .map(|(slot, v)| (v.id, slot))
        .collect();

    // Validate endpoints and element values, union wire endpoints.
    let mut uf = UnionFind::new(slots.len());
    for edge in schematic.edges() {
        let a = *slots
            .get(&edge.a)
            .ok_or(Error::MissingEndpoint { edge: edge.id })?;
        let b = *slots
            .get(&edge.b)
            .ok_or(Error::MissingEndpoint { edge: edge.id })?;

        match edge.kind {
            EdgeKind::Wire => uf.union(a, b),
            EdgeKind::Resistor { ohms } => {
                if !ohms.is_finite() || ohms <= 0.0 {
                    return Err(Error::BadOhms { id: edge.id, ohms });
                }
            }
            EdgeKind::VoltageSource { volts } => {
                if !volts.is_finite() {
                    return Err(Error::BadSourceValue {
                        id: edge.id,
                        value: volts,
                    });
                }
            }
            EdgeKind::CurrentSource { amps } => {
                if !amps.is_finite() {
                    return Err(Error::BadSourceValue {
                        id: edge.id,
                        value: amps,
                    });
                }
            }
            EdgeKind::Ammeter => {}
        }
    }

    // Compact super-node indices in first-seen representative order.
    let mut super_of_root = vec![usize::MAX; slots.len()];
    let mut super_of_slot = vec![0usize; slots.len()];
    let mut node_count = 0usize;
    for slot in 0..slots.len() {
        let root = uf.find(slot);
        if super_of_root[root] == usize::MAX {
            super_of_root[root] = node_count;
            node_count += 1;
        }
        super_of_slot[slot] = super_of_root[root];
    }

    if node_count < 2 {
        return Err(Error::TooFewNodes);
    }

    let (plus, minus) = resolve_terminals(schematic, &slots, &super_of_slot)?;
    if plus == minus {
        return Err(Error::TerminalsShorted);
    }

    // Translate non-wire edges; drop those whose endpoints coincide,
    // except a nonzero voltage source, which is a hard short.
    let mut elements = Vec::new();
    for edge in schematic.edges() {
        let device = match edge.kind {
            EdgeKind::Wire => continue,
            EdgeKind::Resistor { ohms } => Device::Resistor { ohms },
            EdgeKind::Ammeter => Device::Ammeter,
            EdgeKind::VoltageSource { volts } => Device::VoltageSource { volts },
            EdgeKind::CurrentSource { amps } => Device::CurrentSource { amps },
        };
        let a = super_of_slot[slots[&edge.a]];
        let b = super_of_slot[slots[&edge.b]];
        if a == b {
            if let Device::VoltageSource { volts } = device {
                if volts != 0.0 {
                    return Err(Error::SourceShorted { id: edge.id });
                }
            }
            continue;
        }
        elements.push(CanonElement {
            id: edge.id,
            label: edge.label.clone(),
            a,
            b,
            device,
        });
    }

    if elements.is_empty() {
        return Err(Error::NoComponents);
    }

    Ok(CanonCircuit {
        node_count,
        elements,
        plus,
        minus,
    })
}

/// Resolve the "+"/"-" terminals to super-nodes: an explicit distinct
/// pair wins, else the first voltage source's endpoints (a = +, b = -),
/// else the first two vertices.
fn resolve_terminals(
    schematic: &Schematic,
    slots: &IndexMap<Uid, usize>,
    super_of_slot: &[usize],
) -> Result<(usize, usize)> {
    let super_of = |vertex: Uid| -> Result<usize> {
        slots
            .get(&vertex)
            .map(|&slot| super_of_slot[slot])
            .ok_or(Error::MissingTerminal { vertex })
    };

    if let (Some(plus), Some(minus)) = (schematic.plus(), schematic.minus()) {
        if plus == minus {
            return Err(Error::TerminalsCoincide);
        }
        return Ok((super_of(plus)?, super_of(minus)?));
    }

    if let Some(vs) = schematic
        .edges()
        .find(|e| matches!(e.kind, EdgeKind::VoltageSource { .. }))
    {
        return Ok((super_of(vs.a)?, super_of(vs.b)?));
    }

    let mut vertices = schematic.vertices();
    match (vertices.next(), vertices.next()) {
        (Some(a), Some(b)) => Ok((super_of(a.id)?, super_of(b.id)?)),
        _ => Err(Error::TooFewNodes),
    }
}
