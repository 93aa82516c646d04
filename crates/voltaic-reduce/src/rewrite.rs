//! Iterated series/parallel rewriting of the canonical edge multigraph.
//!
//! Each edge carries an oriented expression `from -> to`. The rewriter
//! applies two rules until a single edge spans the reference terminals:
//!
//! 1. Parallel: edges sharing an unordered endpoint pair merge into one
//!    parallel expression.
//! 2. Series: a non-terminal super-node of degree 2 whose edges lead to
//!    distinct neighbors merges its two edges into one series expression.
//!
//! Both scans are deterministic - parallel groups by first occurrence,
//! series candidates in super-node index order - so equal inputs always
//! produce the same tree.

use indexmap::IndexMap;

use voltaic_core::tree::{Atom, Branch, Expr};
use voltaic_core::{CanonCircuit, UidGen};

use crate::error::{Error, Result};

/// Hard bound on rewrite steps; a circuit this size cannot need more.
const REWRITE_LIMIT: usize = 10_000;

#[derive(Debug, Clone)]
struct REdge {
    from: usize,
    to: usize,
    expr: Expr,
}

impl REdge {
    fn reversed(&self) -> REdge {
        REdge {
            from: self.to,
            to: self.from,
            expr: self.expr.reversed(),
        }
    }

    /// Orient so that the edge starts at `from`.
    fn oriented_from(&self, from: usize) -> REdge {
        if self.from == from {
            self.clone()
        } else {
            self.reversed()
        }
    }

    /// Orient so that the edge ends at `to`.
    fn oriented_to(&self, to: usize) -> REdge {
        if self.to == to {
            self.clone()
        } else {
            self.reversed()
        }
    }
}

/// Collapse the canonical graph to a single `+ -> -` expression, or
/// report that the circuit is not series/parallel with respect to the
/// terminals.
pub fn reduce_graph(canon: &CanonCircuit, ids: &mut UidGen) -> Result<Expr> {
    let mut edges: Vec<REdge> = canon
        .elements
        .iter()
        .map(|el| REdge {
            from: el.a,
            to: el.b,
            expr: Expr::Atom(Atom {
                id: el.id,
                name: el.label.clone(),
                generated: false,
                device: el.device,
            }),
        })
        .collect();

    for _ in 0..REWRITE_LIMIT {
        if edges.len() == 1 {
            let only = edges.pop().expect("one edge");
            return if (only.from, only.to) == (canon.plus, canon.minus) {
                Ok(only.expr)
            } else if (only.from, only.to) == (canon.minus, canon.plus) {
                Ok(only.reversed().expr)
            } else {
                Err(Error::NotSeriesParallel)
            };
        }

        if merge_parallel(&mut edges, ids) {
            continue;
        }
        if merge_series(&mut edges, canon.node_count, canon.plus, canon.minus) {
            continue;
        }
        return Err(Error::NotSeriesParallel);
    }

    Err(Error::LimitReached)
}

/// Find the first group of >= 2 edges sharing an unordered endpoint
/// pair and merge it into one parallel edge. The group's first edge
/// fixes the canonical orientation.
fn merge_parallel(edges: &mut Vec<REdge>, ids: &mut UidGen) -> bool {
    let mut groups: IndexMap<(usize, usize), Vec<usize>> = IndexMap::new();
    for (i, edge) in edges.iter().enumerate() {
        let key = if edge.from <= edge.to {
            (edge.from, edge.to)
        } else {
            (edge.to, edge.from)
        };
        groups.entry(key).or_default().push(i);
    }

    let Some(members) = groups.into_values().find(|m| m.len() >= 2) else {
        return false;
    };

    let (from, to) = (edges[members[0]].from, edges[members[0]].to);
    let branches: Vec<Branch> = members
        .iter()
        .map(|&i| {
            let oriented = edges[i].oriented_from(from);
            Branch::new(ids.fresh(), vec![oriented.expr])
        })
        .collect();

    let merged = REdge {
        from,
        to,
        expr: Expr::parallel(branches),
    };
    for &i in members.iter().rev() {
        edges.remove(i);
    }
    edges.insert(members[0], merged);
    true
}

/// Find the first non-terminal super-node of degree 2 whose incident
/// edges lead to distinct neighbors and splice them into one series
/// edge. Nodes are scanned in index order.
fn merge_series(edges: &mut Vec<REdge>, node_count: usize, plus: usize, minus: usize) -> bool {
    for node in 0..node_count {
        if node == plus || node == minus {
            continue;
        }
        let incident: Vec<usize> = edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.from == node || e.to == node)
            .map(|(i, _)| i)
            .collect();
        if incident.len() != 2 {
            continue;
        }

        let first = edges[incident[0]].oriented_to(node);
        let second = edges[incident[1]].oriented_from(node);
        if first.from == second.to {
            // A two-edge loop; the parallel rule resolves it.
            continue;
        }

        let merged = REdge {
            from: first.from,
            to: second.to,
            expr: Expr::series(vec![first.expr, second.expr]),
        };
        edges.remove(incident[1]);
        edges.remove(incident[0]);
        edges.insert(incident[0], merged);
        return true;
    }
    false
}
