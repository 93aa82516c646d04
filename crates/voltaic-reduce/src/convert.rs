//! Translations between the tree form and the canonical graph form.
//!
//! `tree_to_graph` flattens a series/parallel expression into elements
//! over fresh super-node indices; `graph_to_tree` is the rewriter. The
//! two compose so that tree -> graph -> tree preserves the set of atoms
//! and their orientation-adjusted parameters.

use voltaic_core::tree::Expr;
use voltaic_core::{CanonCircuit, CanonElement, UidGen};

use crate::error::{Error, Result};
use crate::rewrite;

/// Flatten a tree into a canonical graph spanning + (node 0) to -
/// (node 1). Internal nodes are allocated from 2 upward, in + -> -
/// walk order.
pub fn tree_to_graph(expr: &Expr) -> Result<CanonCircuit> {
    let mut builder = GraphBuilder {
        elements: Vec::new(),
        next_node: 2,
    };
    builder.emit(expr, 0, 1)?;

    Ok(CanonCircuit {
        node_count: builder.next_node,
        elements: builder.elements,
        plus: 0,
        minus: 1,
    })
}

/// Collapse a canonical graph back into a + -> - tree.
pub fn graph_to_tree(canon: &CanonCircuit, ids: &mut UidGen) -> Result<Expr> {
    rewrite::reduce_graph(canon, ids)
}

struct GraphBuilder {
    elements: Vec<CanonElement>,
    next_node: usize,
}

impl GraphBuilder {
    fn fresh_node(&mut self) -> usize {
        let n = self.next_node;
        self.next_node += 1;
        n
    }

    fn emit(&mut self, expr: &Expr, from: usize, to: usize) -> Result<()> {
        match expr {
            Expr::Atom(atom) => {
                self.elements.push(CanonElement {
                    id: atom.id,
                    label: atom.name.clone(),
                    a: from,
                    b: to,
                    device: atom.device,
                });
                Ok(())
            }
            Expr::Series(children) => self.emit_run(children, from, to),
            Expr::Parallel(branches) => {
                for branch in branches {
                    self.emit_run(&branch.items, from, to)?;
                }
                Ok(())
            }
        }
    }

    fn emit_run(&mut self, items: &[Expr], from: usize, to: usize) -> Result<()> {
        if items.is_empty() {
            return Err(Error::EmptyBranch);
        }
        let mut cursor = from;
        for (i, item) in items.iter().enumerate() {
            let next = if i + 1 == items.len() {
                to
            } else {
                self.fresh_node()
            };
            self.emit(item, cursor, next)?;
            cursor = next;
        }
        Ok(())
    }
}
