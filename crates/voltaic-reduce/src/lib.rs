//! Series/parallel reduction for Voltaic.
//!
//! This crate collapses a canonicalized circuit graph into a tree
//! expression and records how it got there:
//!
//! - [`reduce_graph`](rewrite::reduce_graph) - rewrite the edge
//!   multigraph until a single `+ -> -` edge remains
//! - [`trace`](trace::trace) - replay the tree deepest-first, one level
//!   per step, collapsing series runs and parallel blocks into generated
//!   equivalent resistors
//! - [`tree_to_graph`](convert::tree_to_graph) /
//!   [`graph_to_tree`](convert::graph_to_tree) - translations between
//!   the two forms
//!
//! # Example
//!
//! ```rust
//! use voltaic_core::tree::{Atom, Device, Expr};
//! use voltaic_core::{Uid, UidGen};
//! use voltaic_reduce::trace;
//!
//! // Two series resistors collapse in one level.
//! let tree = Expr::series(vec![
//!     Expr::Atom(Atom::new(Uid::new(1), Device::Resistor { ohms: 100.0 })),
//!     Expr::Atom(Atom::new(Uid::new(2), Device::Resistor { ohms: 200.0 })),
//! ]);
//! let mut ids = UidGen::starting_after(Uid::new(2));
//! let trace = trace(&tree, &mut ids);
//! assert_eq!(trace.equivalent_ohms(), Some(300.0));
//! ```

pub mod convert;
pub mod error;
pub mod rewrite;
pub mod trace;

pub use convert::{graph_to_tree, tree_to_graph};
pub use error::{Error, Result};
pub use rewrite::reduce_graph;
pub use trace::{trace, Reduction, ReductionKind, ReductionTrace, TraceLevel};
