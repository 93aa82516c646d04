//! Core circuit representation for Voltaic.
//!
//! This crate provides the data model shared by the whole analysis
//! pipeline:
//!
//! - [`Schematic`] - the editor-form multigraph of vertices and edges
//! - [`Expr`](tree::Expr) - the series/parallel tree form, oriented + -> -
//! - [`canonicalize`](canonicalize::canonicalize) - wire contraction into
//!   a compact element list over super-nodes
//! - [`MnaSystem`](mna::MnaSystem) - the dense modified-nodal-analysis
//!   matrix equation Ax = b
//!
//! # Modified Nodal Analysis (MNA)
//!
//! MNA formulates a linear system whose unknowns are the node potentials
//! (excluding ground) followed by one auxiliary branch current per
//! voltage source. Ideal ammeters are modeled as zero-volt sources so
//! their branch current appears among the unknowns.
//!
//! # Example: canonicalizing a voltage divider
//!
//! ```rust
//! use voltaic_core::schematic::{EdgeKind, Schematic};
//! use voltaic_core::canonicalize::canonicalize;
//!
//! let mut sch = Schematic::new();
//! let top = sch.add_vertex(0.0, 0.0);
//! let mid = sch.add_vertex(1.0, 0.0);
//! let bot = sch.add_vertex(2.0, 0.0);
//! sch.add_edge(top, mid, EdgeKind::Resistor { ohms: 1e3 });
//! sch.add_edge(mid, bot, EdgeKind::Resistor { ohms: 1e3 });
//! sch.add_edge(top, bot, EdgeKind::VoltageSource { volts: 10.0 });
//!
//! let canon = canonicalize(&sch).unwrap();
//! assert_eq!(canon.node_count, 3);
//! assert_eq!(canon.elements.len(), 3);
//! ```

pub mod canonicalize;
pub mod error;
pub mod id;
pub mod mna;
pub mod schematic;
pub mod tree;

pub use canonicalize::{canonicalize, CanonCircuit, CanonElement};
pub use error::{Error, Result};
pub use id::{Uid, UidGen};
pub use schematic::{Edge, EdgeKind, Schematic, Vertex};
pub use tree::{Atom, Branch, Device, Expr};
