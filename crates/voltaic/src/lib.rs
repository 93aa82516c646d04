//! # Voltaic
//!
//! Analysis of small DC circuits edited as a labeled multigraph:
//!
//! - wire contraction into a canonical node/element form
//! - iterated series/parallel collapsing with a per-level reduction trace
//! - modified nodal analysis solved by partial-pivot Gaussian elimination
//! - a per-independent-source superposition decomposition
//!
//! The pipeline is pure and synchronous: every entry point maps a value
//! to a value, owns no state, and is deterministic for equal inputs.
//!
//! ## Quick start
//!
//! ```rust
//! use voltaic::prelude::*;
//!
//! // Two series resistors between the + and - terminals.
//! let mut sch = Schematic::new();
//! let plus = sch.add_vertex(0.0, 0.0);
//! let mid = sch.add_vertex(1.0, 0.0);
//! let minus = sch.add_vertex(2.0, 0.0);
//! sch.add_edge(plus, mid, EdgeKind::Resistor { ohms: 100.0 });
//! sch.add_edge(mid, minus, EdgeKind::Resistor { ohms: 200.0 });
//! sch.set_terminals(plus, minus);
//!
//! let trace = voltaic::reduce(&sch).unwrap();
//! assert_eq!(trace.equivalent_ohms(), Some(300.0));
//!
//! // Drive the network with a 12 V external supply.
//! let options = SolveOptions { external_supply_volts: Some(12.0) };
//! let report = voltaic::solve(&sch, &options).unwrap();
//! assert!((report.rows[0].current - 0.04).abs() < 1e-9);
//! ```

pub mod analyze;
pub mod error;
pub mod label;

// Re-export the pipeline crates.
pub use voltaic_core as core;
pub use voltaic_reduce as reduction;
pub use voltaic_solver as solver;

pub use analyze::{
    label_tree_atoms, reduce, reduce_canonical, solve, solve_canonical, ReportDevice, ReportRow,
    SolveOptions, SolveReport,
};
pub use error::{Error, Result};
pub use label::{assign_indices, LabelError};

// Convenient re-exports from voltaic-core.
pub use voltaic_core::{
    canonicalize, Atom, Branch, CanonCircuit, CanonElement, Device, Edge, EdgeKind, Expr,
    Schematic, Uid, UidGen, Vertex,
};

// Convenient re-exports from voltaic-reduce.
pub use voltaic_reduce::{
    graph_to_tree, reduce_graph, tree_to_graph, Reduction, ReductionKind, ReductionTrace,
    TraceLevel,
};

// Convenient re-exports from voltaic-solver.
pub use voltaic_solver::{
    independent_sources, solve_dc, solve_superposition, DcSolution, SourceCase, SourceInfo,
    SourceKind, Superposition,
};

/// Prelude module containing the commonly used types and entry points.
///
/// ```rust
/// use voltaic::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        canonicalize, reduce, solve, CanonCircuit, DcSolution, Device, EdgeKind, Expr,
        ReductionTrace, ReportRow, Schematic, SolveOptions, SolveReport, Superposition, Uid,
    };
}
