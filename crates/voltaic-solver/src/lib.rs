//! Linear solving for Voltaic.
//!
//! This crate turns an assembled element list into solved electrical
//! quantities:
//!
//! - [`solve_dense`](linear::solve_dense) - Gaussian elimination with
//!   partial pivoting
//! - [`solve_dc`](dc::solve_dc) - one DC operating point with node
//!   potentials and voltage-source branch currents
//! - [`solve_superposition`](superposition::solve_superposition) - one
//!   case per independent source, with linear sums
//!
//! # Example
//!
//! ```rust
//! use voltaic_core::mna::MnaElement;
//! use voltaic_core::Uid;
//! use voltaic_solver::solve_dc;
//!
//! // Voltage divider: V1 = 10V, R1 = R2 = 1k, ground at node 2.
//! let elements = vec![
//!     MnaElement::VSource {
//!         id: Uid::new(0), label: None,
//!         plus: 0, minus: 2, volts: 10.0, independent: true,
//!     },
//!     MnaElement::Resistor { id: Uid::new(1), label: None, a: 0, b: 1, ohms: 1e3 },
//!     MnaElement::Resistor { id: Uid::new(2), label: None, a: 1, b: 2, ohms: 1e3 },
//! ];
//!
//! let solution = solve_dc(&elements, 3, 2).unwrap();
//! assert!((solution.voltage(1) - 5.0).abs() < 1e-9);
//! ```

pub mod dc;
pub mod error;
pub mod linear;
pub mod superposition;

pub use dc::{resistor_current, solve_dc, DcSolution};
pub use error::{Error, Result};
pub use linear::solve_dense;
pub use superposition::{
    independent_sources, solve_superposition, SourceCase, SourceInfo, SourceKind, Superposition,
};
