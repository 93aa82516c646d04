//! Exporters for Voltaic.
//!
//! - [`json`] - the persisted Circuit-JSON tree form, with legacy
//!   migration on import
//! - [`circuitikz`] - wire-level CircuitikZ rendering of a tree
//! - [`latex`] - the per-level solution document
//!
//! Everything here is presentation: none of it feeds back into the
//! analysis pipeline.

pub mod circuitikz;
pub mod error;
pub mod json;
pub mod latex;

pub use circuitikz::{layout, render, ComponentKind, Drawable, Point, RenderOptions};
pub use error::{Error, Result};
pub use json::{from_json, to_json, CircuitFile, Layout, Route};
pub use latex::{render_equivalent, render_solution, SolvedCircuit};
