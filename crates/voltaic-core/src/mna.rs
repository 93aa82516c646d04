//! Modified nodal analysis: the dense linear system and its assembly.
//!
//! The system `Ax = b` has one unknown per non-ground node potential
//! followed by one auxiliary branch current per voltage source. Ideal
//! ammeters enter as zero-volt sources so their branch current is
//! recoverable from the augmented unknowns.

use std::cmp::Ordering;

use nalgebra::{DMatrix, DVector};

use crate::id::Uid;

/// An element of the flattened MNA list, over non-negative node indices.
#[derive(Debug, Clone, PartialEq)]
pub enum MnaElement {
    Resistor {
        id: Uid,
        label: Option<String>,
        a: usize,
        b: usize,
        ohms: f64,
    },
    /// `independent: false` marks bookkeeping sources (ammeter shims)
    /// that superposition must not enumerate.
    VSource {
        id: Uid,
        label: Option<String>,
        plus: usize,
        minus: usize,
        volts: f64,
        independent: bool,
    },
    ISource {
        id: Uid,
        label: Option<String>,
        from: usize,
        to: usize,
        amps: f64,
    },
}

impl MnaElement {
    pub fn id(&self) -> Uid {
        match self {
            MnaElement::Resistor { id, .. }
            | MnaElement::VSource { id, .. }
            | MnaElement::ISource { id, .. } => *id,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            MnaElement::Resistor { label, .. }
            | MnaElement::VSource { label, .. }
            | MnaElement::ISource { label, .. } => label.as_deref(),
        }
    }
}

/// Map a node index to its unknown column, eliminating the ground row.
pub fn unknown_index(node: usize, ground: usize) -> Option<usize> {
    match node.cmp(&ground) {
        Ordering::Less => Some(node),
        Ordering::Equal => None,
        Ordering::Greater => Some(node - 1),
    }
}

/// MNA system: Ax = b.
/// A is the conductance matrix extended with the voltage-source coupling
/// blocks, x holds node potentials then branch currents, and b holds
/// current-source injections then source voltages.
#[derive(Debug, Clone)]
pub struct MnaSystem {
    pub matrix: DMatrix<f64>,
    pub rhs: DVector<f64>,
    /// Number of node-potential unknowns (nodes excluding ground).
    pub num_unknown_nodes: usize,
    /// Number of voltage sources (auxiliary current unknowns).
    pub num_vsources: usize,
}

impl MnaSystem {
    /// Create a zeroed system with the given dimensions.
    pub fn new(num_unknown_nodes: usize, num_vsources: usize) -> Self {
        let size = num_unknown_nodes + num_vsources;
        Self {
            matrix: DMatrix::zeros(size, size),
            rhs: DVector::zeros(size),
            num_unknown_nodes,
            num_vsources,
        }
    }

    /// Total size of the system (node unknowns + current unknowns).
    pub fn size(&self) -> usize {
        self.num_unknown_nodes + self.num_vsources
    }

    /// Stamp a conductance between two unknown indices (None = ground).
    ///
    /// For a conductance G between i and j:
    /// - A[i,i] += G, A[j,j] += G
    /// - A[i,j] -= G, A[j,i] -= G
    pub fn stamp_conductance(&mut self, node_i: Option<usize>, node_j: Option<usize>, g: f64) {
        if let Some(i) = node_i {
            self.matrix[(i, i)] += g;
        }
        if let Some(j) = node_j {
            self.matrix[(j, j)] += g;
        }
        if let (Some(i), Some(j)) = (node_i, node_j) {
            self.matrix[(i, j)] -= g;
            self.matrix[(j, i)] -= g;
        }
    }

    /// Stamp a current source driving `current` amps from i to j.
    pub fn stamp_current_source(
        &mut self,
        node_i: Option<usize>,
        node_j: Option<usize>,
        current: f64,
    ) {
        if let Some(i) = node_i {
            self.rhs[i] -= current;
        }
        if let Some(j) = node_j {
            self.rhs[j] += current;
        }
    }

    /// Stamp voltage source number `vsource_idx` between `node_pos` (+)
    /// and `node_neg` (-): the +/-1 coupling between the node rows and
    /// the current column, plus the constraint row V+ - V- = volts.
    pub fn stamp_voltage_source(
        &mut self,
        node_pos: Option<usize>,
        node_neg: Option<usize>,
        vsource_idx: usize,
        volts: f64,
    ) {
        let row = self.num_unknown_nodes + vsource_idx;

        if let Some(i) = node_pos {
            self.matrix[(i, row)] += 1.0;
            self.matrix[(row, i)] += 1.0;
        }
        if let Some(j) = node_neg {
            self.matrix[(j, row)] -= 1.0;
            self.matrix[(row, j)] -= 1.0;
        }

        self.rhs[row] = volts;
    }
}

/// Assemble the dense system for `elements` over `node_count` nodes with
/// the given ground node. Voltage-source current unknowns are assigned
/// in element order.
pub fn assemble(elements: &[MnaElement], node_count: usize, ground: usize) -> MnaSystem {
    debug_assert!(ground < node_count);

    let num_vsources = elements
        .iter()
        .filter(|e| matches!(e, MnaElement::VSource { .. }))
        .count();
    let mut mna = MnaSystem::new(node_count - 1, num_vsources);

    let mut vsource_idx = 0usize;
    for element in elements {
        match *element {
            MnaElement::Resistor { a, b, ohms, .. } => {
                mna.stamp_conductance(
                    unknown_index(a, ground),
                    unknown_index(b, ground),
                    1.0 / ohms,
                );
            }
            MnaElement::VSource {
                plus, minus, volts, ..
            } => {
                mna.stamp_voltage_source(
                    unknown_index(plus, ground),
                    unknown_index(minus, ground),
                    vsource_idx,
                    volts,
                );
                vsource_idx += 1;
            }
            MnaElement::ISource { from, to, amps, .. } => {
                mna.stamp_current_source(
                    unknown_index(from, ground),
                    unknown_index(to, ground),
                    amps,
                );
            }
        }
    }

    mna
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_index_eliminates_ground() {
        assert_eq!(unknown_index(0, 2), Some(0));
        assert_eq!(unknown_index(1, 2), Some(1));
        assert_eq!(unknown_index(2, 2), None);
        assert_eq!(unknown_index(3, 2), Some(2));
    }

    #[test]
    fn test_stamp_conductance() {
        let mut sys = MnaSystem::new(2, 0);

        sys.stamp_conductance(Some(0), Some(1), 1.0);

        assert_eq!(sys.matrix[(0, 0)], 1.0);
        assert_eq!(sys.matrix[(1, 1)], 1.0);
        assert_eq!(sys.matrix[(0, 1)], -1.0);
        assert_eq!(sys.matrix[(1, 0)], -1.0);
    }

    #[test]
    fn test_stamp_conductance_to_ground() {
        let mut sys = MnaSystem::new(2, 0);

        sys.stamp_conductance(Some(0), None, 1.0);

        assert_eq!(sys.matrix[(0, 0)], 1.0);
        assert_eq!(sys.matrix[(1, 1)], 0.0);
    }

    #[test]
    fn test_stamp_current_source() {
        let mut sys = MnaSystem::new(2, 0);

        sys.stamp_current_source(None, Some(0), 1.0);

        assert_eq!(sys.rhs[0], 1.0);
        assert_eq!(sys.rhs[1], 0.0);
    }

    #[test]
    fn test_stamp_voltage_source() {
        let mut sys = MnaSystem::new(2, 1);

        sys.stamp_voltage_source(Some(0), None, 0, 5.0);

        assert_eq!(sys.matrix[(0, 2)], 1.0);
        assert_eq!(sys.matrix[(2, 0)], 1.0);
        assert_eq!(sys.rhs[2], 5.0);
    }

    #[test]
    fn test_assemble_voltage_divider() {
        // V1 = 10V from node 0 to ground (node 2), R1 = R2 = 1k:
        // node 0 -- R1 -- node 1 -- R2 -- node 2 (ground)
        let elements = vec![
            MnaElement::VSource {
                id: Uid::new(0),
                label: None,
                plus: 0,
                minus: 2,
                volts: 10.0,
                independent: true,
            },
            MnaElement::Resistor {
                id: Uid::new(1),
                label: None,
                a: 0,
                b: 1,
                ohms: 1000.0,
            },
            MnaElement::Resistor {
                id: Uid::new(2),
                label: None,
                a: 1,
                b: 2,
                ohms: 1000.0,
            },
        ];

        let mna = assemble(&elements, 3, 2);
        assert_eq!(mna.size(), 3);
        // Constraint row: V0 = 10.
        assert_eq!(mna.matrix[(2, 0)], 1.0);
        assert_eq!(mna.rhs[2], 10.0);
        // Node 1 sees both conductances.
        assert!((mna.matrix[(1, 1)] - 0.002).abs() < 1e-12);
    }
}
