//! DC solution of an assembled element list.

use indexmap::IndexMap;

use voltaic_core::mna::{assemble, unknown_index, MnaElement};
use voltaic_core::Uid;

use crate::error::Result;
use crate::linear::solve_dense;

/// Result of one DC solve.
///
/// Sign convention for source currents: positive current flows from the
/// + node through the source to the - node.
#[derive(Debug, Clone, PartialEq)]
pub struct DcSolution {
    /// Node potentials indexed by node, with the ground node at 0.
    pub potentials: Vec<f64>,
    /// Branch current per voltage source, in element order.
    pub source_currents: IndexMap<Uid, f64>,
    /// The node whose potential was fixed to 0.
    pub ground: usize,
}

impl DcSolution {
    /// Potential of a node.
    pub fn voltage(&self, node: usize) -> f64 {
        self.potentials.get(node).copied().unwrap_or(0.0)
    }

    /// Potential difference between two nodes.
    pub fn voltage_between(&self, a: usize, b: usize) -> f64 {
        self.voltage(a) - self.voltage(b)
    }

    /// Branch current of a voltage source (0 for unknown ids).
    pub fn source_current(&self, id: Uid) -> f64 {
        self.source_currents.get(&id).copied().unwrap_or(0.0)
    }
}

/// Current through a resistor element, a -> b.
pub fn resistor_current(solution: &DcSolution, element: &MnaElement) -> Option<f64> {
    match *element {
        MnaElement::Resistor { a, b, ohms, .. } => {
            Some(solution.voltage_between(a, b) / ohms)
        }
        _ => None,
    }
}

/// Assemble and solve one DC operating point.
pub fn solve_dc(elements: &[MnaElement], node_count: usize, ground: usize) -> Result<DcSolution> {
    let mna = assemble(elements, node_count, ground);
    let x = solve_dense(&mna.matrix, &mna.rhs)?;

    let mut potentials = vec![0.0; node_count];
    for (node, slot) in potentials.iter_mut().enumerate() {
        if let Some(i) = unknown_index(node, ground) {
            *slot = x[i];
        }
    }

    let mut source_currents = IndexMap::new();
    let mut aux = mna.num_unknown_nodes;
    for element in elements {
        if let MnaElement::VSource { id, .. } = element {
            source_currents.insert(*id, x[aux]);
            aux += 1;
        }
    }

    Ok(DcSolution {
        potentials,
        source_currents,
        ground,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resistor(id: u32, a: usize, b: usize, ohms: f64) -> MnaElement {
        MnaElement::Resistor {
            id: Uid::new(id),
            label: None,
            a,
            b,
            ohms,
        }
    }

    fn vsource(id: u32, plus: usize, minus: usize, volts: f64) -> MnaElement {
        MnaElement::VSource {
            id: Uid::new(id),
            label: None,
            plus,
            minus,
            volts,
            independent: true,
        }
    }

    fn isource(id: u32, from: usize, to: usize, amps: f64) -> MnaElement {
        MnaElement::ISource {
            id: Uid::new(id),
            label: None,
            from,
            to,
            amps,
        }
    }

    /// Voltage divider:
    ///
    /// ```text
    ///   node0 --- R1 = 1k --- node1 --- R2 = 1k --- node2 (ground)
    ///     |                                           |
    ///     +--------------- V1 = 10V ------------------+
    /// ```
    #[test]
    fn test_voltage_divider() {
        let elements = vec![
            vsource(0, 0, 2, 10.0),
            resistor(1, 0, 1, 1000.0),
            resistor(2, 1, 2, 1000.0),
        ];

        let solution = solve_dc(&elements, 3, 2).unwrap();

        assert!((solution.voltage(0) - 10.0).abs() < 1e-10);
        assert!((solution.voltage(1) - 5.0).abs() < 1e-10);
        assert_eq!(solution.voltage(2), 0.0);

        // 5 mA circulates; through the source it flows - -> +, so the
        // reported + -> - branch current is negative.
        assert!((solution.source_current(Uid::new(0)) + 0.005).abs() < 1e-10);
    }

    /// Ground in the middle of the index range exercises the index
    /// remapping on both sides.
    #[test]
    fn test_ground_in_the_middle() {
        // node1 is ground; V1 = 6V from node0 to node1, R = 1k to node2,
        // R2 = 2k from node2 to ground.
        let elements = vec![
            vsource(0, 0, 1, 6.0),
            resistor(1, 0, 2, 1000.0),
            resistor(2, 2, 1, 2000.0),
        ];

        let solution = solve_dc(&elements, 3, 1).unwrap();

        assert!((solution.voltage(0) - 6.0).abs() < 1e-10);
        assert_eq!(solution.voltage(1), 0.0);
        assert!((solution.voltage(2) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_current_divider() {
        // 10 mA into node0, two 1k resistors to ground.
        let elements = vec![
            isource(0, 1, 0, 0.010),
            resistor(1, 0, 1, 1000.0),
            resistor(2, 0, 1, 1000.0),
        ];

        let solution = solve_dc(&elements, 2, 1).unwrap();

        assert!((solution.voltage(0) - 5.0).abs() < 1e-10);
        let i1 = resistor_current(&solution, &elements[1]).unwrap();
        assert!((i1 - 0.005).abs() < 1e-10);
    }

    #[test]
    fn test_ammeter_branch_current() {
        // V1 = 10V, R = 1k, ammeter in series (a zero-volt source).
        let elements = vec![
            vsource(0, 0, 2, 10.0),
            resistor(1, 0, 1, 1000.0),
            MnaElement::VSource {
                id: Uid::new(2),
                label: None,
                plus: 1,
                minus: 2,
                volts: 0.0,
                independent: false,
            },
        ];

        let solution = solve_dc(&elements, 3, 2).unwrap();

        // The ammeter sees the full loop current, + -> - through it.
        assert!((solution.source_current(Uid::new(2)) - 0.010).abs() < 1e-10);
        assert!((solution.voltage(1) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_floating_node_is_singular() {
        // node1 has no connection to the rest.
        let elements = vec![vsource(0, 0, 2, 5.0), resistor(1, 0, 2, 100.0)];

        assert!(solve_dc(&elements, 3, 2).is_err());
    }
}
