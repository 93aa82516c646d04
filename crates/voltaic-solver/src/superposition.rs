//! Per-independent-source decomposition by superposition.
//!
//! Each independent source gets one solve with every other independent
//! source deactivated (voltage sources to 0 V, current sources to 0 A;
//! zeroed voltage sources stay in the matrix so its structure is fixed
//! across cases). The case solutions and their linear sums are reported
//! together.

use indexmap::IndexMap;

use voltaic_core::mna::MnaElement;
use voltaic_core::Uid;

use crate::dc::{solve_dc, DcSolution};
use crate::error::{Error, Result};

/// What kind of source a superposition case activates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceKind {
    Voltage { volts: f64 },
    Current { amps: f64 },
}

/// An independent source, as enumerated in element order.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub id: Uid,
    /// Display name: the element's label, or `V<k>`/`I<k>` by position.
    pub name: String,
    pub kind: SourceKind,
}

/// The solve obtained with exactly one source active.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceCase {
    pub source: SourceInfo,
    pub solution: DcSolution,
}

/// Superposition decomposition: one case per independent source plus
/// the summed totals.
#[derive(Debug, Clone, PartialEq)]
pub struct Superposition {
    pub sources: Vec<SourceInfo>,
    pub cases: Vec<SourceCase>,
    /// Sum of all cases (equal to the single full solve).
    pub total: DcSolution,
    /// Summed current through each resistor, a -> b.
    pub resistor_currents: IndexMap<Uid, f64>,
    /// Summed voltage across each resistor, a - b.
    pub resistor_voltages: IndexMap<Uid, f64>,
}

/// Enumerate the independent sources of an element list, in order.
pub fn independent_sources(elements: &[MnaElement]) -> Vec<SourceInfo> {
    let mut sources = Vec::new();
    let mut num_v = 0usize;
    let mut num_i = 0usize;
    for element in elements {
        match element {
            MnaElement::VSource {
                id,
                label,
                volts,
                independent: true,
                ..
            } => {
                num_v += 1;
                sources.push(SourceInfo {
                    id: *id,
                    name: display_name(*id, label.as_deref(), 'V', num_v),
                    kind: SourceKind::Voltage { volts: *volts },
                });
            }
            MnaElement::ISource {
                id, label, amps, ..
            } => {
                num_i += 1;
                sources.push(SourceInfo {
                    id: *id,
                    name: display_name(*id, label.as_deref(), 'I', num_i),
                    kind: SourceKind::Current { amps: *amps },
                });
            }
            _ => {}
        }
    }
    sources
}

fn display_name(id: Uid, label: Option<&str>, prefix: char, ordinal: usize) -> String {
    if id == Uid::EXTERNAL_SUPPLY {
        return id.to_string();
    }
    match label {
        Some(label) => label.to_string(),
        None => format!("{prefix}{ordinal}"),
    }
}

/// Copy the element list with every independent source other than
/// `active` deactivated.
fn deactivate_others(elements: &[MnaElement], active: Uid) -> Vec<MnaElement> {
    elements
        .iter()
        .map(|element| match element {
            MnaElement::VSource {
                id,
                label,
                plus,
                minus,
                independent: true,
                ..
            } if *id != active => MnaElement::VSource {
                id: *id,
                label: label.clone(),
                plus: *plus,
                minus: *minus,
                volts: 0.0,
                independent: true,
            },
            MnaElement::ISource {
                id,
                label,
                from,
                to,
                ..
            } if *id != active => MnaElement::ISource {
                id: *id,
                label: label.clone(),
                from: *from,
                to: *to,
                amps: 0.0,
            },
            other => other.clone(),
        })
        .collect()
}

/// Run the superposition decomposition.
pub fn solve_superposition(
    elements: &[MnaElement],
    node_count: usize,
    ground: usize,
) -> Result<Superposition> {
    let sources = independent_sources(elements);
    if sources.is_empty() {
        return Err(Error::NoSources);
    }

    let mut cases = Vec::with_capacity(sources.len());
    for source in &sources {
        let deactivated = deactivate_others(elements, source.id);
        let solution = solve_dc(&deactivated, node_count, ground).map_err(|cause| {
            Error::SourceCase {
                source_name: source.name.clone(),
                cause: Box::new(cause),
            }
        })?;
        cases.push(SourceCase {
            source: source.clone(),
            solution,
        });
    }

    // Linear sums, in fixed element order.
    let mut potentials = vec![0.0; node_count];
    for case in &cases {
        for (node, slot) in potentials.iter_mut().enumerate() {
            *slot += case.solution.voltage(node);
        }
    }

    let mut source_currents = IndexMap::new();
    for element in elements {
        if let MnaElement::VSource { id, .. } = element {
            let sum = cases
                .iter()
                .map(|c| c.solution.source_current(*id))
                .sum::<f64>();
            source_currents.insert(*id, sum);
        }
    }

    let total = DcSolution {
        potentials,
        source_currents,
        ground,
    };

    let mut resistor_currents = IndexMap::new();
    let mut resistor_voltages = IndexMap::new();
    for element in elements {
        if let MnaElement::Resistor { id, a, b, ohms, .. } = element {
            let i = total.voltage_between(*a, *b) / ohms;
            resistor_currents.insert(*id, i);
            resistor_voltages.insert(*id, i * ohms);
        }
    }

    Ok(Superposition {
        sources,
        cases,
        total,
        resistor_currents,
        resistor_voltages,
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

    #[test]
    fn test_single_source_case_equals_total() {
        let elements = vec![
            vsource(0, 0, 2, 10.0),
            resistor(1, 0, 1, 1000.0),
            resistor(2, 1, 2, 1000.0),
        ];

        let sup = solve_superposition(&elements, 3, 2).unwrap();

        assert_eq!(sup.sources.len(), 1);
        assert_eq!(sup.cases.len(), 1);
        for node in 0..3 {
            assert!(
                (sup.total.voltage(node) - sup.cases[0].solution.voltage(node)).abs() < 1e-12
            );
        }
    }

    /// Two sources driving a shared resistor:
    ///
    /// ```text
    ///   node0 --- R1 = 1k --- node1 --- R2 = 1k --- node2 (gnd)
    ///     |                     ^
    ///    V1 = 5V               I1 = 10mA (into node1)
    ///     |                     |
    ///   node2 ------------------+
    /// ```
    #[test]
    fn test_two_sources_sum_to_full_solve() {
        let elements = vec![
            vsource(0, 0, 2, 5.0),
            resistor(1, 0, 1, 1000.0),
            resistor(2, 1, 2, 1000.0),
            isource(3, 2, 1, 0.010),
        ];

        let sup = solve_superposition(&elements, 3, 2).unwrap();
        assert_eq!(sup.sources.len(), 2);
        assert_eq!(sup.sources[0].name, "V1");
        assert_eq!(sup.sources[1].name, "I1");

        let full = solve_dc(&elements, 3, 2).unwrap();
        for node in 0..3 {
            let sum = sup.total.voltage(node);
            let reference = full.voltage(node);
            assert!(
                (sum - reference).abs() <= 1e-9 * reference.abs().max(1.0),
                "node {node}: superposed {sum} vs full {reference}"
            );
        }

        // And the per-resistor sums match the full solve.
        for element in &elements {
            if let MnaElement::Resistor { id, .. } = element {
                let i_sum = sup.resistor_currents[id];
                let i_full = crate::dc::resistor_current(&full, element).unwrap();
                assert!((i_sum - i_full).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_deactivated_voltage_source_stays_in_matrix() {
        // With V2 deactivated the structure must not change: its branch
        // still carries the short-circuit current.
        let elements = vec![
            vsource(0, 0, 2, 10.0),
            resistor(1, 0, 1, 1000.0),
            vsource(2, 1, 2, 3.0),
        ];

        let sup = solve_superposition(&elements, 3, 2).unwrap();
        let case_v1 = &sup.cases[0];
        // V2 zeroed: node1 pinned to ground, so R sees all 10 V.
        assert!((case_v1.solution.voltage(1) - 0.0).abs() < 1e-10);
        assert!(
            (case_v1.solution.source_current(Uid::new(2)) - 0.010).abs() < 1e-10
        );
    }

    #[test]
    fn test_no_sources_is_an_error() {
        let elements = vec![resistor(1, 0, 1, 1000.0)];
        assert_eq!(
            solve_superposition(&elements, 2, 1),
            Err(Error::NoSources)
        );
    }

    #[test]
    fn test_failing_case_is_annotated() {
        // Floating node2 makes every case singular.
        let elements = vec![vsource(0, 0, 1, 5.0), resistor(1, 0, 1, 100.0)];
        let result = solve_superposition(&elements, 3, 1);
        match result {
            Err(Error::SourceCase { source_name, cause }) => {
                assert_eq!(source_name, "V1");
                assert_eq!(*cause, Error::Singular);
            }
            other => panic!("expected SourceCase error, got {other:?}"),
        }
    }

    #[test]
    fn test_non_independent_sources_are_not_enumerated() {
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

        let sup = solve_superposition(&elements, 3, 2).unwrap();
        assert_eq!(sup.sources.len(), 1);
        // The ammeter shim still reports its summed branch current.
        assert!((sup.total.source_current(Uid::new(2)) - 0.010).abs() < 1e-10);
    }
}
