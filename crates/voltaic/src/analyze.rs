//! End-to-end analysis: canonicalize, label, assemble, superpose.

use indexmap::IndexMap;

use voltaic_core::canonicalize::canonicalize;
use voltaic_core::mna::MnaElement;
use voltaic_core::tree::Device;
use voltaic_core::{CanonCircuit, Schematic, Uid};
use voltaic_reduce::{reduce_graph, trace, ReductionTrace};
use voltaic_solver::{solve_superposition, Superposition};

use crate::error::Result;
use crate::label::assign_indices;

/// Options for the end-to-end solve.
#[derive(Debug, Clone, Default)]
pub struct SolveOptions {
    /// Inject a voltage source of this many volts between + and -,
    /// with the reserved [`Uid::EXTERNAL_SUPPLY`] id.
    pub external_supply_volts: Option<f64>,
}

/// What a report row measures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportDevice {
    Resistor { ohms: f64 },
    Ammeter,
}

/// Solved quantities for one resistor or ammeter.
///
/// `current` follows the element's a -> b orientation as recorded at
/// canonicalization; for ammeters it is the auxiliary branch current of
/// the zero-volt shim source.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub id: Uid,
    /// Presentation label, e.g. `R1` / `A2`.
    pub label: String,
    pub device: ReportDevice,
    pub current: f64,
    pub voltage: f64,
}

/// The end-to-end solve result.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    /// One row per resistor and ammeter, in element order.
    pub rows: Vec<ReportRow>,
    /// The per-source decomposition behind the totals.
    pub superposition: Superposition,
    /// Branch current of the injected external supply, if one was added.
    pub external_supply_current: Option<f64>,
}

/// Canonicalize and solve an editor-form circuit.
pub fn solve(schematic: &Schematic, options: &SolveOptions) -> Result<SolveReport> {
    let canon = canonicalize(schematic)?;
    solve_canonical(&canon, options)
}

/// Solve an already-canonicalized circuit.
///
/// The - terminal is the ground of the MNA solve. Ammeters become
/// non-independent zero-volt sources so their branch current is
/// recoverable.
pub fn solve_canonical(canon: &CanonCircuit, options: &SolveOptions) -> Result<SolveReport> {
    let r_indices = assign_indices(
        'R',
        canon.elements.iter().filter_map(|el| match el.device {
            Device::Resistor { .. } => Some((el.id, el.label.as_deref())),
            _ => None,
        }),
    )?;
    let a_indices = assign_indices(
        'A',
        canon.elements.iter().filter_map(|el| match el.device {
            Device::Ammeter => Some((el.id, el.label.as_deref())),
            _ => None,
        }),
    )?;

    let mut elements = Vec::with_capacity(canon.elements.len() + 1);
    for el in &canon.elements {
        let element = match el.device {
            Device::Resistor { ohms } => MnaElement::Resistor {
                id: el.id,
                label: el.label.clone(),
                a: el.a,
                b: el.b,
                ohms,
            },
            Device::Ammeter => MnaElement::VSource {
                id: el.id,
                label: el.label.clone(),
                plus: el.a,
                minus: el.b,
                volts: 0.0,
                independent: false,
            },
            Device::VoltageSource { volts } => MnaElement::VSource {
                id: el.id,
                label: el.label.clone(),
                plus: el.a,
                minus: el.b,
                volts,
                independent: true,
            },
            Device::CurrentSource { amps } => MnaElement::ISource {
                id: el.id,
                label: el.label.clone(),
                from: el.a,
                to: el.b,
                amps,
            },
        };
        elements.push(element);
    }

    if let Some(volts) = options.external_supply_volts {
        elements.push(MnaElement::VSource {
            id: Uid::EXTERNAL_SUPPLY,
            label: None,
            plus: canon.plus,
            minus: canon.minus,
            volts,
            independent: true,
        });
    }

    let superposition = solve_superposition(&elements, canon.node_count, canon.minus)?;

    let mut rows = Vec::new();
    for el in &canon.elements {
        match el.device {
            Device::Resistor { ohms } => rows.push(ReportRow {
                id: el.id,
                label: format!("R{}", r_indices[&el.id]),
                device: ReportDevice::Resistor { ohms },
                current: superposition.resistor_currents[&el.id],
                voltage: superposition.resistor_voltages[&el.id],
            }),
            Device::Ammeter => rows.push(ReportRow {
                id: el.id,
                label: format!("A{}", a_indices[&el.id]),
                device: ReportDevice::Ammeter,
                current: superposition.total.source_current(el.id),
                voltage: 0.0,
            }),
            _ => {}
        }
    }

    let external_supply_current = options
        .external_supply_volts
        .map(|_| superposition.total.source_current(Uid::EXTERNAL_SUPPLY));

    Ok(SolveReport {
        rows,
        superposition,
        external_supply_current,
    })
}

/// Canonicalize and reduce an editor-form circuit to its trace.
pub fn reduce(schematic: &Schematic) -> Result<ReductionTrace> {
    let canon = canonicalize(schematic)?;
    let mut ids = schematic.fresh_uids();
    let tree = reduce_graph(&canon, &mut ids)?;
    Ok(trace(&tree, &mut ids))
}

/// Reduce an already-canonicalized circuit.
pub fn reduce_canonical(canon: &CanonCircuit) -> Result<ReductionTrace> {
    let mut ids = canon.fresh_uids();
    let tree = reduce_graph(canon, &mut ids)?;
    Ok(trace(&tree, &mut ids))
}

/// Presentation labels for the atoms of a tree, using the same claiming
/// rules as the solve. Generated equivalents are excluded unless
/// `include_generated` is set; they keep their `level.counter` names.
pub fn label_tree_atoms(
    tree: &voltaic_core::Expr,
    include_generated: bool,
) -> Result<IndexMap<Uid, String>> {
    let atoms = tree.atoms();

    let r_indices = assign_indices(
        'R',
        atoms.iter().filter_map(|a| match a.device {
            Device::Resistor { .. } if !a.generated => Some((a.id, a.name.as_deref())),
            _ => None,
        }),
    )?;
    let a_indices = assign_indices(
        'A',
        atoms.iter().filter_map(|a| match a.device {
            Device::Ammeter => Some((a.id, a.name.as_deref())),
            _ => None,
        }),
    )?;

    let mut out = IndexMap::new();
    for atom in atoms {
        if atom.generated {
            if include_generated {
                let name = atom.name.clone().unwrap_or_else(|| atom.id.to_string());
                out.insert(atom.id, format!("R_{{{name}}}"));
            }
            continue;
        }
        match atom.device {
            Device::Resistor { .. } => {
                out.insert(atom.id, format!("R{}", r_indices[&atom.id]));
            }
            Device::Ammeter => {
                out.insert(atom.id, format!("A{}", a_indices[&atom.id]));
            }
            Device::VoltageSource { .. } | Device::CurrentSource { .. } => {
                let name = atom.name.clone().unwrap_or_else(|| atom.id.to_string());
                out.insert(atom.id, name);
            }
        }
    }
    Ok(out)
}
