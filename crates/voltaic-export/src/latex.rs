//! LaTeX solution export.
//!
//! One block per reduction level (circuit picture plus the level's
//! formulas), followed - when sources are present - by per-source
//! superposition tables, the summed totals, and the per-resistor
//! voltages.

use std::fmt::Write as _;

use voltaic::{ReportDevice, SolveReport};
use voltaic_core::tree::Device;
use voltaic_core::CanonCircuit;
use voltaic_reduce::ReductionTrace;

use crate::circuitikz::{render, RenderOptions};

/// A solved circuit paired with the canonical form its indices refer to.
#[derive(Debug, Clone, Copy)]
pub struct SolvedCircuit<'a> {
    pub canon: &'a CanonCircuit,
    pub report: &'a SolveReport,
}

/// Render the full solution document body.
pub fn render_solution(trace: &ReductionTrace, solved: Option<SolvedCircuit<'_>>) -> String {
    let mut out = String::new();

    for level in &trace.levels {
        let _ = writeln!(out, "\\subsection*{{Level {}}}", level.index);
        let labels = voltaic::label_tree_atoms(&level.tree, true).unwrap_or_default();
        out.push_str("\\begin{center}\n");
        out.push_str(&render(&level.tree, &labels, &RenderOptions::default()));
        out.push_str("\\end{center}\n");
        for reduction in &level.reductions {
            let _ = writeln!(out, "\\[ {} \\]", reduction.formula);
        }
    }

    if let Some(error) = &trace.error {
        let _ = writeln!(out, "\\emph{{Reduction stopped: {error}.}}\n");
    }

    if let Some(solved) = solved {
        out.push_str(&render_superposition(solved));
    }

    out
}

fn render_superposition(solved: SolvedCircuit<'_>) -> String {
    let SolvedCircuit { canon, report } = solved;
    let sup = &report.superposition;
    let mut out = String::new();

    out.push_str("\\subsection*{Superposition}\n");
    for case in &sup.cases {
        let name = case.source.name.replace('_', "\\_");
        let _ = writeln!(out, "\\paragraph{{Source ${name}$ active}}");
        out.push_str("\\begin{tabular}{lrr}\n");
        out.push_str("component & $I$ (A) & $U$ (V) \\\\\n\\hline\n");
        for row in &report.rows {
            let ReportDevice::Resistor { ohms } = row.device else {
                continue;
            };
            let element = canon.elements.iter().find(|el| el.id == row.id);
            let Some(element) = element else { continue };
            let current = case.solution.voltage_between(element.a, element.b) / ohms;
            let _ = writeln!(
                out,
                "${}$ & {} & {} \\\\",
                row.label,
                fmt(current),
                fmt(current * ohms)
            );
        }
        out.push_str("\\end{tabular}\n");
    }

    out.push_str("\\paragraph{Totals}\n");
    out.push_str("\\begin{tabular}{lrr}\n");
    out.push_str("component & $I$ (A) & $U$ (V) \\\\\n\\hline\n");
    for row in &report.rows {
        let _ = writeln!(
            out,
            "${}$ & {} & {} \\\\",
            row.label,
            fmt(row.current),
            fmt(row.voltage)
        );
    }
    if let Some(i) = report.external_supply_current {
        let _ = writeln!(out, "$U_s$ & {} & \\\\", fmt(i));
    }
    out.push_str("\\end{tabular}\n");

    out
}

/// Equivalent-resistance headline for a completed trace, when the tree
/// collapsed to one resistor.
pub fn render_equivalent(trace: &ReductionTrace) -> Option<String> {
    let atom = trace.final_tree().as_atom()?;
    match atom.device {
        Device::Resistor { ohms } => Some(format!(
            "\\[ R_{{eq}} = {}\\,\\Omega \\]\n",
            fmt(ohms)
        )),
        _ => None,
    }
}

fn fmt(value: f64) -> String {
    // Shortest round-trip representation keeps the tables readable.
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use voltaic::{SolveOptions, Schematic, EdgeKind};

    fn divider() -> Schematic {
        let mut sch = Schematic::new();
        let plus = sch.add_vertex(0.0, 0.0);
        let mid = sch.add_vertex(1.0, 0.0);
        let minus = sch.add_vertex(2.0, 0.0);
        sch.add_edge(plus, mid, EdgeKind::Resistor { ohms: 100.0 });
        sch.add_edge(mid, minus, EdgeKind::Resistor { ohms: 200.0 });
        sch.set_terminals(plus, minus);
        sch
    }

    #[test]
    fn test_levels_and_formulas_are_rendered() {
        let sch = divider();
        let trace = voltaic::reduce(&sch).unwrap();
        let text = render_solution(&trace, None);

        assert!(text.contains("\\subsection*{Level 0}"));
        assert!(text.contains("\\subsection*{Level 1}"));
        assert!(text.contains("R_{1.1} = 100 + 200 = 300"));
        assert!(text.contains("\\begin{circuitikz}"));
    }

    #[test]
    fn test_superposition_tables_follow_levels() {
        let sch = divider();
        let trace = voltaic::reduce(&sch).unwrap();
        let canon = voltaic::canonicalize(&sch).unwrap();
        let report = voltaic::solve(
            &sch,
            &SolveOptions {
                external_supply_volts: Some(12.0),
            },
        )
        .unwrap();

        let text = render_solution(
            &trace,
            Some(SolvedCircuit {
                canon: &canon,
                report: &report,
            }),
        );

        assert!(text.contains("\\subsection*{Superposition}"));
        assert!(text.contains("external\\_supply"));
        assert!(text.contains("\\paragraph{Totals}"));
        assert!(text.contains("$R1$ & 0.04 & 4 \\\\"));
    }

    #[test]
    fn test_equivalent_headline() {
        let sch = divider();
        let trace = voltaic::reduce(&sch).unwrap();
        let headline = render_equivalent(&trace).unwrap();
        assert_eq!(headline, "\\[ R_{eq} = 300\\,\\Omega \\]\n");
    }
}
