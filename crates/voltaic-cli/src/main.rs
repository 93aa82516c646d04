//! Voltaic command-line interface.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use voltaic::{reduce_canonical, solve_canonical, SolveOptions, SolveReport};
use voltaic_export::{from_json, render_solution, SolvedCircuit};
use voltaic_reduce::{tree_to_graph, ReductionTrace};

#[derive(Parser)]
#[command(name = "voltaic")]
#[command(about = "Series/parallel reduction and DC analysis of circuit documents", long_about = None)]
#[command(version)]
struct Cli {
    /// Input circuit JSON file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Print the series/parallel reduction trace
    #[arg(short, long)]
    reduce: bool,

    /// Solve node potentials and branch currents
    #[arg(short, long)]
    solve: bool,

    /// Drive the circuit with an external supply of this many volts
    #[arg(long, value_name = "VOLTS")]
    supply: Option<f64>,

    /// Write a CircuitikZ rendering of the circuit to this path
    #[arg(long, value_name = "FILE")]
    tikz: Option<PathBuf>,

    /// Write the LaTeX solution document to this path
    #[arg(long, value_name = "FILE")]
    latex: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let file = from_json(&text)
        .with_context(|| format!("failed to parse {}", cli.input.display()))?;
    let canon = tree_to_graph(&file.to_expr()).context("circuit has no usable layout")?;

    let run_reduce = cli.reduce || cli.latex.is_some() || !cli.solve;
    let run_solve = cli.solve || cli.latex.is_some() || cli.supply.is_some();

    let trace = if run_reduce {
        let trace = reduce_canonical(&canon).context("reduction failed")?;
        print_trace(&trace);
        Some(trace)
    } else {
        None
    };

    let report = if run_solve {
        let options = SolveOptions {
            external_supply_volts: cli.supply,
        };
        match solve_canonical(&canon, &options) {
            Ok(report) => {
                print_report(&report);
                Some(report)
            }
            Err(err) if cli.latex.is_some() => {
                // The solution document can still carry the trace.
                eprintln!("solve skipped: {err}");
                None
            }
            Err(err) => return Err(anyhow::Error::new(err).context("solve failed")),
        }
    } else {
        None
    };

    if let Some(path) = &cli.tikz {
        let tree = file.to_expr();
        let labels = voltaic::label_tree_atoms(&tree, true).unwrap_or_default();
        let currents = report.as_ref().map(|report| {
            report
                .rows
                .iter()
                .map(|row| (row.id, row.current))
                .collect()
        });
        let picture = voltaic_export::render(
            &tree,
            &labels,
            &voltaic_export::RenderOptions { currents },
        );
        fs::write(path, picture)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {}", path.display());
    }

    if let Some(path) = &cli.latex {
        let trace = trace.as_ref().expect("trace implied by --latex");
        let solved = report.as_ref().map(|report| SolvedCircuit {
            canon: &canon,
            report,
        });
        let doc = render_solution(trace, solved);
        fs::write(path, doc).with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {}", path.display());
    }

    Ok(())
}

fn print_trace(trace: &ReductionTrace) {
    for level in &trace.levels {
        if level.index == 0 {
            println!("level 0: {} atoms", level.tree.atoms().len());
            continue;
        }
        println!("level {}:", level.index);
        for reduction in &level.reductions {
            println!("  {}", reduction.formula);
        }
    }
    match (&trace.error, trace.equivalent_ohms()) {
        (Some(error), _) => println!("reduction stopped: {error}"),
        (None, Some(ohms)) => println!("R_eq = {ohms} ohms"),
        (None, None) => println!("no further reductions"),
    }
}

fn print_report(report: &SolveReport) {
    println!("{:<8} {:>14} {:>14}", "element", "I (A)", "U (V)");
    for row in &report.rows {
        println!("{:<8} {:>14.6} {:>14.6}", row.label, row.current, row.voltage);
    }
    if let Some(i) = report.external_supply_current {
        println!("{:<8} {:>14.6}", "supply", i);
    }
    for case in &report.superposition.cases {
        println!("case {}: {} nodes solved", case.source.name, case.solution.potentials.len());
    }
}
