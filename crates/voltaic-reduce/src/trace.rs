//! Deepest-first reduction trace.
//!
//! Level 0 is the untouched tree. Each subsequent level collapses every
//! candidate at the current deepest depth into a generated equivalent
//! resistor, recording the arithmetic that produced it. The walk stops
//! when no reducible subtree remains.
//!
//! Candidates are:
//! - a run of >= 2 consecutive resistive atoms inside a series list,
//! - a pure-atomic series block,
//! - a parallel block whose branches are all single resistive atoms.
//!
//! Ammeters count as 0 ohms in series. A series run summing to 0 ohms,
//! a 0-ohm parallel branch, or an ammeter-only parallel branch is a
//! short and blocks the reduction.

use voltaic_core::tree::{Atom, Branch, Device, Expr};
use voltaic_core::UidGen;

use crate::error::{Error, Result};

/// Hard bound on trace levels.
const LEVEL_LIMIT: usize = 50;

/// What kind of collapse a reduction performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReductionKind {
    Series,
    Parallel,
}

/// One collapse performed within a level.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub kind: ReductionKind,
    /// Nesting depth of the collapsed block, from the root.
    pub depth: usize,
    /// Display name of the generated equivalent (`level.counter`).
    pub name: String,
    /// Equivalent resistance.
    pub ohms: f64,
    /// Resistances that entered the collapse, in + -> - order.
    pub input_ohms: Vec<f64>,
    /// Presentation string, e.g. `R_{1.1} = 100 + 200 = 300`.
    pub formula: String,
}

/// The tree after applying one level of reductions.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceLevel {
    pub index: usize,
    pub tree: Expr,
    pub reductions: Vec<Reduction>,
}

/// Deepest-first reduction history.
///
/// When a level fails (a short, or the level ceiling) the levels
/// computed so far are kept and `error` carries the failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionTrace {
    pub levels: Vec<TraceLevel>,
    pub error: Option<Error>,
}

impl ReductionTrace {
    /// The tree of the last completed level.
    pub fn final_tree(&self) -> &Expr {
        &self.levels.last().expect("level 0 always present").tree
    }

    /// Equivalent resistance, when the trace collapsed the whole tree
    /// to a single resistor.
    pub fn equivalent_ohms(&self) -> Option<f64> {
        match self.final_tree().as_atom()?.device {
            Device::Resistor { ohms } => Some(ohms),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Compute the reduction trace of a tree.
///
/// `ids` supplies ids for the generated equivalents and must not collide
/// with ids already present in the tree.
pub fn trace(tree: &Expr, ids: &mut UidGen) -> ReductionTrace {
    let mut levels = vec![TraceLevel {
        index: 0,
        tree: tree.clone(),
        reductions: Vec::new(),
    }];

    if has_empty_branch(tree) {
        return ReductionTrace {
            levels,
            error: Some(Error::EmptyBranch),
        };
    }

    let mut current = tree.clone();

    for index in 1..=LEVEL_LIMIT {
        let Some(target) = max_candidate_depth(&current, 0) else {
            return ReductionTrace {
                levels,
                error: None,
            };
        };

        let mut ctx = LevelCtx {
            level: index,
            target,
            counter: 0,
            reductions: Vec::new(),
            ids: &mut *ids,
        };
        match rebuild(&current, 0, &mut ctx) {
            Ok(next) => {
                let reductions = ctx.reductions;
                current = next;
                levels.push(TraceLevel {
                    index,
                    tree: current.clone(),
                    reductions,
                });
            }
            Err(error) => {
                return ReductionTrace {
                    levels,
                    error: Some(error),
                }
            }
        }
    }

    ReductionTrace {
        levels,
        error: Some(Error::LimitReached),
    }
}

/// A branch with no items is a wire between the parallel block's
/// endpoints, which shorts it.
fn has_empty_branch(expr: &Expr) -> bool {
    match expr {
        Expr::Atom(_) => false,
        Expr::Series(children) => children.iter().any(has_empty_branch),
        Expr::Parallel(branches) => branches
            .iter()
            .any(|br| br.items.is_empty() || br.items.iter().any(has_empty_branch)),
    }
}

/// An atom that can enter a resistive collapse.
fn resistive(expr: &Expr) -> Option<&Atom> {
    let atom = expr.as_atom()?;
    atom.device.ohms().map(|_| atom)
}

/// Whether a list of items contains a run of >= 2 consecutive resistive
/// atoms.
fn has_resistive_run(items: &[Expr]) -> bool {
    let mut run = 0usize;
    for item in items {
        if resistive(item).is_some() {
            run += 1;
            if run >= 2 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

/// Whether every branch is a single resistive atom (with >= 2 branches).
fn is_collapsible_parallel(branches: &[Branch]) -> bool {
    branches.len() >= 2
        && branches
            .iter()
            .all(|br| br.items.len() == 1 && resistive(&br.items[0]).is_some())
}

/// Deepest candidate depth anywhere in the tree. A series list (or a
/// branch run, which is a series one level below its parallel block)
/// is a candidate at its own depth; children are one level deeper.
fn max_candidate_depth(expr: &Expr, depth: usize) -> Option<usize> {
    match expr {
        Expr::Atom(_) => None,
        Expr::Series(children) => {
            let own = has_resistive_run(children).then_some(depth);
            children
                .iter()
                .filter_map(|c| max_candidate_depth(c, depth + 1))
                .chain(own)
                .max()
        }
        Expr::Parallel(branches) => {
            let own = is_collapsible_parallel(branches).then_some(depth);
            let inner = branches.iter().flat_map(|br| {
                let run = has_resistive_run(&br.items).then_some(depth + 1);
                br.items
                    .iter()
                    .filter_map(|c| max_candidate_depth(c, depth + 2))
                    .chain(run)
                    .collect::<Vec<_>>()
            });
            inner.chain(own).max()
        }
    }
}

struct LevelCtx<'a> {
    level: usize,
    target: usize,
    counter: usize,
    reductions: Vec<Reduction>,
    ids: &'a mut UidGen,
}

impl LevelCtx<'_> {
    fn next_name(&mut self) -> String {
        self.counter += 1;
        format!("{}.{}", self.level, self.counter)
    }

    fn collapse_series(&mut self, run: &[&Atom], depth: usize) -> Result<Atom> {
        let input_ohms: Vec<f64> = run
            .iter()
            .map(|a| a.device.ohms().expect("resistive atom"))
            .collect();
        let ohms: f64 = input_ohms.iter().sum();
        if ohms == 0.0 {
            return Err(Error::ZeroOhmSeries);
        }
        let name = self.next_name();
        let formula = format!(
            "R_{{{name}}} = {} = {}",
            join_ohms(&input_ohms, " + "),
            fmt_ohms(ohms)
        );
        self.reductions.push(Reduction {
            kind: ReductionKind::Series,
            depth,
            name: name.clone(),
            ohms,
            input_ohms,
            formula,
        });
        Ok(Atom::generated(self.ids.fresh(), name, ohms))
    }

    fn collapse_parallel(&mut self, branches: &[Branch], depth: usize) -> Result<Atom> {
        let mut input_ohms = Vec::with_capacity(branches.len());
        for br in branches {
            let atom = resistive(&br.items[0]).expect("collapsible branch");
            let ohms = atom.device.ohms().expect("resistive atom");
            if ohms == 0.0 {
                return Err(match atom.device {
                    Device::Ammeter => Error::AmmeterShort,
                    _ => Error::ZeroOhmBranch,
                });
            }
            input_ohms.push(ohms);
        }
        let ohms = 1.0 / input_ohms.iter().map(|r| 1.0 / r).sum::<f64>();
        let name = self.next_name();
        let parts: Vec<String> = input_ohms
            .iter()
            .map(|r| format!("1/{}", fmt_ohms(*r)))
            .collect();
        let formula = format!(
            "R_{{{name}}} = ({})^{{-1}} = {}",
            parts.join(" + "),
            fmt_ohms(ohms)
        );
        self.reductions.push(Reduction {
            kind: ReductionKind::Parallel,
            depth,
            name: name.clone(),
            ohms,
            input_ohms,
            formula,
        });
        Ok(Atom::generated(self.ids.fresh(), name, ohms))
    }
}

fn rebuild(expr: &Expr, depth: usize, ctx: &mut LevelCtx<'_>) -> Result<Expr> {
    match expr {
        Expr::Atom(_) => Ok(expr.clone()),
        Expr::Series(children) => {
            let items = rebuild_run(children, depth, ctx)?;
            Ok(Expr::series(items))
        }
        Expr::Parallel(branches) => {
            if depth == ctx.target && is_collapsible_parallel(branches) {
                let atom = ctx.collapse_parallel(branches, depth)?;
                return Ok(Expr::Atom(atom));
            }
            let mut rebuilt = Vec::with_capacity(branches.len());
            for br in branches {
                let items = rebuild_run(&br.items, depth + 1, ctx)?;
                rebuilt.push(Branch {
                    id: br.id,
                    name: br.name.clone(),
                    items,
                });
            }
            Ok(Expr::parallel(rebuilt))
        }
    }
}

/// Rebuild a series list. At the target depth, maximal runs of >= 2
/// resistive atoms collapse into one generated equivalent each.
fn rebuild_run(items: &[Expr], depth: usize, ctx: &mut LevelCtx<'_>) -> Result<Vec<Expr>> {
    if depth != ctx.target {
        return items.iter().map(|c| rebuild(c, depth + 1, ctx)).collect();
    }

    let mut out = Vec::with_capacity(items.len());
    let mut run: Vec<&Atom> = Vec::new();
    for item in items {
        if let Some(atom) = resistive(item) {
            run.push(atom);
        } else {
            flush_run(&mut run, &mut out, depth, ctx)?;
            out.push(rebuild(item, depth + 1, ctx)?);
        }
    }
    flush_run(&mut run, &mut out, depth, ctx)?;
    Ok(out)
}

fn flush_run(
    run: &mut Vec<&Atom>,
    out: &mut Vec<Expr>,
    depth: usize,
    ctx: &mut LevelCtx<'_>,
) -> Result<()> {
    match run.len() {
        0 => {}
        1 => out.push(Expr::Atom(run[0].clone())),
        _ => {
            let atom = ctx.collapse_series(run, depth)?;
            out.push(Expr::Atom(atom));
        }
    }
    run.clear();
    Ok(())
}

fn fmt_ohms(ohms: f64) -> String {
    format!("{ohms}")
}

fn join_ohms(values: &[f64], sep: &str) -> String {
    values
        .iter()
        .map(|v| fmt_ohms(*v))
        .collect::<Vec<_>>()
        .join(sep)
}
