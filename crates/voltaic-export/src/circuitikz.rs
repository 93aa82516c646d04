//! CircuitikZ export: tree layout on a 1 cm grid plus `\draw` emission.
//!
//! A layout pass turns the tree into drawables (wire polylines,
//! oriented component segments, labeled terminal circles); the emitter
//! renders them into a `circuitikz` environment using the component
//! mapping {resistor -> `R`, ammeter -> `ammeter`, vsource -> `V`,
//! isource -> `I`}. Optional current arrows follow the sign of the
//! solved current.

use std::fmt::Write as _;

use indexmap::IndexMap;

use voltaic_core::tree::{Device, Expr};
use voltaic_core::Uid;

/// A point on the 1 cm layout grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Component kinds the exporter knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Resistor,
    Ammeter,
    VoltageSource,
    CurrentSource,
}

impl ComponentKind {
    fn tikz_name(self) -> &'static str {
        match self {
            ComponentKind::Resistor => "R",
            ComponentKind::Ammeter => "ammeter",
            ComponentKind::VoltageSource => "V",
            ComponentKind::CurrentSource => "I",
        }
    }
}

/// One drawable of the laid-out circuit.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    /// A polyline of ideal wire.
    Wire { points: Vec<Point> },
    /// A two-terminal component drawn from -> to.
    Component {
        id: Uid,
        kind: ComponentKind,
        from: Point,
        to: Point,
        label: Option<String>,
    },
    /// A labeled terminal circle.
    Terminal { at: Point, label: String },
}

/// Rendering options.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Solved currents by element id; when present, components get a
    /// current arrow whose direction follows the sign.
    pub currents: Option<IndexMap<Uid, f64>>,
}

/// Horizontal room a subtree needs, in grid cells.
fn width_of(expr: &Expr) -> f64 {
    match expr {
        Expr::Atom(_) => 2.0,
        Expr::Series(children) => children.iter().map(width_of).sum(),
        Expr::Parallel(branches) => {
            let inner = branches
                .iter()
                .map(|br| br.items.iter().map(width_of).sum::<f64>())
                .fold(0.0_f64, f64::max);
            inner + 2.0
        }
    }
}

/// Vertical room a subtree needs below its own axis.
fn depth_of(expr: &Expr) -> f64 {
    match expr {
        Expr::Atom(_) => 0.0,
        Expr::Series(children) => children.iter().map(depth_of).fold(0.0, f64::max),
        Expr::Parallel(branches) => {
            // Branches stack 2 cells apart; the last one carries its own
            // depth below the stack.
            let stack = 2.0 * (branches.len().saturating_sub(1)) as f64;
            let tail = branches
                .iter()
                .flat_map(|br| br.items.iter().map(depth_of))
                .fold(0.0, f64::max);
            stack + tail
        }
    }
}

/// Lay the tree out between a `+` terminal at the origin and a `-`
/// terminal at the right edge.
pub fn layout(tree: &Expr, labels: &IndexMap<Uid, String>) -> Vec<Drawable> {
    let width = width_of(tree);
    let mut drawables = vec![Drawable::Terminal {
        at: Point::new(0.0, 0.0),
        label: "+".to_string(),
    }];
    emit(
        tree,
        Point::new(0.0, 0.0),
        Point::new(width, 0.0),
        labels,
        &mut drawables,
    );
    drawables.push(Drawable::Terminal {
        at: Point::new(width, 0.0),
        label: "-".to_string(),
    });
    drawables
}

fn device_kind(device: Device) -> ComponentKind {
    match device {
        Device::Resistor { .. } => ComponentKind::Resistor,
        Device::Ammeter => ComponentKind::Ammeter,
        Device::VoltageSource { .. } => ComponentKind::VoltageSource,
        Device::CurrentSource { .. } => ComponentKind::CurrentSource,
    }
}

fn emit(
    expr: &Expr,
    from: Point,
    to: Point,
    labels: &IndexMap<Uid, String>,
    out: &mut Vec<Drawable>,
) {
    match expr {
        Expr::Atom(atom) => {
            out.push(Drawable::Component {
                id: atom.id,
                kind: device_kind(atom.device),
                from,
                to,
                label: labels.get(&atom.id).cloned().or_else(|| atom.name.clone()),
            });
        }
        Expr::Series(children) => emit_run(children, from, to, labels, out),
        Expr::Parallel(branches) => {
            let mut y = from.y;
            for branch in branches {
                let start = Point::new(from.x + 1.0, y);
                let stop = Point::new(to.x - 1.0, y);
                // Stubs from the shared junctions to this branch's axis.
                out.push(Drawable::Wire {
                    points: vec![from, Point::new(from.x, y), start],
                });
                emit_run(&branch.items, start, stop, labels, out);
                out.push(Drawable::Wire {
                    points: vec![stop, Point::new(to.x, y), to],
                });
                let below = branch.items.iter().map(depth_of).fold(0.0, f64::max);
                y -= 2.0 + below;
            }
        }
    }
}

/// Lay a series run between two points, padding with trailing wire when
/// the natural width is shorter than the span.
fn emit_run(
    items: &[Expr],
    from: Point,
    to: Point,
    labels: &IndexMap<Uid, String>,
    out: &mut Vec<Drawable>,
) {
    let natural: f64 = items.iter().map(width_of).sum();
    let mut cursor = from;
    for item in items {
        let next = Point::new(cursor.x + width_of(item), from.y);
        emit(item, cursor, next, labels, out);
        cursor = next;
    }
    if natural < to.x - from.x {
        out.push(Drawable::Wire {
            points: vec![cursor, to],
        });
    }
}

fn coord(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v:.1}")
    }
}

fn point(p: Point) -> String {
    format!("({},{})", coord(p.x), coord(p.y))
}

/// Render a tree into a `circuitikz` environment.
pub fn render(tree: &Expr, labels: &IndexMap<Uid, String>, options: &RenderOptions) -> String {
    let drawables = layout(tree, labels);
    let mut out = String::new();
    out.push_str("\\ctikzset{european}\n");
    out.push_str("\\begin{circuitikz}\n");
    for drawable in &drawables {
        match drawable {
            Drawable::Wire { points } => {
                let path: Vec<String> = points.iter().map(|p| point(*p)).collect();
                let _ = writeln!(out, "  \\draw {};", path.join(" -- "));
            }
            Drawable::Component {
                id,
                kind,
                from,
                to,
                label,
            } => {
                let mut opts = kind.tikz_name().to_string();
                if let Some(label) = label {
                    let _ = write!(opts, "=${label}$");
                }
                if let Some(currents) = &options.currents {
                    if let Some(&i) = currents.get(id) {
                        // The arrow follows the sign of the solved current.
                        let arrow = if i >= 0.0 { "i" } else { "i<" };
                        let _ = write!(opts, ", {arrow}=${}\\,A$", fmt_amps(i.abs()));
                    }
                }
                let _ = writeln!(
                    out,
                    "  \\draw {} to[{opts}] {};",
                    point(*from),
                    point(*to)
                );
            }
            Drawable::Terminal { at, label } => {
                let _ = writeln!(
                    out,
                    "  \\draw {} node[circ]{{}} node[above]{{${label}$}};",
                    point(*at)
                );
            }
        }
    }
    out.push_str("\\end{circuitikz}\n");
    out
}

fn fmt_amps(amps: f64) -> String {
    format!("{amps}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use voltaic_core::tree::{Atom, Branch};

    fn resistor(id: u32, ohms: f64) -> Expr {
        Expr::Atom(Atom::new(Uid::new(id), Device::Resistor { ohms }))
    }

    fn no_labels() -> IndexMap<Uid, String> {
        IndexMap::new()
    }

    #[test]
    fn test_series_layout_is_a_single_row() {
        let tree = Expr::series(vec![resistor(1, 100.0), resistor(2, 200.0)]);
        let drawables = layout(&tree, &no_labels());

        // Two terminals and two components, no wires needed.
        assert_eq!(drawables.len(), 4);
        let components: Vec<_> = drawables
            .iter()
            .filter_map(|d| match d {
                Drawable::Component { from, to, .. } => Some((from.x, to.x)),
                _ => None,
            })
            .collect();
        assert_eq!(components, vec![(0.0, 2.0), (2.0, 4.0)]);
    }

    #[test]
    fn test_parallel_layout_stacks_branches() {
        let tree = Expr::parallel(vec![
            Branch::new(Uid::new(10), vec![resistor(1, 100.0)]),
            Branch::new(Uid::new(11), vec![resistor(2, 100.0)]),
        ]);
        let drawables = layout(&tree, &no_labels());

        let ys: Vec<f64> = drawables
            .iter()
            .filter_map(|d| match d {
                Drawable::Component { from, .. } => Some(from.y),
                _ => None,
            })
            .collect();
        assert_eq!(ys, vec![0.0, -2.0]);
    }

    #[test]
    fn test_render_emits_european_style_and_mapping() {
        let tree = Expr::series(vec![
            Expr::Atom(Atom::new(
                Uid::new(1),
                Device::VoltageSource { volts: 9.0 },
            )),
            resistor(2, 100.0),
            Expr::Atom(Atom::new(Uid::new(3), Device::Ammeter)),
        ]);
        let text = render(&tree, &no_labels(), &RenderOptions::default());

        assert!(text.starts_with("\\ctikzset{european}\n"));
        assert!(text.contains("\\begin{circuitikz}"));
        assert!(text.contains("to[V]"));
        assert!(text.contains("to[R]"));
        assert!(text.contains("to[ammeter]"));
        assert!(text.contains("\\end{circuitikz}"));
    }

    #[test]
    fn test_render_labels_and_current_arrows() {
        let tree = resistor(1, 100.0);
        let mut labels = IndexMap::new();
        labels.insert(Uid::new(1), "R1".to_string());
        let mut currents = IndexMap::new();
        currents.insert(Uid::new(1), -0.04);

        let text = render(
            &tree,
            &labels,
            &RenderOptions {
                currents: Some(currents),
            },
        );
        assert!(text.contains("to[R=$R1$, i<=$0.04\\,A$]"), "got: {text}");
    }
}
