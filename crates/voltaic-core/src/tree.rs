//! Series/parallel tree form of a circuit, oriented + -> -.

use crate::id::Uid;

/// Electrical device carried by a tree atom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Device {
    Resistor { ohms: f64 },
    Ammeter,
    VoltageSource { volts: f64 },
    CurrentSource { amps: f64 },
}

impl Device {
    /// Series resistance contributed by this device, if it is purely
    /// resistive. Ammeters count as 0 ohms; sources have no resistance.
    pub fn ohms(self) -> Option<f64> {
        match self {
            Device::Resistor { ohms } => Some(ohms),
            Device::Ammeter => Some(0.0),
            Device::VoltageSource { .. } | Device::CurrentSource { .. } => None,
        }
    }

    /// Flip orientation: source values negate, passive devices are
    /// unchanged.
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Device::VoltageSource { volts } => Device::VoltageSource { volts: -volts },
            Device::CurrentSource { amps } => Device::CurrentSource { amps: -amps },
            other => other,
        }
    }
}

/// A leaf of the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub id: Uid,
    pub name: Option<String>,
    /// True for equivalents synthesized by the reducer.
    pub generated: bool,
    pub device: Device,
}

impl Atom {
    pub fn new(id: Uid, device: Device) -> Self {
        Self {
            id,
            name: None,
            generated: false,
            device,
        }
    }

    pub fn named(id: Uid, name: impl Into<String>, device: Device) -> Self {
        Self {
            id,
            name: Some(name.into()),
            generated: false,
            device,
        }
    }

    /// An equivalent synthesized by the reducer, carrying its
    /// hierarchical display name (e.g. `"2.1"`).
    pub fn generated(id: Uid, name: impl Into<String>, ohms: f64) -> Self {
        Self {
            id,
            name: Some(name.into()),
            generated: true,
            device: Device::Resistor { ohms },
        }
    }
}

/// One branch of a parallel block. The items form an implicit series run.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub id: Uid,
    pub name: Option<String>,
    pub items: Vec<Expr>,
}

impl Branch {
    /// Build a branch, merging any series item into the run.
    pub fn new(id: Uid, items: Vec<Expr>) -> Self {
        let mut flat = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Expr::Series(children) => flat.extend(children),
                other => flat.push(other),
            }
        }
        Self {
            id,
            name: None,
            items: flat,
        }
    }
}

/// A series/parallel circuit expression.
///
/// The tree is oriented + -> -. A series directly inside a series is
/// merged and a single-child series or parallel collapses to its child;
/// the [`Expr::series`] and [`Expr::parallel`] constructors maintain
/// both invariants. Wires never appear.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Atom(Atom),
    Series(Vec<Expr>),
    Parallel(Vec<Branch>),
}

impl Expr {
    pub fn atom(atom: Atom) -> Expr {
        Expr::Atom(atom)
    }

    /// Build a series, flattening nested series and collapsing a single
    /// child to itself.
    pub fn series(children: Vec<Expr>) -> Expr {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Expr::Series(items) => flat.extend(items),
                other => flat.push(other),
            }
        }
        if flat.len() == 1 {
            flat.pop().expect("single child")
        } else {
            Expr::Series(flat)
        }
    }

    /// Build a parallel block, collapsing a single branch to its run.
    pub fn parallel(branches: Vec<Branch>) -> Expr {
        if branches.len() == 1 {
            let only = branches.into_iter().next().expect("single branch");
            Expr::series(only.items)
        } else {
            Expr::Parallel(branches)
        }
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Expr::Atom(_))
    }

    /// The single atom of a fully collapsed tree, if it is one.
    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Expr::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    /// Flip orientation: atoms reverse their devices, series children
    /// reverse in order (each child reversed), parallel branches each
    /// reverse their run in place.
    #[must_use]
    pub fn reversed(&self) -> Expr {
        match self {
            Expr::Atom(atom) => Expr::Atom(Atom {
                device: atom.device.reversed(),
                ..atom.clone()
            }),
            Expr::Series(children) => {
                Expr::Series(children.iter().rev().map(Expr::reversed).collect())
            }
            Expr::Parallel(branches) => Expr::Parallel(
                branches
                    .iter()
                    .map(|br| Branch {
                        id: br.id,
                        name: br.name.clone(),
                        items: br.items.iter().rev().map(Expr::reversed).collect(),
                    })
                    .collect(),
            ),
        }
    }

    /// Visit every atom in + -> - order.
    pub fn for_each_atom<'a>(&'a self, f: &mut impl FnMut(&'a Atom)) {
        match self {
            Expr::Atom(atom) => f(atom),
            Expr::Series(children) => {
                for child in children {
                    child.for_each_atom(f);
                }
            }
            Expr::Parallel(branches) => {
                for branch in branches {
                    for item in &branch.items {
                        item.for_each_atom(f);
                    }
                }
            }
        }
    }

    /// All atoms in + -> - order.
    pub fn atoms(&self) -> Vec<&Atom> {
        let mut out = Vec::new();
        self.for_each_atom(&mut |atom| out.push(atom));
        out
    }
}
