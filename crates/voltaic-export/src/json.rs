//! Circuit-JSON: the persisted tree form.
//!
//! The top level carries `kind: "circuit"`, an id, a display `route`
//! (`straight` or `u`) and either an `items` sequence or `top`/`right`/
//! `bottom` sequences. The route only affects presentation, never
//! analysis.
//!
//! Legacy documents migrate on import: a missing `route` is inferred
//! (`u` when any segment list is present, else `straight`), a top-level
//! `items` under `u` maps to the bottom segment, and the old
//! `"two-bend"` route is an alias for `u`.

use serde::{Deserialize, Serialize};

use voltaic_core::tree::{Atom, Branch, Device, Expr};
use voltaic_core::Uid;

use crate::error::{Error, Result};

/// Display layout of the circuit between its terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Straight,
    U,
}

/// The items of the document, split by route segment.
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    Straight {
        items: Vec<Expr>,
    },
    U {
        top: Vec<Expr>,
        right: Vec<Expr>,
        bottom: Vec<Expr>,
    },
}

/// A parsed circuit document.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitFile {
    pub id: Uid,
    pub route: Route,
    pub layout: Layout,
}

impl CircuitFile {
    /// A straight document over the given run.
    pub fn straight(id: Uid, items: Vec<Expr>) -> Self {
        Self {
            id,
            route: Route::Straight,
            layout: Layout::Straight { items },
        }
    }

    /// Wrap a tree for presentation, keeping `route` except for a fully
    /// collapsed single element, which always renders straight.
    pub fn for_tree(id: Uid, route: Route, tree: &Expr) -> Self {
        let items = match tree.clone() {
            Expr::Series(children) => children,
            other => vec![other],
        };
        match route {
            Route::U if items.len() > 1 => Self {
                id,
                route: Route::U,
                layout: Layout::U {
                    top: Vec::new(),
                    right: Vec::new(),
                    bottom: items,
                },
            },
            _ => Self::straight(id, items),
        }
    }

    /// The full + -> - expression: segments concatenated in order.
    pub fn to_expr(&self) -> Expr {
        match &self.layout {
            Layout::Straight { items } => Expr::series(items.clone()),
            Layout::U { top, right, bottom } => {
                let mut items = Vec::with_capacity(top.len() + right.len() + bottom.len());
                items.extend(top.iter().cloned());
                items.extend(right.iter().cloned());
                items.extend(bottom.iter().cloned());
                Expr::series(items)
            }
        }
    }
}

/// Parse a Circuit-JSON document, applying the legacy migrations.
pub fn from_json(text: &str) -> Result<CircuitFile> {
    let raw: RawCircuit = serde_json::from_str(text)?;

    if raw.kind != "circuit" {
        return Err(Error::invalid(
            "kind",
            format!("expected \"circuit\", got {:?}", raw.kind),
        ));
    }
    let id = raw
        .id
        .ok_or_else(|| Error::invalid("id", "missing required field"))?;

    let route = match raw.route.as_deref() {
        None => {
            if raw.top.is_some() || raw.right.is_some() || raw.bottom.is_some() {
                Route::U
            } else {
                Route::Straight
            }
        }
        Some("straight") => Route::Straight,
        Some("u") | Some("two-bend") => Route::U,
        Some(other) => {
            return Err(Error::invalid(
                "route",
                format!("unknown route {other:?}"),
            ))
        }
    };

    let layout = match route {
        Route::Straight => {
            let items = raw
                .items
                .ok_or_else(|| Error::invalid("items", "missing required field"))?;
            Layout::Straight {
                items: segment_to_exprs(&items, "items")?,
            }
        }
        Route::U => {
            // Legacy documents carried the run in a top-level `items`.
            let bottom = match (raw.bottom, raw.items) {
                (Some(bottom), _) => segment_to_exprs(&bottom, "bottom")?,
                (None, Some(items)) => segment_to_exprs(&items, "items")?,
                (None, None) => Vec::new(),
            };
            Layout::U {
                top: segment_to_exprs(&raw.top.unwrap_or_default(), "top")?,
                right: segment_to_exprs(&raw.right.unwrap_or_default(), "right")?,
                bottom,
            }
        }
    };

    Ok(CircuitFile {
        id: Uid::new(id),
        route,
        layout,
    })
}

/// Serialize a document. Inverse of [`from_json`] on valid circuits.
pub fn to_json(file: &CircuitFile) -> Result<String> {
    let raw = RawCircuit {
        kind: "circuit".to_string(),
        id: Some(file.id.as_u32()),
        route: Some(
            match file.route {
                Route::Straight => "straight",
                Route::U => "u",
            }
            .to_string(),
        ),
        items: match &file.layout {
            Layout::Straight { items } => Some(exprs_to_segment(items)),
            Layout::U { .. } => None,
        },
        top: match &file.layout {
            Layout::U { top, .. } => Some(exprs_to_segment(top)),
            Layout::Straight { .. } => None,
        },
        right: match &file.layout {
            Layout::U { right, .. } => Some(exprs_to_segment(right)),
            Layout::Straight { .. } => None,
        },
        bottom: match &file.layout {
            Layout::U { bottom, .. } => Some(exprs_to_segment(bottom)),
            Layout::Straight { .. } => None,
        },
    };
    Ok(serde_json::to_string_pretty(&raw)?)
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCircuit {
    kind: String,
    #[serde(default)]
    id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<Vec<RawNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    top: Option<Vec<RawNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    right: Option<Vec<RawNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bottom: Option<Vec<RawNode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawNode {
    kind: String,
    #[serde(default)]
    id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ohms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    volts: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    amps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    items: Option<Vec<RawNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    branches: Option<Vec<RawBranch>>,
}

impl RawNode {
    fn leaf(kind: &str, atom: &Atom) -> Self {
        Self {
            kind: kind.to_string(),
            id: Some(atom.id.as_u32()),
            name: atom.name.clone(),
            generated: atom.generated,
            ohms: None,
            volts: None,
            amps: None,
            items: None,
            branches: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawBranch {
    #[serde(default)]
    id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    items: Option<Vec<RawNode>>,
}

fn segment_to_exprs(nodes: &[RawNode], path: &str) -> Result<Vec<Expr>> {
    nodes
        .iter()
        .enumerate()
        .map(|(i, node)| node_to_expr(node, &format!("{path}[{i}]")))
        .collect()
}

fn require_id(node_id: Option<u32>, path: &str) -> Result<Uid> {
    node_id
        .map(Uid::new)
        .ok_or_else(|| Error::invalid(format!("{path}.id"), "missing required field"))
}

fn node_to_expr(node: &RawNode, path: &str) -> Result<Expr> {
    let atom = |device: Device| -> Result<Expr> {
        Ok(Expr::Atom(Atom {
            id: require_id(node.id, path)?,
            name: node.name.clone(),
            generated: node.generated,
            device,
        }))
    };

    match node.kind.as_str() {
        "resistor" => {
            let ohms = node
                .ohms
                .ok_or_else(|| Error::invalid(format!("{path}.ohms"), "missing required field"))?;
            if !ohms.is_finite() || ohms <= 0.0 {
                return Err(Error::invalid(
                    format!("{path}.ohms"),
                    format!("expected a finite positive number, got {ohms}"),
                ));
            }
            atom(Device::Resistor { ohms })
        }
        "ammeter" => atom(Device::Ammeter),
        "vsource" => {
            let volts = node
                .volts
                .ok_or_else(|| Error::invalid(format!("{path}.volts"), "missing required field"))?;
            if !volts.is_finite() {
                return Err(Error::invalid(
                    format!("{path}.volts"),
                    format!("expected a finite number, got {volts}"),
                ));
            }
            atom(Device::VoltageSource { volts })
        }
        "isource" => {
            let amps = node
                .amps
                .ok_or_else(|| Error::invalid(format!("{path}.amps"), "missing required field"))?;
            if !amps.is_finite() {
                return Err(Error::invalid(
                    format!("{path}.amps"),
                    format!("expected a finite number, got {amps}"),
                ));
            }
            atom(Device::CurrentSource { amps })
        }
        "series" => {
            let items = node
                .items
                .as_ref()
                .ok_or_else(|| Error::invalid(format!("{path}.items"), "missing required field"))?;
            let children = items
                .iter()
                .enumerate()
                .map(|(i, child)| node_to_expr(child, &format!("{path}.items[{i}]")))
                .collect::<Result<Vec<_>>>()?;
            Ok(Expr::Series(children))
        }
        "parallel" => {
            let branches = node.branches.as_ref().ok_or_else(|| {
                Error::invalid(format!("{path}.branches"), "missing required field")
            })?;
            let branches = branches
                .iter()
                .enumerate()
                .map(|(i, branch)| {
                    let branch_path = format!("{path}.branches[{i}]");
                    let id = require_id(branch.id, &branch_path)?;
                    let items = branch.items.as_ref().ok_or_else(|| {
                        Error::invalid(format!("{branch_path}.items"), "missing required field")
                    })?;
                    let items = items
                        .iter()
                        .enumerate()
                        .map(|(j, child)| {
                            node_to_expr(child, &format!("{branch_path}.items[{j}]"))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    Ok(Branch {
                        id,
                        name: branch.name.clone(),
                        items,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Expr::Parallel(branches))
        }
        other => Err(Error::invalid(
            format!("{path}.kind"),
            format!("unknown kind {other:?}"),
        )),
    }
}

fn exprs_to_segment(exprs: &[Expr]) -> Vec<RawNode> {
    exprs.iter().map(expr_to_node).collect()
}

fn expr_to_node(expr: &Expr) -> RawNode {
    match expr {
        Expr::Atom(atom) => match atom.device {
            Device::Resistor { ohms } => {
                let mut node = RawNode::leaf("resistor", atom);
                node.ohms = Some(ohms);
                node
            }
            Device::Ammeter => RawNode::leaf("ammeter", atom),
            Device::VoltageSource { volts } => {
                let mut node = RawNode::leaf("vsource", atom);
                node.volts = Some(volts);
                node
            }
            Device::CurrentSource { amps } => {
                let mut node = RawNode::leaf("isource", atom);
                node.amps = Some(amps);
                node
            }
        },
        Expr::Series(children) => RawNode {
            kind: "series".to_string(),
            id: None,
            name: None,
            generated: false,
            ohms: None,
            volts: None,
            amps: None,
            items: Some(exprs_to_segment(children)),
            branches: None,
        },
        Expr::Parallel(branches) => RawNode {
            kind: "parallel".to_string(),
            id: None,
            name: None,
            generated: false,
            ohms: None,
            volts: None,
            amps: None,
            items: None,
            branches: Some(
                branches
                    .iter()
                    .map(|branch| RawBranch {
                        id: Some(branch.id.as_u32()),
                        name: branch.name.clone(),
                        items: Some(exprs_to_segment(&branch.items)),
                    })
                    .collect(),
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_straight_document() {
        let text = r#"{
            "kind": "circuit",
            "id": 1,
            "route": "straight",
            "items": [
                { "kind": "resistor", "id": 2, "ohms": 100.0 },
                { "kind": "resistor", "id": 3, "name": "R7", "ohms": 200.0 }
            ]
        }"#;

        let file = from_json(text).unwrap();
        assert_eq!(file.route, Route::Straight);
        let expr = file.to_expr();
        let atoms = expr.atoms();
        assert_eq!(atoms.len(), 2);
        assert_eq!(atoms[1].name.as_deref(), Some("R7"));
    }

    #[test]
    fn test_parse_parallel_with_branches() {
        let text = r#"{
            "kind": "circuit",
            "id": 1,
            "route": "straight",
            "items": [{
                "kind": "parallel",
                "id": 2,
                "branches": [
                    { "id": 3, "items": [{ "kind": "resistor", "id": 4, "ohms": 100.0 }] },
                    { "id": 5, "items": [{ "kind": "ammeter", "id": 6 }] }
                ]
            }]
        }"#;

        let file = from_json(text).unwrap();
        match file.to_expr() {
            Expr::Parallel(branches) => assert_eq!(branches.len(), 2),
            other => panic!("expected parallel, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_route_with_segments_is_u() {
        let text = r#"{
            "kind": "circuit",
            "id": 1,
            "top": [{ "kind": "resistor", "id": 2, "ohms": 50.0 }]
        }"#;

        let file = from_json(text).unwrap();
        assert_eq!(file.route, Route::U);
    }

    #[test]
    fn test_missing_route_without_segments_is_straight() {
        let text = r#"{ "kind": "circuit", "id": 1, "items": [] }"#;
        let file = from_json(text).unwrap();
        assert_eq!(file.route, Route::Straight);
    }

    #[test]
    fn test_legacy_two_bend_aliases_to_u() {
        let text = r#"{ "kind": "circuit", "id": 1, "route": "two-bend" }"#;
        let file = from_json(text).unwrap();
        assert_eq!(file.route, Route::U);
    }

    #[test]
    fn test_legacy_items_under_u_map_to_bottom() {
        let text = r#"{
            "kind": "circuit",
            "id": 1,
            "route": "u",
            "items": [{ "kind": "resistor", "id": 2, "ohms": 50.0 }]
        }"#;

        let file = from_json(text).unwrap();
        match &file.layout {
            Layout::U { bottom, top, .. } => {
                assert_eq!(bottom.len(), 1);
                assert!(top.is_empty());
            }
            other => panic!("expected U layout, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_route_is_rejected() {
        let text = r#"{ "kind": "circuit", "id": 1, "route": "zigzag", "items": [] }"#;
        let err = from_json(text).unwrap_err();
        assert_eq!(err.to_string(), "route: unknown route \"zigzag\"");
    }

    #[test]
    fn test_unknown_kind_is_rejected_with_path() {
        let text = r#"{
            "kind": "circuit",
            "id": 1,
            "route": "straight",
            "items": [{ "kind": "capacitor", "id": 2 }]
        }"#;

        let err = from_json(text).unwrap_err();
        assert_eq!(
            err.to_string(),
            "items[0].kind: unknown kind \"capacitor\""
        );
    }

    #[test]
    fn test_non_positive_ohms_is_rejected_with_path() {
        let text = r#"{
            "kind": "circuit",
            "id": 1,
            "route": "straight",
            "items": [{
                "kind": "parallel",
                "id": 2,
                "branches": [
                    { "id": 3, "items": [{ "kind": "resistor", "id": 4, "ohms": 0.0 }] },
                    { "id": 5, "items": [{ "kind": "resistor", "id": 6, "ohms": 1.0 }] }
                ]
            }]
        }"#;

        let err = from_json(text).unwrap_err();
        assert!(
            err.to_string()
                .starts_with("items[0].branches[0].items[0].ohms:"),
            "unexpected error {err}"
        );
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let text = r#"{
            "kind": "circuit",
            "id": 1,
            "route": "straight",
            "items": [{ "kind": "vsource", "id": 2 }]
        }"#;

        let err = from_json(text).unwrap_err();
        assert_eq!(err.to_string(), "items[0].volts: missing required field");
    }

    #[test]
    fn test_round_trip_is_identity() {
        let text = r#"{
            "kind": "circuit",
            "id": 1,
            "route": "straight",
            "items": [
                { "kind": "vsource", "id": 2, "volts": 12.0 },
                {
                    "kind": "parallel",
                    "id": 3,
                    "branches": [
                        { "id": 4, "items": [{ "kind": "resistor", "id": 5, "ohms": 100.0 }] },
                        { "id": 6, "name": "loop", "items": [
                            { "kind": "resistor", "id": 7, "ohms": 50.0 },
                            { "kind": "ammeter", "id": 8 }
                        ] }
                    ]
                }
            ]
        }"#;

        let file = from_json(text).unwrap();
        let emitted = to_json(&file).unwrap();
        let again = from_json(&emitted).unwrap();
        assert_eq!(file, again);
    }

    #[test]
    fn test_collapsed_tree_renders_straight() {
        let atom = Expr::Atom(Atom::generated(Uid::new(9), "1.1", 300.0));
        let file = CircuitFile::for_tree(Uid::new(1), Route::U, &atom);
        assert_eq!(file.route, Route::Straight);
    }
}
