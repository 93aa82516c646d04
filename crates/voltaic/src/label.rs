//! Presentation indices for resistors and ammeters.
//!
//! Elements are shown as `R1, R2, ...` and `A1, A2, ...`. An explicit
//! label matching `R<digits>`, `R_<digits>`, `R{<digits>}` or
//! `R_{<digits>}` (same for `A`) claims that index; everything else
//! takes the smallest unclaimed positive index in visitation order.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use thiserror::Error;

use voltaic_core::Uid;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LabelError {
    #[error("invalid label {label:?}")]
    Invalid { label: String },

    #[error("duplicate index in label {label:?}")]
    DuplicateIndex { label: String },
}

pub type Result<T> = std::result::Result<T, LabelError>;

/// Parse an index claim for `prefix`.
///
/// Returns `Ok(Some(n))` for a well-formed claim, `Ok(None)` when the
/// label does not claim an index (it is decorative), and an error for a
/// claim-shaped but malformed label.
fn parse_claim(prefix: char, label: &str) -> Result<Option<usize>> {
    let Some(rest) = label.strip_prefix(prefix) else {
        return Ok(None);
    };
    let rest = rest.strip_prefix('_').unwrap_or(rest);
    let (rest, braced) = match rest.strip_prefix('{') {
        Some(inner) => (inner, true),
        None => (rest, false),
    };

    if !rest.starts_with(|c: char| c.is_ascii_digit()) {
        // Not claim-shaped (e.g. "R_load"); leave it decorative.
        return Ok(None);
    }

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, tail) = rest.split_at(digits_end);
    let closed = match (braced, tail) {
        (true, "}") | (false, "") => true,
        _ => false,
    };
    let index: usize = digits.parse().map_err(|_| LabelError::Invalid {
        label: label.to_string(),
    })?;
    if !closed || index == 0 {
        return Err(LabelError::Invalid {
            label: label.to_string(),
        });
    }
    Ok(Some(index))
}

/// Assign a presentation index to every item.
///
/// Claims are honored first; the rest take the smallest unclaimed
/// positive integer in visitation order. The result is a bijection onto
/// its index set.
pub fn assign_indices<'a, I>(prefix: char, items: I) -> Result<IndexMap<Uid, usize>>
where
    I: IntoIterator<Item = (Uid, Option<&'a str>)>,
{
    let mut used = BTreeSet::new();
    let mut claims: IndexMap<Uid, Option<usize>> = IndexMap::new();

    for (id, label) in items {
        let claim = match label {
            Some(label) => {
                let claim = parse_claim(prefix, label)?;
                if let Some(index) = claim {
                    if !used.insert(index) {
                        return Err(LabelError::DuplicateIndex {
                            label: label.to_string(),
                        });
                    }
                }
                claim
            }
            None => None,
        };
        claims.insert(id, claim);
    }

    let mut cursor = 1usize;
    let mut out = IndexMap::with_capacity(claims.len());
    for (id, claim) in claims {
        let index = match claim {
            Some(index) => index,
            None => {
                while used.contains(&cursor) {
                    cursor += 1;
                }
                used.insert(cursor);
                cursor
            }
        };
        out.insert(id, index);
    }
    Ok(out)
}
