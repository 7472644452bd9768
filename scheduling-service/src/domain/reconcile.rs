//! Import-time matching of prior-period rows to staff records.
//!
//! Nothing here runs during roster generation. The output feeds
//! [`crate::domain::carryover::resolve_constraints`].

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use shared::types::{ShiftCode, Staff};
use utoipa::ToSchema;
use uuid::Uuid;

/// Rows scoring at or below this are never auto-matched.
pub const MATCH_THRESHOLD: f64 = 0.3;
const EXACT_SCORE: f64 = 1.0;
const CONTAINS_SCORE: f64 = 0.8;

/// One imported row: a name plus its trailing shift cells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct TailRow {
    pub name: String,
    pub shifts: Vec<ShiftCode>,
}

impl TailRow {
    /// Builds a row from raw spreadsheet cells.
    ///
    /// Blank cells read as REST. A non-blank cell outside the alphabet is
    /// still somebody's shift, so it reads as DAY and extends the working
    /// streak.
    pub fn from_cells<S: AsRef<str>>(name: &str, cells: &[S]) -> Self {
        let shifts = cells
            .iter()
            .map(|cell| {
                let cell = cell.as_ref();
                if cell.trim().is_empty() {
                    return ShiftCode::Rest;
                }
                ShiftCode::from_symbol(cell).unwrap_or_else(|| {
                    tracing::debug!(cell, row = name, "Unrecognised shift cell, reading as day work");
                    ShiftCode::Day
                })
            })
            .collect();
        Self {
            name: name.trim().to_string(),
            shifts,
        }
    }
}

/// Full-width spaces become ASCII, whitespace runs collapse, ends are trimmed.
pub fn normalize_name(name: &str) -> String {
    name.replace('\u{3000}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn compact(name: &str) -> String {
    normalize_name(name)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Similarity in `0.0..=1.0` between two names.
///
/// Exact match scores 1.0 and containment 0.8; anything else falls back to
/// the Jaccard index of the two names' character sets.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = compact(a);
    let b = compact(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return EXACT_SCORE;
    }
    if a.contains(&b) || b.contains(&a) {
        return CONTAINS_SCORE;
    }

    let left: BTreeSet<char> = a.chars().collect();
    let right: BTreeSet<char> = b.chars().collect();
    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();
    intersection as f64 / union as f64
}

/// Picks a row index for each staff member.
///
/// The best row scoring above [`MATCH_THRESHOLD`] wins, earliest row on ties.
/// Without such a row a staff member takes the row at its own list position,
/// if one exists.
pub fn auto_map(staff: &[Staff], rows: &[TailRow]) -> HashMap<Uuid, usize> {
    let mut mapping = HashMap::new();

    for (position, member) in staff.iter().enumerate() {
        let mut best: Option<(usize, f64)> = None;
        for (index, row) in rows.iter().enumerate() {
            let score = name_similarity(&member.name, &row.name);
            let beats_best = best.is_none_or(|(_, best_score)| score > best_score);
            if score > MATCH_THRESHOLD && beats_best {
                best = Some((index, score));
            }
        }

        match best {
            Some((index, score)) => {
                tracing::debug!(staff = %member.name, row = index, score, "Matched by name");
                mapping.insert(member.id, index);
            }
            None if position < rows.len() => {
                tracing::debug!(staff = %member.name, row = position, "Matched by position");
                mapping.insert(member.id, position);
            }
            None => {
                tracing::debug!(staff = %member.name, "No prior-period row");
            }
        }
    }

    mapping
}

/// Resolves a mapping into each staff member's tail.
///
/// Mapped indices that point past the end of `rows` are dropped.
pub fn collect_tails(
    mapping: &HashMap<Uuid, usize>,
    rows: &[TailRow],
) -> HashMap<Uuid, Vec<ShiftCode>> {
    mapping
        .iter()
        .filter_map(|(staff_id, &index)| {
            rows.get(index)
                .map(|row| (*staff_id, row.shifts.clone()))
        })
        .collect()
}
