//! Pure position math for one sibling set.
//!
//! A sibling set is the ordered collection of entities under one parent:
//! the steps of one test case, or the test cases of one project. All three
//! operations here are pure functions over `{id, position}` pairs;
//! persistence and transactions live in [`crate::coordinator`].
//!
//! Positions are 1-based. Input sets may carry gaps (historical data,
//! single-position updates); output of a reindex is always dense.

use std::collections::HashSet;
use std::fmt;

/// Base position assigned to the first sibling in a set.
pub const BASE_POSITION: i64 = 1;

/// One sibling's id paired with a position to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderAssignment {
    pub id: i64,
    pub position: i64,
}

/// Reason a reorder request cannot be mapped onto the current siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderingError {
    /// The request references an id that is not a current sibling.
    UnknownSibling { id: i64 },
}

impl fmt::Display for OrderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSibling { id } => {
                write!(f, "id {id} is not a member of the sibling set")
            }
        }
    }
}

impl std::error::Error for OrderingError {}

/// Map a caller-supplied reorder request onto the current sibling set.
///
/// The requested positions are applied verbatim: the engine does not
/// renumber or deduplicate a full-set reorder, because callers persist
/// absolute positions and expect to read back exactly what they sent.
/// `requested` may cover a subset of the siblings; unmentioned siblings
/// keep their stored positions.
///
/// # Errors
///
/// [`OrderingError::UnknownSibling`] if any requested id is not present
/// in `current`. The caller must not persist anything in that case.
pub fn compute_reorder(
    current: &[OrderAssignment],
    requested: &[OrderAssignment],
) -> Result<Vec<OrderAssignment>, OrderingError> {
    let known: HashSet<i64> = current.iter().map(|entry| entry.id).collect();

    for entry in requested {
        if !known.contains(&entry.id) {
            return Err(OrderingError::UnknownSibling { id: entry.id });
        }
    }

    Ok(requested.to_vec())
}

/// Produce a dense 1-based sequence for the survivors of a deletion,
/// preserving their relative input order.
///
/// `remaining_in_order` must already be sorted by the siblings' current
/// positions ascending. Running this after every removal is what keeps
/// sibling sets gap-free.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn compute_reindex_after_removal(remaining_in_order: &[i64]) -> Vec<OrderAssignment> {
    remaining_in_order
        .iter()
        .enumerate()
        .map(|(index, id)| OrderAssignment {
            id: *id,
            position: BASE_POSITION + index as i64,
        })
        .collect()
}

/// Position for a sibling appended to the end of the set.
///
/// `None` means the set is empty; that maps to [`BASE_POSITION`], never
/// to an optional result.
#[must_use]
pub const fn compute_append_position(current_max: Option<i64>) -> i64 {
    match current_max {
        Some(max) => max + 1,
        None => BASE_POSITION,
    }
}
