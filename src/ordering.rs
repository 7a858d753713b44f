//! Dense task ranks from a caller-supplied arrangement.
//!
//! Each position is an independent point write. A failure part-way through
//! leaves earlier positions applied and later ones at their previous rank;
//! concurrent reorders over overlapping ids may interleave.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::store::Store;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RankAssignment {
    pub id: String,
    pub order: i64,
}

/// Rank each id by its 0-based position in `ordered_ids`.
pub fn assign_ranks(ordered_ids: &[String]) -> Vec<RankAssignment> {
    ordered_ids
        .iter()
        .enumerate()
        .map(|(position, id)| RankAssignment {
            id: id.clone(),
            order: position as i64,
        })
        .collect()
}

/// Write the ranks from [`assign_ranks`], stopping at the first missing id.
pub fn apply_ranks<S: Store + ?Sized>(
    store: &S,
    ordered_ids: &[String],
) -> Result<Vec<RankAssignment>> {
    let assignments = assign_ranks(ordered_ids);
    for assignment in &assignments {
        if !store.set_task_order(&assignment.id, assignment.order)? {
            return Err(Error::NotFound(format!("task {}", assignment.id)));
        }
    }
    Ok(assignments)
}
