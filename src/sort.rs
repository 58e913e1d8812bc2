use std::cmp::Ordering;

use tracing::trace;

use crate::format::parse_cell;
use crate::rows::{ColumnId, PolicyRow};

/// The active sort. There is none until a column is activated for the
/// first time, and it persists across data refreshes afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortState {
    pub column: ColumnId,
    pub ascending: bool,
}

impl SortState {
    /// Column activation transition: the same column again flips the
    /// direction, a different column starts ascending.
    pub fn activate(current: Option<SortState>, column: ColumnId) -> SortState {
        match current {
            Some(state) if state.column == column => SortState {
                column,
                ascending: !state.ascending,
            },
            _ => SortState {
                column,
                ascending: true,
            },
        }
    }
}

/// Stable-sorts the display permutation `order` by the given column.
/// Field values are never touched, only the order changes. Whether a
/// pair compares numerically is decided per pair, not per column, so a
/// mixed column degrades to text comparison only where it has to.
pub fn apply(rows: &[PolicyRow], order: &mut [usize], column: ColumnId, ascending: bool) {
    trace!("Sorting {} rows by {:?}, ascending {}", order.len(), column, ascending);
    order.sort_by(|&a, &b| {
        let av = rows[a].cell(column);
        let bv = rows[b].cell(column);
        let ord = match (parse_cell(av), parse_cell(bv)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => av.to_lowercase().cmp(&bv.to_lowercase()),
        };
        if ascending { ord } else { ord.reverse() }
    });
}
