//! Checkout task allocation.
//!
//! Total session minutes are split as evenly as possible across the selected
//! categories. The remainder goes one minute at a time to the first
//! categories in selection order, so the split is deterministic and always
//! sums to the total.

use std::collections::HashSet;

use crate::error::Rejection;
use crate::types::DbId;

/// Check a category selection: non-empty and free of duplicates.
pub fn validate_selection(category_ids: &[DbId]) -> Result<(), Rejection> {
    if category_ids.is_empty() {
        return Err(Rejection::EmptyTasks);
    }
    let mut seen = HashSet::with_capacity(category_ids.len());
    if category_ids.iter().any(|id| !seen.insert(*id)) {
        return Err(Rejection::DuplicateCategory);
    }
    Ok(())
}

/// Split `total` minutes into `count` parts.
///
/// `base = total / count`; the first `total % count` parts get `base + 1`.
/// Returns an empty vector when `count` is zero. Negative totals are treated
/// as zero.
///
/// ```
/// use muster_core::allocation::split_minutes;
///
/// assert_eq!(split_minutes(10, 3), vec![4, 3, 3]);
/// assert_eq!(split_minutes(37, 1), vec![37]);
/// ```
pub fn split_minutes(total: i64, count: usize) -> Vec<i64> {
    if count == 0 {
        return Vec::new();
    }
    let total = total.max(0);
    let n = count as i64;
    let base = total / n;
    let remainder = (total % n) as usize;
    (0..count)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect()
}
