//! Category code slots.
//!
//! Top-level categories take the codes `1`..`8`. Sub-categories take their
//! parent's code followed by a letter `A`..`H` (`3`, `3A`, `3B`, ...). Once a
//! checkout has snapshotted a category's code, that code is frozen.

use crate::error::CoreError;

/// Codes available to top-level categories, in suggestion order.
pub const TOP_LEVEL_SLOTS: [&str; 8] = ["1", "2", "3", "4", "5", "6", "7", "8"];

/// Suffix letters available to sub-categories, in suggestion order.
pub const CHILD_LETTERS: [char; 8] = ['A', 'B', 'C', 'D', 'E', 'F', 'G', 'H'];

/// Maximum length of an explicitly supplied code.
pub const MAX_CODE_LENGTH: usize = 16;

/// First free top-level code, or `None` when all eight slots are taken.
pub fn suggest_top_level_code<S: AsRef<str>>(used: &[S]) -> Option<String> {
    TOP_LEVEL_SLOTS
        .iter()
        .find(|slot| !used.iter().any(|u| u.as_ref() == **slot))
        .map(|slot| slot.to_string())
}

/// First free child code under `parent_code`, or `None` when `A`..`H` are
/// all taken.
///
/// Non-alphanumeric characters are dropped from the parent code before it
/// is used as a prefix.
pub fn suggest_child_code<S: AsRef<str>>(parent_code: &str, sibling_codes: &[S]) -> Option<String> {
    let prefix: String = parent_code
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    let used: Vec<char> = sibling_codes
        .iter()
        .filter_map(|code| code.as_ref().strip_prefix(prefix.as_str()))
        .filter_map(|rest| {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        })
        .collect();

    CHILD_LETTERS
        .iter()
        .find(|letter| !used.contains(letter))
        .map(|letter| format!("{prefix}{letter}"))
}

/// Validate an explicitly supplied category code.
pub fn validate_code(code: &str) -> Result<(), CoreError> {
    if code.is_empty() || code.len() > MAX_CODE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Category code must be 1-{MAX_CODE_LENGTH} characters"
        )));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(CoreError::Validation(
            "Category code may only contain letters and digits".into(),
        ));
    }
    Ok(())
}
