//! Member status constants and field rules.
//!
//! Status values must match the `members.status` CHECK constraint in
//! `db/migrations`.

use rand::Rng;

use crate::error::CoreError;
use crate::scan::{classify, ScanKind};
use crate::types::Timestamp;

/// Member may check in.
pub const MEMBER_ACTIVE: &str = "active";

/// Member is temporarily blocked from checking in.
pub const MEMBER_DISABLED: &str = "disabled";

/// Member was removed from the roster. Rows are never hard-deleted so that
/// historical sessions keep their owner.
pub const MEMBER_ARCHIVED: &str = "archived";

/// All valid member status values.
pub const VALID_STATUSES: &[&str] = &[MEMBER_ACTIVE, MEMBER_DISABLED, MEMBER_ARCHIVED];

/// Required length of a regular (non-visitor) member number.
pub const MEMBER_NUMBER_LENGTH: usize = 8;

/// Prefix for generated visitor member numbers.
pub const VISITOR_NUMBER_PREFIX: &str = "VIS-";

/// Last name stored for visitors who do not give one.
pub const DEFAULT_VISITOR_LAST_NAME: &str = "Visitor";

/// Validate a member status value.
pub fn validate_status(status: &str) -> Result<(), CoreError> {
    if VALID_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid member status '{status}'. Must be one of: {}",
            VALID_STATUSES.join(", ")
        )))
    }
}

/// Validate a regular member (fireground) number: exactly eight ASCII digits.
pub fn validate_member_number(number: &str) -> Result<(), CoreError> {
    if number.len() == MEMBER_NUMBER_LENGTH && number.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Member number must be exactly {MEMBER_NUMBER_LENGTH} digits"
        )))
    }
}

/// An RFID tag must contain a non-digit. The kiosk treats digits-only input
/// as a member number, so a numeric tag could never be scanned.
pub fn validate_rfid_tag(tag: &str) -> Result<(), CoreError> {
    match classify(tag) {
        ScanKind::Tag => Ok(()),
        ScanKind::Empty => Err(CoreError::Validation("RFID tag must not be empty".into())),
        ScanKind::Number => Err(CoreError::Validation(format!(
            "RFID tag '{tag}' is digits only and would be read as a member number"
        ))),
    }
}

/// Generate a member number for a visitor row.
///
/// Format: `VIS-<base36 unix millis>-<4 random base36 chars>`, uppercase.
/// Never collides with regular member numbers, which are digits only.
pub fn visitor_member_number(now: Timestamp) -> String {
    const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    let mut rng = rand::rng();
    let suffix: String = (0..4)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!(
        "{VISITOR_NUMBER_PREFIX}{}-{suffix}",
        to_base36(now.timestamp_millis().max(0) as u64)
    )
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
