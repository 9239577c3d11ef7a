//! Australian mobile number normalization.
//!
//! Every member write stores `mobile_normalized` using [`normalize_au_mobile`],
//! and the scan resolver normalizes kiosk input with the same function, so
//! both sides of the lookup always agree on the canonical `04XXXXXXXX` form.

/// Normalize an Australian mobile number to the local `04XXXXXXXX` form.
///
/// Accepted shapes (separators such as spaces, dashes and parentheses are
/// ignored):
///
/// - `04XXXXXXXX`
/// - `4XXXXXXXX` (missing leading zero)
/// - `+614XXXXXXXX`
/// - `614XXXXXXXX`
///
/// Returns `None` for anything that is not a mobile number.
///
/// ```
/// use muster_core::phone::normalize_au_mobile;
///
/// assert_eq!(normalize_au_mobile("0412 345 678").as_deref(), Some("0412345678"));
/// assert_eq!(normalize_au_mobile("+61 412 345 678").as_deref(), Some("0412345678"));
/// assert_eq!(normalize_au_mobile("02 9999 1234"), None);
/// ```
pub fn normalize_au_mobile(input: &str) -> Option<String> {
    let mut s: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if let Some(rest) = s.strip_prefix("+61") {
        s = format!("0{rest}");
    } else if s.starts_with("61") && s.len() == 11 {
        s = format!("0{}", &s[2..]);
    }

    if s.len() == 9 && s.starts_with('4') {
        s = format!("0{s}");
    }

    let valid = s.len() == 10 && s.starts_with("04") && s.bytes().all(|b| b.is_ascii_digit());
    valid.then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_form_is_unchanged() {
        assert_eq!(normalize_au_mobile("0412345678").as_deref(), Some("0412345678"));
    }

    #[test]
    fn separators_are_ignored() {
        assert_eq!(
            normalize_au_mobile("(0412) 345-678").as_deref(),
            Some("0412345678")
        );
    }

    #[test]
    fn international_prefixes() {
        assert_eq!(normalize_au_mobile("+61412345678").as_deref(), Some("0412345678"));
        assert_eq!(normalize_au_mobile("61412345678").as_deref(), Some("0412345678"));
    }

    #[test]
    fn missing_leading_zero() {
        assert_eq!(normalize_au_mobile("412345678").as_deref(), Some("0412345678"));
    }

    #[test]
    fn landlines_and_garbage_rejected() {
        assert_eq!(normalize_au_mobile("0299991234"), None);
        assert_eq!(normalize_au_mobile(""), None);
        assert_eq!(normalize_au_mobile("abc"), None);
        assert_eq!(normalize_au_mobile("04123"), None);
        assert_eq!(normalize_au_mobile("04123456789"), None);
        assert_eq!(normalize_au_mobile("+1 415 555 0100"), None);
    }

    #[test]
    fn stray_plus_inside_number_rejected() {
        assert_eq!(normalize_au_mobile("0412+345678"), None);
    }
}
