//! Debug formatting helpers for [`custom_debug_derive`].

use std::fmt;

const REDACTED: &str = "<redacted>";

/// Formats a secret without revealing it.
///
/// Use with `#[debug(with = "crate::fmt::redacted")]`.
pub fn redacted<T>(_value: &T, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(REDACTED)
}

/// Formats an optional secret as `Some(<redacted>)` or `None`.
///
/// Use with `#[debug(with = "crate::fmt::redacted_opt")]`.
pub fn redacted_opt<T>(value: &Option<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Some(_) => write!(f, "Some({REDACTED})"),
        None => f.write_str("None"),
    }
}
