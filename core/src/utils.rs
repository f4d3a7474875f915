//! Utility functions and types.

use std::fmt::{Debug, Formatter};

/// Redact hides secrets such as secret access keys and session tokens in `Debug` output.
///
/// - absent values print as `None`,
/// - empty values print as `EMPTY`,
/// - values shorter than 12 bytes are fully masked,
/// - longer values keep their first and last three characters, so two
///   different keys can still be told apart in logs.
pub struct Redact<'a>(Option<&'a str>);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(Some(value))
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(Some(value.as_str()))
    }
}

impl<'a> From<Option<&'a str>> for Redact<'a> {
    fn from(value: Option<&'a str>) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        Redact(value.as_deref())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let Some(v) = self.0 else {
            return f.write_str("None");
        };

        match v.len() {
            0 => f.write_str("EMPTY"),
            n if n < 12 || !v.is_char_boundary(3) || !v.is_char_boundary(n - 3) => {
                f.write_str("***")
            }
            n => write!(f, "{}***{}", &v[..3], &v[n - 3..]),
        }
    }
}
