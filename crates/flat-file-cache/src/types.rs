//! Cache types

use std::fmt;

/// Extension every cache entry is stored under
pub const ENTRY_EXTENSION: &str = "jpg";

/// Numeric identifier of a cache entry.
///
/// Only non-empty strings of ASCII digits are accepted, so a key can always
/// be used as a file name without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Parse a key, returning `None` unless it is made only of ASCII digits
    pub fn parse(raw: &str) -> Option<Self> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self(raw.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the entry for this key, e.g. `200.jpg`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.0, ENTRY_EXTENSION)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
