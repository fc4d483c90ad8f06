//! Product identifiers.
//!
//! Product ids are opaque strings chosen by the caller. The editor assigns a
//! timestamp-derived id when a product is created, but ids loaded from the
//! remote store or a snapshot may be any non-empty string.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, non-empty product identifier.
///
/// # Example
///
/// ```rust
/// # use lumina_core::ProductId;
/// let id = ProductId::parse("42").unwrap();
/// assert_eq!(id.as_str(), "42");
/// assert!(ProductId::parse("  ").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Parse an id, rejecting blank input. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    /// Generate a new timestamp-derived id (milliseconds since the Unix epoch).
    #[must_use]
    pub fn generate() -> Self {
        Self(chrono::Utc::now().timestamp_millis().to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let id = ProductId::parse("  7 ").unwrap();
        assert_eq!(id.as_str(), "7");
    }

    #[test]
    fn test_parse_blank() {
        assert!(ProductId::parse("").is_none());
        assert!(ProductId::parse("\t").is_none());
    }

    #[test]
    fn test_generate_is_numeric() {
        let id = ProductId::generate();
        assert!(id.as_str().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_serde_transparent() {
        let id = ProductId::parse("abc").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
