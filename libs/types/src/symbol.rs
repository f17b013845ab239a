//! 8-byte security symbol
//!
//! The feed transmits symbols as fixed 8-byte ASCII fields, right-padded
//! with spaces. The padding is part of the identity: equality and hashing
//! are byte-wise and output preserves all eight bytes verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the symbol field on the wire.
pub const SYMBOL_LEN: usize = 8;

/// An opaque 8-byte security symbol, space padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol([u8; SYMBOL_LEN]);

impl Symbol {
    /// Create from the raw 8-byte wire field.
    pub const fn new(bytes: [u8; SYMBOL_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from text, right-padding with spaces.
    ///
    /// # Panics
    /// Panics if `text` is longer than 8 bytes.
    pub fn padded(text: &str) -> Self {
        assert!(text.len() <= SYMBOL_LEN, "symbol longer than 8 bytes");
        let mut bytes = [b' '; SYMBOL_LEN];
        bytes[..text.len()].copy_from_slice(text.as_bytes());
        Self(bytes)
    }

    /// The raw 8-byte field, padding included.
    pub const fn as_bytes(&self) -> &[u8; SYMBOL_LEN] {
        &self.0
    }

    /// The symbol with trailing padding removed (for log fields).
    pub fn trimmed(&self) -> &str {
        std::str::from_utf8(&self.0)
            .unwrap_or("????????")
            .trim_end_matches(' ')
    }
}

impl fmt::Display for Symbol {
    /// Writes all eight bytes verbatim, trailing spaces included.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

// Serialized as the full 8-character string; padding survives round trips.
impl Serialize for Symbol {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.len() > SYMBOL_LEN {
            return Err(serde::de::Error::custom("symbol longer than 8 bytes"));
        }
        Ok(Self::padded(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_construction() {
        let symbol = Symbol::padded("AAPL");
        assert_eq!(symbol.as_bytes(), b"AAPL    ");
    }

    #[test]
    fn test_equality_is_byte_wise() {
        assert_eq!(Symbol::padded("AAPL"), Symbol::new(*b"AAPL    "));
        assert_ne!(Symbol::padded("AAPL"), Symbol::padded("AAPl"));
    }

    #[test]
    fn test_display_preserves_padding() {
        assert_eq!(Symbol::padded("MSFT").to_string(), "MSFT    ");
    }

    #[test]
    fn test_trimmed() {
        assert_eq!(Symbol::padded("QQQ").trimmed(), "QQQ");
    }

    #[test]
    fn test_symbol_serialization() {
        let symbol = Symbol::padded("AAPL");
        let json = serde_json::to_string(&symbol).unwrap();
        assert_eq!(json, "\"AAPL    \"");

        let deserialized: Symbol = serde_json::from_str(&json).unwrap();
        assert_eq!(symbol, deserialized);
    }

    #[test]
    #[should_panic(expected = "symbol longer than 8 bytes")]
    fn test_padded_rejects_long_text() {
        Symbol::padded("TOOLONGSYM");
    }
}
